//! The generic resource base every typed wrapper delegates to.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::engine::{ReadResourceRequest, RegisterResourceRequest, ResourceOutputs};
use crate::{Context, Error, Input, Output, PropertyMap, ResourceId, Result, Urn};

/// Options controlling how the engine treats a resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    /// Adopt an existing resource instead of creating one.
    pub id: Option<Input<ResourceId>>,
    /// Properties excluded from diffing.
    pub ignore_changes: Vec<String>,
    /// Delete the old resource before creating its replacement.
    pub delete_before_replace: bool,
    /// Properties whose change forces a replacement.
    pub replace_on_changes: Vec<String>,
    /// Resources that must be registered first.
    pub depends_on: Vec<CustomResource>,
    /// Refuse deletion.
    pub protect: bool,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<Input<ResourceId>>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_ignore_changes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_changes.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_delete_before_replace(mut self, enabled: bool) -> Self {
        self.delete_before_replace = enabled;
        self
    }

    pub fn with_replace_on_changes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace_on_changes.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_depends_on(mut self, resource: &CustomResource) -> Self {
        self.depends_on.push(resource.clone());
        self
    }

    pub fn with_protect(mut self, protect: bool) -> Self {
        self.protect = protect;
        self
    }

    /// Add `field` to the ignore list unless it is already there.
    pub fn ignore(&mut self, field: &str) {
        if !self.ignore_changes.iter().any(|f| f == field) {
            self.ignore_changes.push(field.to_string());
        }
    }
}

struct ResourceState {
    type_token: String,
    name: String,
    urn: Urn,
    inputs: PropertyMap,
    options: ResourceOptions,
    outputs: Output<ResourceOutputs>,
}

/// Handle to a resource registered with the engine.
#[derive(Clone)]
pub struct CustomResource {
    state: Arc<ResourceState>,
}

impl fmt::Debug for CustomResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResource")
            .field("type_token", &self.state.type_token)
            .field("name", &self.state.name)
            .finish_non_exhaustive()
    }
}

impl CustomResource {
    /// Register a resource with the context's engine.
    ///
    /// When `options.id` is set the engine reads the existing resource,
    /// otherwise it creates (or updates) it. The engine call runs when any
    /// output is awaited or when [`Context::wait`] drives the program.
    pub fn register(
        ctx: &Context,
        type_token: &str,
        name: &str,
        inputs: PropertyMap,
        options: ResourceOptions,
    ) -> Self {
        let urn = ctx.urn(type_token, name);
        debug!(%urn, import = options.id.is_some(), "Registering resource");

        let engine = ctx.engine();
        let request_inputs = inputs.clone();
        let request_options = options.clone();
        let request_urn = urn.clone();
        let type_token_owned = type_token.to_string();
        let name_owned = name.to_string();

        let outputs = Output::new(async move {
            let properties = request_inputs.resolve().await?;
            match request_options.id {
                Some(id) => {
                    let id = id.into_output().resolve().await?;
                    engine
                        .read_resource(ReadResourceRequest {
                            urn: request_urn,
                            type_token: type_token_owned,
                            name: name_owned,
                            id,
                            properties,
                        })
                        .await
                }
                None => {
                    let mut depends_on = Vec::with_capacity(request_options.depends_on.len());
                    for dep in &request_options.depends_on {
                        depends_on.push(dep.urn().resolve().await?);
                    }
                    engine
                        .register_resource(RegisterResourceRequest {
                            urn: request_urn,
                            type_token: type_token_owned,
                            name: name_owned,
                            properties,
                            computed: request_inputs.computed_keys(),
                            ignore_changes: request_options.ignore_changes,
                            replace_on_changes: request_options.replace_on_changes,
                            delete_before_replace: request_options.delete_before_replace,
                            depends_on,
                            protect: request_options.protect,
                        })
                        .await
                }
            }
        });

        ctx.track(outputs.apply(|o| o.urn));

        Self {
            state: Arc::new(ResourceState {
                type_token: type_token.to_string(),
                name: name.to_string(),
                urn,
                inputs,
                options,
                outputs,
            }),
        }
    }

    /// Provider-qualified type token, used for runtime type checks.
    pub fn type_token(&self) -> &str {
        &self.state.type_token
    }

    /// Logical name the caller registered the resource under.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The property bag as it was handed to the engine.
    pub fn inputs(&self) -> &PropertyMap {
        &self.state.inputs
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.state.options
    }

    /// The URN as the engine reports it.
    pub fn urn(&self) -> Output<Urn> {
        self.state.outputs.apply(|o| o.urn)
    }

    /// The URN this handle was registered under, known without the engine.
    pub fn local_urn(&self) -> &Urn {
        &self.state.urn
    }

    pub fn id(&self) -> Output<ResourceId> {
        self.state.outputs.apply(|o| o.id)
    }

    /// Every output property.
    pub fn outputs(&self) -> Output<Map<String, Value>> {
        self.state.outputs.apply(|o| o.properties)
    }

    /// A required output property.
    pub fn output<T>(&self, key: &'static str) -> Output<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let name = self.state.name.clone();
        self.state.outputs.try_apply(move |o| match o.properties.get(key) {
            Some(v) if !v.is_null() => Ok(serde_json::from_value(v.clone())?),
            _ => Err(Error::NotFound(format!("output '{key}' of resource '{name}'"))),
        })
    }

    /// An optional output property.
    pub fn output_opt<T>(&self, key: &'static str) -> Output<Option<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.state.outputs.try_apply(move |o| match o.properties.get(key) {
            Some(v) if !v.is_null() => Ok(Some(serde_json::from_value(v.clone())?)),
            _ => Ok(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryEngine, PropertyValue};

    fn context() -> (Arc<MemoryEngine>, Context) {
        let engine = Arc::new(MemoryEngine::default());
        let ctx = Context::new(engine.clone(), "web", "dev");
        (engine, ctx)
    }

    #[tokio::test]
    async fn test_register_create_path() {
        let (engine, ctx) = context();
        let mut inputs = PropertyMap::new();
        inputs.insert("name", PropertyValue::from("deploy"));
        inputs.insert("action_id", PropertyValue::Computed);

        let resource = CustomResource::register(
            &ctx,
            "test:index/thing:Thing",
            "deploy",
            inputs,
            ResourceOptions::new().with_ignore_changes(["name"]),
        );

        assert_eq!(resource.type_token(), "test:index/thing:Thing");
        let name: String = resource.output("name").resolve().await.unwrap();
        assert_eq!(name, "deploy");
        let action_id: i64 = resource.output("action_id").resolve().await.unwrap();
        assert_eq!(action_id, 1);

        let requests = engine.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].computed, vec!["action_id".to_string()]);
        assert_eq!(requests[0].ignore_changes, vec!["name".to_string()]);
    }

    #[tokio::test]
    async fn test_register_read_path_uses_id() {
        let (engine, ctx) = context();
        let mut inputs = PropertyMap::new();
        inputs.insert("name", PropertyValue::from("imported"));

        let resource = CustomResource::register(
            &ctx,
            "test:index/thing:Thing",
            "imported",
            inputs,
            ResourceOptions::new().with_id(ResourceId::from(77)),
        );

        assert_eq!(resource.id().resolve().await.unwrap(), ResourceId::from(77));
        assert!(engine.requests().is_empty());
        let missing: Option<String> = resource.output_opt("host").resolve().await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_missing_required_output() {
        let (_engine, ctx) = context();
        let resource = CustomResource::register(
            &ctx,
            "test:index/thing:Thing",
            "bare",
            PropertyMap::new(),
            ResourceOptions::new(),
        );
        let host = resource.output::<String>("host").resolve().await;
        assert!(matches!(host, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_depends_on_resolves_urns() {
        let (engine, ctx) = context();
        let first = CustomResource::register(
            &ctx,
            "test:index/thing:Thing",
            "first",
            PropertyMap::new(),
            ResourceOptions::new(),
        );
        let second = CustomResource::register(
            &ctx,
            "test:index/thing:Thing",
            "second",
            PropertyMap::new(),
            ResourceOptions::new().with_depends_on(&first),
        );

        second.id().resolve().await.unwrap();
        let requests = engine.requests();
        let second_request = requests.iter().find(|r| r.name == "second").unwrap();
        assert_eq!(second_request.depends_on, vec![first.local_urn().clone()]);
        let outputs = second.outputs().resolve().await.unwrap();
        assert!(outputs.get("action_id").is_none());
        assert_eq!(second.id().resolve().await.unwrap(), ResourceId::from(2));
    }
}
