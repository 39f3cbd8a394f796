//! Registry of every action kind, for callers that only know the kind name
//! at run time (configuration files, the CLI).

use std::sync::LazyLock;

use conveyor_core::{Context, CustomResource, Error, ResourceOptions, Result};
use serde_json::{Map, Value};

use crate::actions::*;
use crate::base::PipelineAction;

type Constructor = fn(&Context, &str, Map<String, Value>, ResourceOptions) -> Result<CustomResource>;

/// Static description of one action kind.
#[derive(Clone, Copy)]
pub struct KindInfo {
    /// Value of the `type` discriminator, e.g. `SSH_COMMAND`.
    pub kind: &'static str,
    pub type_token: &'static str,
    /// Fields checked on creation, in check order.
    pub required_fields: &'static [&'static str],
    pub replace_on_change: bool,
    constructor: Constructor,
    list_field: fn(&str) -> bool,
    #[cfg(test)]
    sample: fn() -> Map<String, Value>,
}

impl std::fmt::Debug for KindInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindInfo")
            .field("kind", &self.kind)
            .field("type_token", &self.type_token)
            .field("required_fields", &self.required_fields)
            .field("replace_on_change", &self.replace_on_change)
            .finish()
    }
}

impl KindInfo {
    pub fn of<A: PipelineAction>() -> Self {
        Self {
            kind: A::KIND,
            type_token: A::TYPE_TOKEN,
            required_fields: A::REQUIRED_FIELDS,
            replace_on_change: A::REPLACE_ON_CHANGE,
            constructor: construct::<A>,
            list_field: A::is_list_field,
            #[cfg(test)]
            sample: A::sample_attributes,
        }
    }

    /// Whether `field` holds a list. Unknown fields are not lists.
    pub fn is_list_field(&self, field: &str) -> bool {
        (self.list_field)(field)
    }

    /// Construct an action of this kind from untyped attributes.
    ///
    /// The attributes are decoded into the kind's state shape first, so
    /// unknown fields and values of the wrong type are rejected with
    /// [`Error::InvalidInput`] before any required-field check.
    pub fn construct(
        &self,
        ctx: &Context,
        name: &str,
        attributes: Map<String, Value>,
        opts: ResourceOptions,
    ) -> Result<CustomResource> {
        (self.constructor)(ctx, name, attributes, opts)
    }
}

fn construct<A: PipelineAction>(
    ctx: &Context,
    name: &str,
    attributes: Map<String, Value>,
    opts: ResourceOptions,
) -> Result<CustomResource> {
    let state: A::State = serde_json::from_value(Value::Object(attributes))
        .map_err(|e| Error::InvalidInput(format!("{} '{name}': {e}", A::KIND)))?;
    let action = A::create(ctx, name, A::Args::from(state), opts)?;
    Ok(action.resource().clone())
}

static KINDS: LazyLock<Vec<KindInfo>> = LazyLock::new(|| {
    vec![
        KindInfo::of::<Build>(),
        KindInfo::of::<SshCommand>(),
        KindInfo::of::<Sleep>(),
        KindInfo::of::<GitPush>(),
        KindInfo::of::<GitTag>(),
        KindInfo::of::<DockerfileBuild>(),
        KindInfo::of::<DockerImagePush>(),
        KindInfo::of::<KubernetesApply>(),
        KindInfo::of::<KubernetesSetImage>(),
        KindInfo::of::<KubernetesRunJob>(),
        KindInfo::of::<HelmCharts>(),
        KindInfo::of::<Sftp>(),
        KindInfo::of::<Rsync>(),
        KindInfo::of::<AmazonS3>(),
        KindInfo::of::<GoogleCloudStorage>(),
        KindInfo::of::<AwsLambdaDeploy>(),
        KindInfo::of::<TerraformApply>(),
        KindInfo::of::<Slack>(),
        KindInfo::of::<Email>(),
        KindInfo::of::<HttpRequest>(),
        KindInfo::of::<RunNextPipeline>(),
        KindInfo::of::<WaitForApproval>(),
    ]
});

/// Every known kind, in a stable order.
pub fn kinds() -> &'static [KindInfo] {
    &KINDS
}

/// Find a kind by its `type` discriminator.
pub fn lookup(kind: &str) -> Option<&'static KindInfo> {
    KINDS.iter().find(|k| k.kind == kind)
}

/// Find a kind by its type token.
pub fn lookup_type_token(type_token: &str) -> Option<&'static KindInfo> {
    KINDS.iter().find(|k| k.type_token == type_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{KIND_FIELD, PARENT_LINKAGE_FIELDS, SERVER_ASSIGNED_FIELDS};
    use crate::testing::context;
    use crate::types::{Integration, IntegrationRef, IntegrationSource};
    use conveyor_core::plan::ChangeAction;
    use conveyor_core::{Input, Output, ResourceId};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_kinds_are_unique() {
        let names: HashSet<_> = kinds().iter().map(|k| k.kind).collect();
        let tokens: HashSet<_> = kinds().iter().map(|k| k.type_token).collect();
        assert_eq!(names.len(), 22);
        assert_eq!(tokens.len(), 22);
        assert_eq!(lookup("SSH_COMMAND").unwrap().type_token, SshCommand::TYPE_TOKEN);
        assert!(lookup("ssh_command").is_none());
        assert_eq!(lookup_type_token(Sleep::TYPE_TOKEN).unwrap().kind, "SLEEP");
    }

    #[test]
    fn test_list_fields() {
        let info = lookup("SSH_COMMAND").unwrap();
        assert!(info.is_list_field("commands"));
        assert!(info.is_list_field("variables"));
        assert!(!info.is_list_field("host"));
        assert!(!info.is_list_field("integration"));
        assert!(!info.is_list_field("nope"));
    }

    #[test]
    fn test_common_fields_required_first() {
        for info in kinds() {
            assert_eq!(
                &info.required_fields[..3],
                &["project_name", "pipeline_id", "name"],
                "{}",
                info.kind
            );
        }
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let (engine, ctx) = context();
        for info in kinds() {
            for field in info.required_fields {
                let mut attrs = (info.sample)();
                attrs.remove(*field);
                let err = info
                    .construct(&ctx, "missing", attrs, ResourceOptions::new())
                    .unwrap_err();
                assert_eq!(
                    err,
                    Error::MissingRequiredField(field.to_string()),
                    "{}",
                    info.kind
                );
            }
        }
        assert_eq!(ctx.registered(), 0);
        assert!(engine.requests().is_empty());
    }

    #[test]
    fn test_first_missing_field_wins() {
        let (_engine, ctx) = context();
        let info = lookup("SLACK").unwrap();
        let err = info
            .construct(&ctx, "notify", Map::new(), ResourceOptions::new())
            .unwrap_err();
        assert_eq!(err, Error::MissingRequiredField("project_name".to_string()));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let (_engine, ctx) = context();
        let info = lookup("SLEEP").unwrap();
        let mut attrs = (info.sample)();
        attrs.insert("sleep_in_minutes".to_string(), json!(3));
        let err = info
            .construct(&ctx, "nap", attrs, ResourceOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_construct_sets_discriminator_and_options() {
        let (_engine, ctx) = context();
        for info in kinds() {
            let resource = info
                .construct(&ctx, info.kind, (info.sample)(), ResourceOptions::new())
                .unwrap();
            assert_eq!(resource.type_token(), info.type_token);
            assert_eq!(
                resource.inputs().get(KIND_FIELD).and_then(|v| v.as_value()),
                Some(&json!(info.kind))
            );
            for field in SERVER_ASSIGNED_FIELDS {
                assert!(resource.inputs().get(field).unwrap().is_computed());
            }
            let opts = resource.options();
            for field in PARENT_LINKAGE_FIELDS {
                assert!(opts.ignore_changes.iter().any(|f| f == field));
            }
            assert_eq!(opts.delete_before_replace, info.replace_on_change, "{}", info.kind);
        }
        assert_eq!(ctx.registered(), 22);
    }

    #[test]
    fn test_replace_kinds() {
        let replacing: Vec<_> = kinds()
            .iter()
            .filter(|k| k.replace_on_change)
            .map(|k| k.kind)
            .collect();
        assert_eq!(replacing, vec!["KUBERNETES_RUN_JOB", "RUN_NEXT_PIPELINE"]);
    }

    #[test]
    fn test_discriminator_in_attributes_is_overwritten() {
        let (_engine, ctx) = context();
        let info = lookup("EMAIL").unwrap();
        let mut attrs = (info.sample)();
        attrs.insert("type".to_string(), json!("SLACK"));
        let resource = info
            .construct(&ctx, "mail", attrs, ResourceOptions::new())
            .unwrap();
        assert_eq!(
            resource.inputs().get("type").and_then(|v| v.as_value()),
            Some(&json!("EMAIL"))
        );
    }

    #[tokio::test]
    async fn test_every_kind_creates() {
        let (engine, ctx) = context();
        for info in kinds() {
            info.construct(&ctx, info.kind, (info.sample)(), ResourceOptions::new())
                .unwrap();
        }
        let urns = ctx.wait().await.unwrap();
        assert_eq!(urns.len(), 22);
        assert_eq!(engine.plan().count(ChangeAction::Create), 22);
    }

    #[tokio::test]
    async fn test_typed_construction_and_props() {
        let (engine, ctx) = context();
        let build = Build::new(
            &ctx,
            "compile",
            BuildArgs {
                project_name: Some("web".into()),
                pipeline_id: Some(Input::Value(12)),
                name: Some("Compile".into()),
                docker_image_name: Some("library/rust".into()),
                docker_image_tag: Some("1.85".into()),
                execute_commands: Some(vec!["cargo build", "cargo test"].into()),
                ..Default::default()
            },
            ResourceOptions::new(),
        )
        .unwrap();
        ctx.wait().await.unwrap();

        let props = build.props().resolve().await.unwrap();
        assert_eq!(props.action_id, 1);
        assert_eq!(props.pipeline.project_name, "web");
        assert_eq!(props.pipeline.pipeline_id, 12);
        assert_eq!(
            props.html_url,
            "https://app.conveyor.local/local/web/pipelines/pipeline/12/action/1"
        );
        assert_eq!(props.attributes.kind.as_deref(), Some("BUILD"));
        assert_eq!(build.docker_image_tag().resolve().await.unwrap(), "1.85");
        assert_eq!(build.shell().resolve().await.unwrap(), None);
        assert_eq!(build.kind().resolve().await.unwrap(), "BUILD");

        let requests = engine.requests();
        let request = &requests[0];
        assert!(!request.properties.contains_key("action_id"));
        assert_eq!(request.properties["execute_commands"], json!(["cargo build", "cargo test"]));
    }

    #[tokio::test]
    async fn test_deferred_input_resolves_before_register() {
        let (engine, ctx) = context();
        let tag = GitTag::new(
            &ctx,
            "tag",
            GitTagArgs {
                project_name: Some("web".into()),
                pipeline_id: Some(Input::Value(3)),
                name: Some("Tag".into()),
                tag_name: Some(Output::ready("v1.0.0".to_string()).into()),
                ..Default::default()
            },
            ResourceOptions::new(),
        )
        .unwrap();
        assert!(matches!(
            tag.resource().inputs().get("tag_name"),
            Some(conveyor_core::PropertyValue::Deferred(_))
        ));
        ctx.wait().await.unwrap();
        assert_eq!(engine.requests()[0].properties["tag_name"], json!("v1.0.0"));
    }

    #[tokio::test]
    async fn test_get_adopts_without_required_fields() {
        let (engine, ctx) = context();
        let approval = WaitForApproval::get(
            &ctx,
            "approve",
            ResourceId::from(42),
            Some(WaitForApprovalState {
                comment: Some("ship it?".to_string()),
                kind: Some("BOGUS".to_string()),
                ..Default::default()
            }),
            ResourceOptions::new(),
        )
        .unwrap();

        assert_eq!(
            approval.resource().inputs().get("type").and_then(|v| v.as_value()),
            Some(&json!("WAIT_FOR_APPLY"))
        );
        ctx.wait().await.unwrap();
        assert!(engine.requests().is_empty());
        assert_eq!(approval.action_id().resolve().await.unwrap(), 42);
        assert_eq!(approval.comment().resolve().await.unwrap(), "ship it?");
        assert_eq!(engine.plan().count(ChangeAction::Read), 1);
        // No owning pipeline was supplied.
        assert!(matches!(
            approval.props().resolve().await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_every_kind_imports_without_attributes() {
        let (engine, ctx) = context();
        for (n, info) in kinds().iter().enumerate() {
            let opts = ResourceOptions::new().with_id(ResourceId::from(100 + n as i64));
            let resource = info
                .construct(&ctx, info.kind, Map::new(), opts)
                .unwrap_or_else(|e| panic!("{}: {e}", info.kind));
            assert_eq!(
                resource.inputs().get(KIND_FIELD).and_then(|v| v.as_value()),
                Some(&json!(info.kind))
            );
        }
        ctx.wait().await.unwrap();

        assert!(engine.requests().is_empty());
        let plan = engine.plan();
        assert_eq!(plan.count(ChangeAction::Read), 22);
        assert_eq!(plan.changes.len(), 22);
        for info in kinds() {
            assert_eq!(plan.find(info.kind).unwrap().action, ChangeAction::Read);
        }
    }

    #[tokio::test]
    async fn test_every_kind_imports_with_partial_attributes() {
        let (engine, ctx) = context();
        for (n, info) in kinds().iter().enumerate() {
            let mut attrs = Map::new();
            attrs.insert("name".to_string(), json!("imported"));
            let opts = ResourceOptions::new().with_id(ResourceId::from(200 + n as i64));
            info.construct(&ctx, info.kind, attrs, opts)
                .unwrap_or_else(|e| panic!("{}: {e}", info.kind));
        }
        ctx.wait().await.unwrap();
        assert_eq!(engine.plan().count(ChangeAction::Read), 22);
    }

    fn slack_args(integration: Input<IntegrationSource>) -> SlackArgs {
        SlackArgs {
            project_name: Some("web".into()),
            pipeline_id: Some(Input::Value(1)),
            name: Some("Notify".into()),
            channel: Some("#deploys".into()),
            content: Some("done".into()),
            integration: Some(integration),
            ..Default::default()
        }
    }

    fn integration() -> Integration {
        Integration {
            hash_id: "h4sh".to_string(),
            name: "team slack".to_string(),
            kind: "SLACK".to_string(),
            scope: Some("WORKSPACE".to_string()),
            html_url: Some("https://app.conveyor.local/integrations/h4sh".to_string()),
        }
    }

    #[tokio::test]
    async fn test_integration_is_normalized() {
        let (engine, ctx) = context();
        Slack::new(&ctx, "full", slack_args(integration().into()), ResourceOptions::new())
            .unwrap();
        Slack::new(
            &ctx,
            "reference",
            slack_args(IntegrationRef::new("h4sh").into()),
            ResourceOptions::new(),
        )
        .unwrap();
        Slack::new(
            &ctx,
            "deferred",
            slack_args(IntegrationSource::deferred(Output::ready(integration()))),
            ResourceOptions::new(),
        )
        .unwrap();
        ctx.wait().await.unwrap();

        let requests = engine.requests();
        assert_eq!(requests.len(), 3);
        for request in requests {
            assert_eq!(request.properties["integration"], json!({"hash_id": "h4sh"}));
        }
    }

    #[tokio::test]
    async fn test_update_ignores_parent_linkage() {
        let (engine, ctx) = context();
        let info = lookup("SLEEP").unwrap();
        info.construct(&ctx, "nap", (info.sample)(), ResourceOptions::new())
            .unwrap();
        ctx.wait().await.unwrap();
        let snapshot = engine.snapshot(true);

        let engine = std::sync::Arc::new(conveyor_core::MemoryEngine::default().with_snapshot(snapshot));
        let ctx = Context::new(engine.clone(), "web", "dev");
        let mut attrs = (info.sample)();
        attrs.insert("pipeline_id".to_string(), json!(99));
        attrs.insert("sleep_in_seconds".to_string(), json!(30));
        info.construct(&ctx, "nap", attrs, ResourceOptions::new())
            .unwrap();
        ctx.wait().await.unwrap();

        let plan = engine.plan();
        let change = plan.find("nap").unwrap();
        assert_eq!(change.action, ChangeAction::Update);
        assert_eq!(change.changed, vec!["sleep_in_seconds".to_string()]);
        let after = change.after.as_ref().unwrap();
        assert_eq!(after["pipeline_id"], json!(1));
        assert_eq!(after["action_id"], json!(1));
    }

    #[tokio::test]
    async fn test_replace_kind_replaces_on_any_change() {
        let (engine, ctx) = context();
        let info = lookup("RUN_NEXT_PIPELINE").unwrap();
        info.construct(&ctx, "next", (info.sample)(), ResourceOptions::new())
            .unwrap();
        ctx.wait().await.unwrap();

        let engine = std::sync::Arc::new(
            conveyor_core::MemoryEngine::default().with_snapshot(engine.snapshot(true)),
        );
        let ctx = Context::new(engine.clone(), "web", "dev");
        let mut attrs = (info.sample)();
        attrs.insert("next_pipeline_id".to_string(), json!(7));
        info.construct(&ctx, "next", attrs, ResourceOptions::new())
            .unwrap();
        ctx.wait().await.unwrap();

        let change = engine.plan().find("next").cloned().unwrap();
        assert_eq!(change.action, ChangeAction::Replace);
        assert!(change.delete_before_replace);
        assert_eq!(change.after.unwrap()["action_id"], json!(2));
    }

    #[test]
    fn test_try_from_checks_type() {
        let (_engine, ctx) = context();
        let info = lookup("SLEEP").unwrap();
        let resource = info
            .construct(&ctx, "nap", (info.sample)(), ResourceOptions::new())
            .unwrap();
        assert!(Sleep::is_instance(&resource));
        assert!(!Email::is_instance(&resource));
        assert!(Sleep::try_from(resource.clone()).is_ok());
        assert!(matches!(Email::try_from(resource), Err(Error::InvalidInput(_))));
    }
}
