//! Construction contract shared by every action kind.

use conveyor_core::{
    Context, CustomResource, Error, PropertyMap, PropertyValue, ResourceOptions, Result,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{IntegrationSource, Permissions};

/// Fields linking an action to its pipeline. Never changed by an update.
pub const PARENT_LINKAGE_FIELDS: [&str; 2] = ["project_name", "pipeline_id"];

/// Fields only the control plane assigns.
pub const SERVER_ASSIGNED_FIELDS: [&str; 3] = ["action_id", "url", "html_url"];

/// Property carrying the action kind discriminator.
pub const KIND_FIELD: &str = "type";

/// Implemented by every generated action type.
pub trait PipelineAction: Sized {
    /// Provider-qualified type token the engine tracks the resource under.
    const TYPE_TOKEN: &'static str;
    /// Value of the `type` discriminator.
    const KIND: &'static str;
    /// Fields the creation path requires, in check order.
    const REQUIRED_FIELDS: &'static [&'static str];
    /// Whether any change replaces the action instead of updating it.
    const REPLACE_ON_CHANGE: bool;

    type Args: From<Self::State>;
    type State: DeserializeOwned + Default;

    fn create(ctx: &Context, name: &str, args: Self::Args, opts: ResourceOptions) -> Result<Self>;

    fn resource(&self) -> &CustomResource;

    /// Whether `field` holds a list on the wire.
    fn is_list_field(field: &str) -> bool;

    /// Attributes with every required field set, for table-driven tests.
    #[cfg(test)]
    fn sample_attributes() -> serde_json::Map<String, serde_json::Value>;
}

/// Wire shape of a field type.
pub trait FieldShape {
    const LIST: bool = false;
}

impl FieldShape for String {}
impl FieldShape for i64 {}
impl FieldShape for bool {}
impl FieldShape for IntegrationSource {}
impl FieldShape for Permissions {}

impl<T> FieldShape for Vec<T> {
    const LIST: bool = true;
}

pub(crate) fn missing(field: &str) -> Error {
    Error::MissingRequiredField(field.to_string())
}

/// Finish the property bag and register the action with the engine.
///
/// The discriminator and the server-assigned fields go in last so they win
/// over anything copied from args or state. The parent linkage is added to
/// the ignore list; kinds that replace on change also get
/// delete-before-replace semantics.
pub(crate) fn register_action(
    ctx: &Context,
    type_token: &str,
    kind: &str,
    name: &str,
    mut props: PropertyMap,
    opts: ResourceOptions,
    replace_on_change: bool,
) -> CustomResource {
    props.insert(KIND_FIELD, PropertyValue::from(kind));
    for field in SERVER_ASSIGNED_FIELDS {
        props.insert(field, PropertyValue::Computed);
    }

    let opts = prepare_options(opts, replace_on_change);
    debug!(
        kind,
        name,
        fields = props.len(),
        import = opts.id.is_some(),
        "Constructing pipeline action"
    );
    CustomResource::register(ctx, type_token, name, props, opts)
}

pub(crate) fn prepare_options(mut opts: ResourceOptions, replace_on_change: bool) -> ResourceOptions {
    for field in PARENT_LINKAGE_FIELDS {
        opts.ignore(field);
    }
    if replace_on_change {
        opts.delete_before_replace = true;
        if !opts.replace_on_changes.iter().any(|f| f == "*") {
            opts.replace_on_changes.push("*".to_string());
        }
    }
    opts
}

pub(crate) fn server_field<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::NotFound(format!("output '{field}'")))
}
