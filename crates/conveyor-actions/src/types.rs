//! Field groups shared by many action kinds.

use conveyor_core::{Error, Input, Output, Result};
use serde::{Deserialize, Serialize};

/// A variable exposed to an action at run time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// `VAR`, `FILE` or `SSH_KEY`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    /// Whether the value may be overridden when a run is triggered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target path when `type` is `FILE` or `SSH_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_chmod: Option<String>,
    /// `CONTAINER` or `NONE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_place: Option<String>,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            kind: Some("VAR".to_string()),
            ..Default::default()
        }
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = Some(true);
        self
    }
}

/// A condition that must hold for an action to run.
///
/// Which of the optional fields apply depends on `trigger_condition`, e.g.
/// `trigger_condition_paths` is required when it is `ON_CHANGE_AT_PATH`.
/// That dependency is documented only; it is not checked here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    /// `ALWAYS`, `ON_CHANGE`, `ON_CHANGE_AT_PATH`, `VAR_IS`, `VAR_IS_NOT`,
    /// `VAR_CONTAINS`, `DATETIME`, `SUCCESS_PIPELINE`, ...
    pub trigger_condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_condition_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_variable_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_variable_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_hours: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_days: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_pipeline_name: Option<String>,
}

impl TriggerCondition {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            trigger_condition: condition.into(),
            ..Default::default()
        }
    }
}

/// Access granted to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionUser {
    pub id: i64,
    /// `DENIED`, `READ_ONLY`, `RUN_ONLY` or `READ_WRITE`.
    pub access_level: String,
}

/// Access granted to one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGroup {
    pub id: i64,
    pub access_level: String,
}

/// Who may see and run an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    /// Access level for everyone not listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<PermissionUser>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<PermissionGroup>>,
}

/// A stored credential for a third-party service, as the control plane
/// describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub hash_id: String,
    pub name: String,
    /// Service type, e.g. `AMAZON`, `SLACK`, `GOOGLE_SERVICE_ACCOUNT`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// The lightweight form of an integration: just its hash id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrationRef {
    pub hash_id: String,
}

impl IntegrationRef {
    pub fn new(hash_id: impl Into<String>) -> Self {
        Self {
            hash_id: hash_id.into(),
        }
    }
}

/// An integration supplied to an action, either as the full object or as a
/// reference.
///
/// Only the reference ever reaches the engine: serialization goes through
/// [`IntegrationSource::normalize`], and deserialization always yields
/// [`IntegrationSource::Ref`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "IntegrationRef", from = "IntegrationRef")]
pub enum IntegrationSource {
    Full(Integration),
    Ref(IntegrationRef),
}

impl IntegrationSource {
    pub fn hash_id(&self) -> &str {
        match self {
            IntegrationSource::Full(i) => &i.hash_id,
            IntegrationSource::Ref(r) => &r.hash_id,
        }
    }

    /// Reduce to the lightweight reference. References pass through unchanged.
    pub fn normalize(self) -> IntegrationRef {
        match self {
            IntegrationSource::Full(i) => IntegrationRef { hash_id: i.hash_id },
            IntegrationSource::Ref(r) => r,
        }
    }

    /// An input fed by a deferred integration, typically another resource's
    /// output. Normalization runs once the integration resolves.
    pub fn deferred(integration: Output<Integration>) -> Input<IntegrationSource> {
        Input::Output(integration.apply(IntegrationSource::Full))
    }
}

impl From<IntegrationSource> for IntegrationRef {
    fn from(source: IntegrationSource) -> Self {
        source.normalize()
    }
}

impl From<IntegrationRef> for IntegrationSource {
    fn from(reference: IntegrationRef) -> Self {
        IntegrationSource::Ref(reference)
    }
}

impl From<Integration> for IntegrationSource {
    fn from(integration: Integration) -> Self {
        IntegrationSource::Full(integration)
    }
}

impl From<Integration> for Input<IntegrationSource> {
    fn from(integration: Integration) -> Self {
        Input::Value(IntegrationSource::Full(integration))
    }
}

impl From<IntegrationRef> for Input<IntegrationSource> {
    fn from(reference: IntegrationRef) -> Self {
        Input::Value(IntegrationSource::Ref(reference))
    }
}

impl From<Permissions> for Input<Permissions> {
    fn from(permissions: Permissions) -> Self {
        Input::Value(permissions)
    }
}

/// Back-reference from an action to the pipeline that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRef {
    pub project_name: String,
    pub pipeline_id: i64,
}

impl PipelineRef {
    pub fn new(project_name: impl Into<String>, pipeline_id: i64) -> Self {
        Self {
            project_name: project_name.into(),
            pipeline_id,
        }
    }

    pub(crate) fn from_parts(project_name: Option<String>, pipeline_id: Option<i64>) -> Result<Self> {
        match (project_name, pipeline_id) {
            (Some(project_name), Some(pipeline_id)) => Ok(Self {
                project_name,
                pipeline_id,
            }),
            (None, _) => Err(Error::NotFound("output 'project_name'".to_string())),
            (_, None) => Err(Error::NotFound("output 'pipeline_id'".to_string())),
        }
    }
}
