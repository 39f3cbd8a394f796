//! The engine seam.
//!
//! A [`ResourceEngine`] owns everything past construction: talking to the
//! control plane, diffing against prior state, ordering and retries. Resource
//! wrappers only ever hand it fully resolved requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ResourceId, Result, Urn};

/// Request to create or update a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResourceRequest {
    pub urn: Urn,
    pub type_token: String,
    pub name: String,
    /// Resolved input properties.
    pub properties: Map<String, Value>,
    /// Properties the engine must assign.
    pub computed: Vec<String>,
    /// Properties never applied by an update.
    pub ignore_changes: Vec<String>,
    /// Properties whose change forces a replacement. `"*"` matches any.
    pub replace_on_changes: Vec<String>,
    /// Delete the old resource before creating its replacement.
    pub delete_before_replace: bool,
    pub depends_on: Vec<Urn>,
    pub protect: bool,
}

/// Request to adopt an existing resource by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceRequest {
    pub urn: Urn,
    pub type_token: String,
    pub name: String,
    pub id: ResourceId,
    /// Partial prior state supplied by the caller.
    pub properties: Map<String, Value>,
}

/// What the engine reports back for a registered or read resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOutputs {
    pub urn: Urn,
    pub id: ResourceId,
    pub properties: Map<String, Value>,
}

/// Trait for resource engines.
#[async_trait]
pub trait ResourceEngine: Send + Sync {
    /// Name of this engine.
    fn name(&self) -> &'static str;

    /// Create the resource, or update it if the engine already tracks it.
    async fn register_resource(&self, request: RegisterResourceRequest) -> Result<ResourceOutputs>;

    /// Read an existing resource by id.
    async fn read_resource(&self, request: ReadResourceRequest) -> Result<ResourceOutputs>;
}
