//! In-memory engine for previews and tests.
//!
//! Stands in for the remote control plane: assigns sequential numeric ids,
//! fills in the computed `action_id`, `url` and `html_url` properties, keeps
//! prior state (optionally persisted as JSON) and records a plan of what a
//! real engine would do.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::engine::{ReadResourceRequest, RegisterResourceRequest, ResourceEngine, ResourceOutputs};
use crate::plan::{ChangeAction, PlanSummary, ResourceChange, diff_properties};
use crate::{Error, ResourceId, Result, Urn};

const DEFAULT_BASE_URL: &str = "https://app.conveyor.local";
const DEFAULT_WORKSPACE: &str = "local";
const SERVER_ASSIGNED: [&str; 3] = ["action_id", "url", "html_url"];

/// A resource as the engine remembers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResource {
    pub urn: Urn,
    pub type_token: String,
    pub name: String,
    pub id: ResourceId,
    pub inputs: Map<String, Value>,
    pub outputs: Map<String, Value>,
    #[serde(default)]
    pub protect: bool,
}

/// Serializable engine state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub next_id: i64,
    pub resources: Vec<StoredResource>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    resources: BTreeMap<Urn, StoredResource>,
    seen: BTreeSet<Urn>,
    changes: Vec<ResourceChange>,
    requests: Vec<RegisterResourceRequest>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Local [`ResourceEngine`] keeping everything in memory.
#[derive(Debug)]
pub struct MemoryEngine {
    base_url: String,
    workspace: String,
    state: Mutex<MemoryState>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace: DEFAULT_WORKSPACE.to_string(),
            state: Mutex::new(MemoryState::default()),
        }
    }
}

impl MemoryEngine {
    pub fn new(base_url: &Url, workspace: impl Into<String>) -> Self {
        Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            workspace: workspace.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Seed the engine with previously saved state.
    pub fn with_snapshot(self, snapshot: EngineSnapshot) -> Self {
        {
            let mut state = self.lock();
            state.next_id = snapshot.next_id;
            state.resources = snapshot
                .resources
                .into_iter()
                .map(|r| (r.urn.clone(), r))
                .collect();
        }
        self
    }

    /// Load a snapshot from `path`. A missing file yields an empty snapshot.
    pub fn load_snapshot(path: &Path) -> Result<EngineSnapshot> {
        if !path.exists() {
            return Ok(EngineSnapshot::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Current state. Resources not registered since the last reset are
    /// dropped when `prune` is set, the way an apply would delete them.
    pub fn snapshot(&self, prune: bool) -> EngineSnapshot {
        let state = self.lock();
        let resources = state
            .resources
            .values()
            .filter(|r| !prune || state.seen.contains(&r.urn) || r.protect)
            .cloned()
            .collect();
        EngineSnapshot {
            next_id: state.next_id,
            resources,
        }
    }

    pub fn save_snapshot(&self, path: &Path, prune: bool) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.snapshot(prune))?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "Saved engine state");
        Ok(())
    }

    /// Every register request received, in arrival order.
    pub fn requests(&self) -> Vec<RegisterResourceRequest> {
        self.lock().requests.clone()
    }

    /// Look up a stored resource by URN.
    pub fn resource(&self, urn: &Urn) -> Option<StoredResource> {
        self.lock().resources.get(urn).cloned()
    }

    /// The plan so far. Tracked resources that were not registered in this
    /// run are reported as deletions.
    pub fn plan(&self) -> PlanSummary {
        let state = self.lock();
        let mut changes = state.changes.clone();
        for resource in state.resources.values() {
            if state.seen.contains(&resource.urn) || resource.protect {
                continue;
            }
            changes.push(ResourceChange {
                urn: resource.urn.clone(),
                type_token: resource.type_token.clone(),
                name: resource.name.clone(),
                action: ChangeAction::Delete,
                changed: Vec::new(),
                delete_before_replace: false,
                before: Some(resource.outputs.clone()),
                after: None,
            });
        }
        PlanSummary::new(changes)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fill in the properties only the engine can assign.
    fn assign_computed(&self, outputs: &mut Map<String, Value>, computed: &[String], id: i64) {
        let base = &self.base_url;
        let project = outputs
            .get("project_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let pipeline = outputs
            .get("pipeline_id")
            .map(|v| v.to_string())
            .unwrap_or_default();

        for key in computed {
            let value = match key.as_str() {
                "action_id" => Value::from(id),
                "url" => Value::from(format!(
                    "{base}/workspaces/{}/projects/{project}/pipelines/{pipeline}/actions/{id}",
                    self.workspace
                )),
                "html_url" => Value::from(format!(
                    "{base}/{}/{project}/pipelines/pipeline/{pipeline}/action/{id}",
                    self.workspace
                )),
                _ => Value::Null,
            };
            outputs.insert(key.clone(), value);
        }
    }
}

#[async_trait]
impl ResourceEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn register_resource(&self, request: RegisterResourceRequest) -> Result<ResourceOutputs> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if !state.seen.insert(request.urn.clone()) {
            return Err(Error::InvalidInput(format!(
                "duplicate resource registration: {}",
                request.urn
            )));
        }

        let previous = state.resources.get(&request.urn).cloned();
        let (action, changed, id, inputs) = match &previous {
            None => {
                let id = state.allocate_id();
                (ChangeAction::Create, Vec::new(), id, request.properties.clone())
            }
            Some(old) => {
                let diff = diff_properties(
                    &old.inputs,
                    &request.properties,
                    &request.ignore_changes,
                    &request.replace_on_changes,
                );
                let mut inputs = request.properties.clone();
                // Ignored properties keep their stored values.
                for key in &request.ignore_changes {
                    match old.inputs.get(key) {
                        Some(v) => inputs.insert(key.clone(), v.clone()),
                        None => inputs.remove(key),
                    };
                }
                let id = match diff.action() {
                    ChangeAction::Replace => state.allocate_id(),
                    _ => old
                        .id
                        .as_number()
                        .ok_or_else(|| Error::Internal(format!("non-numeric id {}", old.id)))?,
                };
                (diff.action(), diff.changed, id, inputs)
            }
        };

        let mut outputs = inputs.clone();
        match (&previous, action) {
            (Some(old), ChangeAction::Same | ChangeAction::Update) => {
                for key in &request.computed {
                    if let Some(v) = old.outputs.get(key) {
                        outputs.insert(key.clone(), v.clone());
                    }
                }
            }
            _ => self.assign_computed(&mut outputs, &request.computed, id),
        }

        debug!(urn = %request.urn, %action, id, "Registered resource");

        let stored = StoredResource {
            urn: request.urn.clone(),
            type_token: request.type_token.clone(),
            name: request.name.clone(),
            id: ResourceId::from(id),
            inputs,
            outputs: outputs.clone(),
            protect: request.protect,
        };
        state.resources.insert(request.urn.clone(), stored);
        state.changes.push(ResourceChange {
            urn: request.urn.clone(),
            type_token: request.type_token,
            name: request.name,
            action,
            changed,
            delete_before_replace: action == ChangeAction::Replace
                && request.delete_before_replace,
            before: previous.map(|p| p.outputs),
            after: Some(outputs.clone()),
        });

        Ok(ResourceOutputs {
            urn: request.urn,
            id: ResourceId::from(id),
            properties: outputs,
        })
    }

    async fn read_resource(&self, request: ReadResourceRequest) -> Result<ResourceOutputs> {
        let mut state = self.lock();
        if !state.seen.insert(request.urn.clone()) {
            return Err(Error::InvalidInput(format!(
                "duplicate resource registration: {}",
                request.urn
            )));
        }

        let existing = state
            .resources
            .values()
            .find(|r| r.type_token == request.type_token && r.id == request.id)
            .cloned();

        let (outputs, protect) = match existing {
            Some(found) => {
                // Adopted under another name: the stored entry moves, it is not deleted.
                if found.urn != request.urn && !state.seen.contains(&found.urn) {
                    state.resources.remove(&found.urn);
                }
                (found.outputs, found.protect)
            }
            None => {
                // Adopt the caller's partial state under the given id.
                let mut outputs = request.properties.clone();
                if let Some(id) = request.id.as_number() {
                    self.assign_computed(&mut outputs, &SERVER_ASSIGNED.map(String::from), id);
                }
                (outputs, false)
            }
        };

        debug!(urn = %request.urn, id = %request.id, "Read resource");

        state.resources.insert(
            request.urn.clone(),
            StoredResource {
                urn: request.urn.clone(),
                type_token: request.type_token.clone(),
                name: request.name.clone(),
                id: request.id.clone(),
                inputs: request.properties,
                outputs: outputs.clone(),
                protect,
            },
        );
        state.changes.push(ResourceChange {
            urn: request.urn.clone(),
            type_token: request.type_token,
            name: request.name,
            action: ChangeAction::Read,
            changed: Vec::new(),
            delete_before_replace: false,
            before: None,
            after: Some(outputs.clone()),
        });

        Ok(ResourceOutputs {
            urn: request.urn,
            id: request.id,
            properties: outputs,
        })
    }
}
