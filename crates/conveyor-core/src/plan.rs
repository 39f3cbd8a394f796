//! Plan types for previewing what a program would change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::Urn;

/// What the engine would do to one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Replace,
    Delete,
    Same,
    Read,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Create => write!(f, "create"),
            ChangeAction::Update => write!(f, "update"),
            ChangeAction::Replace => write!(f, "replace"),
            ChangeAction::Delete => write!(f, "delete"),
            ChangeAction::Same => write!(f, "same"),
            ChangeAction::Read => write!(f, "read"),
        }
    }
}

/// A resource change in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub urn: Urn,
    pub type_token: String,
    pub name: String,
    pub action: ChangeAction,
    /// Properties that differ, after ignored properties are dropped.
    pub changed: Vec<String>,
    /// Set on replacements that delete the old resource first.
    pub delete_before_replace: bool,
    pub before: Option<Map<String, Value>>,
    pub after: Option<Map<String, Value>>,
}

/// All changes of one preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub changes: Vec<ResourceChange>,
}

impl Default for PlanSummary {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PlanSummary {
    pub fn new(changes: Vec<ResourceChange>) -> Self {
        Self {
            id: Uuid::now_v7(),
            generated_at: Utc::now(),
            changes,
        }
    }

    pub fn count(&self, action: ChangeAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    pub fn find(&self, name: &str) -> Option<&ResourceChange> {
        self.changes.iter().find(|c| c.name == name)
    }

    /// Whether applying the plan would modify anything.
    pub fn has_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|c| !matches!(c.action, ChangeAction::Same | ChangeAction::Read))
    }
}

/// Outcome of comparing old and new inputs of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDiff {
    pub changed: Vec<String>,
    pub replace: bool,
}

impl PropertyDiff {
    pub fn action(&self) -> ChangeAction {
        if self.replace {
            ChangeAction::Replace
        } else if self.changed.is_empty() {
            ChangeAction::Same
        } else {
            ChangeAction::Update
        }
    }
}

/// Compare stored inputs with new ones.
///
/// Keys in `ignore_changes` never count as changed. A change to any key in
/// `replace_on_changes` (or to any key at all when it contains `"*"`) marks
/// the resource for replacement.
pub fn diff_properties(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    ignore_changes: &[String],
    replace_on_changes: &[String],
) -> PropertyDiff {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    let changed: Vec<String> = keys
        .into_iter()
        .filter(|k| !ignore_changes.iter().any(|i| i == *k))
        .filter(|k| old.get(*k) != new.get(*k))
        .cloned()
        .collect();

    let replace_all = replace_on_changes.iter().any(|k| k == "*");
    let replace = changed
        .iter()
        .any(|k| replace_all || replace_on_changes.contains(k));

    PropertyDiff { changed, replace }
}
