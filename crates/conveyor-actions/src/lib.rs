//! Typed pipeline-action resources.
//!
//! Every action kind is one resource type with three shapes:
//! - `<Kind>State`: every persisted attribute, all optional
//! - `<Kind>Args`: creation inputs, each known now or deferred
//! - `<Kind>Props`: what the control plane reports after creation
//!
//! The per-kind types are generated by the `pipeline_action!` macro so every
//! kind follows the same construction contract: required fields are checked
//! before anything reaches the engine, the `type` discriminator and the
//! server-assigned fields are always set last, and the owning pipeline is
//! never changed by an update.

#[macro_use]
mod macros;

pub mod actions;
pub mod base;
pub mod catalog;
pub mod types;

#[cfg(test)]
mod testing;

pub use actions::*;
pub use base::PipelineAction;
pub use catalog::KindInfo;
pub use types::{
    Integration, IntegrationRef, IntegrationSource, PermissionGroup, PermissionUser,
    Permissions, PipelineRef, TriggerCondition, Variable,
};
