//! Core runtime types for Conveyor pipeline-action resources.
//!
//! This crate contains:
//! - Resource identifiers and URNs
//! - Deferred values (`Output`) and resource inputs (`Input`)
//! - The untyped property bag handed to the engine
//! - Resource options and the `CustomResource` base handle
//! - The `ResourceEngine` trait and a local in-memory engine
//! - Plan/diff types used for previews

pub mod context;
pub mod engine;
pub mod error;
pub mod id;
pub mod memory;
pub mod output;
pub mod plan;
pub mod property;
pub mod resource;

pub use context::Context;
pub use engine::{ReadResourceRequest, RegisterResourceRequest, ResourceEngine, ResourceOutputs};
pub use error::{Error, Result};
pub use id::{ResourceId, Urn};
pub use memory::MemoryEngine;
pub use output::{Input, Output};
pub use property::{PropertyMap, PropertyValue};
pub use resource::{CustomResource, ResourceOptions};
