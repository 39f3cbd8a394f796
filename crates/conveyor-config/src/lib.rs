//! KDL configuration for Conveyor programs.
//!
//! This crate handles parsing of:
//! - Program files (provider settings, project defaults, declared actions)
//! - Variable interpolation in string values

pub mod error;
pub mod program;
pub mod provider;
pub mod variables;

pub use error::{ConfigError, ConfigResult};
pub use program::{ActionDecl, Program, load_program, parse_program};
pub use provider::ProviderConfig;
pub use variables::{VariableContext, VariableContextBuilder};
