//! Action kinds, grouped by what they act on.

pub mod cloud;
pub mod container;
pub mod flow;
pub mod git;
pub mod kubernetes;
pub mod notify;
pub mod shell;
pub mod transfer;

pub use cloud::*;
pub use container::*;
pub use flow::*;
pub use git::*;
pub use kubernetes::*;
pub use notify::*;
pub use shell::*;
pub use transfer::*;
