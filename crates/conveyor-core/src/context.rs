//! Program context: the engine plus every resource registered against it.

use std::sync::{Arc, Mutex};
use tracing::info;

use crate::{Output, ResourceEngine, Result, Urn};

/// Shared state for one run of a resource program.
#[derive(Clone)]
pub struct Context {
    engine: Arc<dyn ResourceEngine>,
    project: String,
    stack: String,
    registrations: Arc<Mutex<Vec<Output<Urn>>>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("engine", &self.engine.name())
            .field("project", &self.project)
            .field("stack", &self.stack)
            .finish()
    }
}

impl Context {
    pub fn new(
        engine: Arc<dyn ResourceEngine>,
        project: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            project: project.into(),
            stack: stack.into(),
            registrations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn engine(&self) -> Arc<dyn ResourceEngine> {
        self.engine.clone()
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// URN a resource of `type_token` named `name` is tracked under.
    pub fn urn(&self, type_token: &str, name: &str) -> Urn {
        Urn::new(&self.stack, &self.project, type_token, name)
    }

    pub(crate) fn track(&self, registration: Output<Urn>) {
        self.registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(registration);
    }

    /// Number of resources registered so far.
    pub fn registered(&self) -> usize {
        self.registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Drive every registration to completion.
    ///
    /// Returns the URNs in registration order, or the first failure.
    pub async fn wait(&self) -> Result<Vec<Urn>> {
        let pending = self
            .registrations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let count = pending.len();
        let urns = Output::all(pending).resolve().await?;
        info!(
            engine = self.engine.name(),
            project = %self.project,
            stack = %self.stack,
            resources = count,
            "Program complete"
        );
        Ok(urns)
    }
}
