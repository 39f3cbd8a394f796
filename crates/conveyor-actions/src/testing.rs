//! Test helpers.

use std::sync::Arc;

use conveyor_core::{Context, MemoryEngine};

use crate::types::{IntegrationRef, IntegrationSource};

/// Produces a placeholder value of a field type.
pub(crate) trait Sample {
    fn sample() -> Self;
}

impl Sample for String {
    fn sample() -> Self {
        "sample".to_string()
    }
}

impl Sample for i64 {
    fn sample() -> Self {
        1
    }
}

impl Sample for bool {
    fn sample() -> Self {
        true
    }
}

impl<T: Sample> Sample for Vec<T> {
    fn sample() -> Self {
        vec![T::sample()]
    }
}

impl Sample for IntegrationSource {
    fn sample() -> Self {
        IntegrationSource::Ref(IntegrationRef::new("sample-hash"))
    }
}

pub(crate) fn context() -> (Arc<MemoryEngine>, Context) {
    let engine = Arc::new(MemoryEngine::default());
    let ctx = Context::new(engine.clone(), "web", "dev");
    (engine, ctx)
}
