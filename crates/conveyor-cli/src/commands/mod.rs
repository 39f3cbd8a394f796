//! CLI command implementations.

pub mod kinds;
pub mod preview;

use anyhow::{Context as _, Result};
use conveyor_config::{Program, VariableContext, load_program};
use conveyor_core::{Context, MemoryEngine};
use std::path::Path;
use std::sync::Arc;

pub(crate) fn load(path: &Path, vars: &VariableContext) -> Result<Program> {
    load_program(path, vars)
        .with_context(|| format!("Failed to load program: {}", path.display()))
}

/// Construct every action against a fresh local engine and wait for them.
pub(crate) async fn check(program: &Program, stack: &str) -> Result<usize> {
    let engine = Arc::new(MemoryEngine::new(
        &program.provider.base_url()?,
        program.provider.workspace.clone(),
    ));
    let ctx = Context::new(engine, program.provider.workspace.clone(), stack);
    program.construct(&ctx)?;
    let urns = ctx.wait().await?;
    Ok(urns.len())
}

pub async fn validate(path: &Path, stack: &str) -> Result<()> {
    let vars = VariableContext::from_env();
    let result = match load(path, &vars) {
        Ok(program) => check(&program, stack).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(count) => {
            println!("Configuration is valid ({count} actions)");
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", vars.mask(&format!("{e:#}")));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_counts_actions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conveyor.kdl");
        std::fs::write(
            &path,
            r##"
            project "web" pipeline=4
            action "nap" kind="SLEEP" { sleep-in-seconds 5 }
            action "tag" kind="GIT_TAG" { tag-name "v${date}" }
            "##,
        )
        .unwrap();

        let program = load(&path, &VariableContext::new()).unwrap();
        assert_eq!(check(&program, "dev").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_check_reports_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conveyor.kdl");
        std::fs::write(&path, r##"action "nap" kind="SLEEP""##).unwrap();

        let program = load(&path, &VariableContext::new()).unwrap();
        let err = check(&program, "dev").await.unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("nap"), "{message}");
        assert!(message.contains("project_name"), "{message}");
    }
}
