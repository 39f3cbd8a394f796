//! Plan preview against the local engine.

use anyhow::{Context as _, Result};
use conveyor_actions::catalog;
use conveyor_config::{Program, VariableContext};
use conveyor_core::plan::{ChangeAction, PlanSummary, ResourceChange};
use conveyor_core::{Context, MemoryEngine};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Print what applying the program at `path` would change.
pub async fn preview(
    path: &Path,
    stack: &str,
    state: Option<&Path>,
    save: bool,
    json: bool,
) -> Result<()> {
    let vars = VariableContext::from_env();
    let program = super::load(path, &vars)?;
    let plan = run(&program, stack, state, save).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&plan)?;
        println!("{}", vars.mask(&rendered));
        return Ok(());
    }

    println!("Preview of {} ({stack})\n", path.display());
    for change in &plan.changes {
        println!("{}", render(change));
    }
    println!(
        "\n{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
        plan.count(ChangeAction::Create),
        plan.count(ChangeAction::Update),
        plan.count(ChangeAction::Replace),
        plan.count(ChangeAction::Delete),
        plan.count(ChangeAction::Same),
    );
    if save {
        println!("State saved");
    }
    Ok(())
}

/// Run the program against a [`MemoryEngine`] seeded from `state` and
/// return the plan. With `save`, the resulting state replaces `state`.
pub(crate) async fn run(
    program: &Program,
    stack: &str,
    state: Option<&Path>,
    save: bool,
) -> Result<PlanSummary> {
    let snapshot = match state {
        Some(path) => MemoryEngine::load_snapshot(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?,
        None => Default::default(),
    };
    let engine = Arc::new(
        MemoryEngine::new(
            &program.provider.base_url()?,
            program.provider.workspace.clone(),
        )
        .with_snapshot(snapshot),
    );
    let ctx = Context::new(engine.clone(), program.provider.workspace.clone(), stack);

    program.construct(&ctx)?;
    ctx.wait().await.context("Program failed")?;

    let plan = engine.plan();
    info!(plan = %plan.id, changes = plan.changes.len(), "Preview complete");

    if let (true, Some(path)) = (save, state) {
        engine
            .save_snapshot(path, true)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;
    }
    Ok(plan)
}

fn render(change: &ResourceChange) -> String {
    let symbol = match change.action {
        ChangeAction::Create => "+",
        ChangeAction::Update => "~",
        ChangeAction::Replace if change.delete_before_replace => "-+",
        ChangeAction::Replace => "+-",
        ChangeAction::Delete => "-",
        ChangeAction::Same => " ",
        ChangeAction::Read => "=",
    };
    let kind = catalog::lookup_type_token(&change.type_token)
        .map(|k| k.kind)
        .unwrap_or(change.type_token.as_str());

    let mut line = format!("{symbol:>2} {:<24} {kind:<20} {}", change.name, change.action);
    if !change.changed.is_empty() {
        line.push_str(&format!(" [{}]", change.changed.join(", ")));
    }
    line
}
