//! Variable interpolation for program files.
//!
//! Supports variables like:
//! - `${project.name}` - Project of the enclosing `project` block
//! - `${pipeline.id}` - Pipeline id of the enclosing `project` block
//! - `${provider.workspace}` - Workspace the provider targets
//! - `${env.VAR_NAME}` - Environment variable
//! - `${secrets.SECRET_NAME}` - Secret value, read from `CONVEYOR_SECRET_<NAME>`
//! - `${timestamp}` - Unix timestamp
//! - `${date}` - ISO date (YYYY-MM-DD)
//! - `${datetime}` - ISO datetime
//! - `${name}` - Custom variable declared with `var`

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Prefix of environment variables that carry secrets.
pub const SECRET_ENV_PREFIX: &str = "CONVEYOR_SECRET_";

const MASK: &str = "********";

/// Variables available for interpolation.
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    pub project: ProjectContext,
    pub workspace: String,
    /// Environment variables
    pub env: HashMap<String, String>,
    /// Secrets (masked in output)
    pub secrets: HashMap<String, String>,
    /// Custom variables declared in the program
    pub custom: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    pub name: String,
    pub pipeline_id: Option<i64>,
}

static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}")
        .expect("variable pattern is valid")
});

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context populated from the current process environment.
    pub fn from_env() -> Self {
        let mut ctx = Self::new();
        ctx.populate_from(std::env::vars());
        ctx
    }

    /// Record every pair as an environment variable; pairs named
    /// `CONVEYOR_SECRET_<NAME>` also become secret `<NAME>`.
    pub fn populate_from<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(SECRET_ENV_PREFIX) {
                if !name.is_empty() {
                    self.secrets.insert(name.to_string(), value.clone());
                }
            }
            self.env.insert(key, value);
        }
    }

    /// Add a custom variable.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.custom.insert(name.to_string(), value.into());
    }

    pub fn set_project(&mut self, name: impl Into<String>, pipeline_id: Option<i64>) {
        self.project = ProjectContext {
            name: name.into(),
            pipeline_id,
        };
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, var_name: &str) -> Option<String> {
        let parts: Vec<&str> = var_name.split('.').collect();

        match parts.as_slice() {
            ["project", "name"] if !self.project.name.is_empty() => Some(self.project.name.clone()),
            ["pipeline", "id"] => self.project.pipeline_id.map(|id| id.to_string()),
            ["provider", "workspace"] if !self.workspace.is_empty() => Some(self.workspace.clone()),

            ["env", name] => self.env.get(*name).cloned(),
            ["secrets", name] => self.secrets.get(*name).cloned(),

            ["timestamp"] => Some(chrono::Utc::now().timestamp().to_string()),
            ["date"] => Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            ["datetime"] => Some(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),

            [name] => self.custom.get(*name).cloned(),

            _ => None,
        }
    }

    /// Interpolate all variables in a string. Unknown variables are left
    /// as written.
    pub fn interpolate(&self, input: &str) -> String {
        VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                let var_name = &caps[1];
                self.resolve(var_name)
                    .unwrap_or_else(|| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Names of the secrets referenced in a string, e.g. `secrets.API_KEY`.
    pub fn find_secrets(&self, input: &str) -> Vec<String> {
        VAR_REGEX
            .captures_iter(input)
            .map(|caps| caps[1].to_string())
            .filter(|name| name.starts_with("secrets."))
            .collect()
    }

    /// Replace every known secret value in `text`.
    pub fn mask(&self, text: &str) -> String {
        let mut secrets: Vec<&str> = self
            .secrets
            .values()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .collect();
        // Longest first so a secret containing another is masked whole.
        secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
        secrets
            .into_iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret, MASK))
    }
}

/// Builder for creating VariableContext.
#[derive(Default)]
pub struct VariableContextBuilder {
    ctx: VariableContext,
}

impl VariableContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, name: impl Into<String>, pipeline_id: i64) -> Self {
        self.ctx.set_project(name, Some(pipeline_id));
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.ctx.workspace = workspace.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.env.insert(key.into(), value.into());
        self
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.secrets.insert(key.into(), value.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.custom.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> VariableContext {
        self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_variables() {
        let ctx = VariableContextBuilder::new()
            .with_env("DEPLOY_USER", "deploy")
            .with_env("REGION", "eu-west-1")
            .build();

        let result = ctx.interpolate("${env.DEPLOY_USER}@${env.REGION}");
        assert_eq!(result, "deploy@eu-west-1");
    }

    #[test]
    fn test_secrets() {
        let ctx = VariableContextBuilder::new()
            .with_secret("DEPLOY_PASSWORD", "hunter2")
            .build();

        assert_eq!(ctx.interpolate("pw=${secrets.DEPLOY_PASSWORD}"), "pw=hunter2");
    }

    #[test]
    fn test_populate_from_splits_secrets() {
        let mut ctx = VariableContext::new();
        ctx.populate_from([
            ("HOME".to_string(), "/root".to_string()),
            ("CONVEYOR_SECRET_API_KEY".to_string(), "k3y".to_string()),
            ("CONVEYOR_SECRET_".to_string(), "ignored".to_string()),
        ]);
        assert_eq!(ctx.secrets.len(), 1);
        assert_eq!(ctx.resolve("secrets.API_KEY").as_deref(), Some("k3y"));
        assert_eq!(ctx.resolve("env.HOME").as_deref(), Some("/root"));
    }

    #[test]
    fn test_unknown_variable_preserved() {
        let ctx = VariableContext::new();
        assert_eq!(
            ctx.interpolate("${unknown.var} ${project.name} ${pipeline.id}"),
            "${unknown.var} ${project.name} ${pipeline.id}"
        );
    }

    #[test]
    fn test_project_variables() {
        let ctx = VariableContextBuilder::new()
            .with_project("web", 12)
            .with_workspace("acme")
            .build();

        let result = ctx.interpolate("${provider.workspace}/${project.name}#${pipeline.id}");
        assert_eq!(result, "acme/web#12");
    }

    #[test]
    fn test_custom_variables() {
        let mut ctx = VariableContext::new();
        ctx.set("version", "1.2.3");
        assert_eq!(ctx.interpolate("app v${version}"), "app v1.2.3");
    }

    #[test]
    fn test_date_variable() {
        let ctx = VariableContext::new();
        let result = ctx.interpolate("${date}");
        assert_eq!(result.len(), 10);
        assert!(result.contains('-'));
    }

    #[test]
    fn test_find_secrets() {
        let ctx = VariableContext::new();
        let secrets = ctx.find_secrets("${secrets.API_KEY} and ${secrets.DB_PASSWORD} with ${env.HOME}");
        assert_eq!(secrets, vec!["secrets.API_KEY", "secrets.DB_PASSWORD"]);
    }

    #[test]
    fn test_mask() {
        let ctx = VariableContextBuilder::new()
            .with_secret("A", "abc")
            .with_secret("B", "abcdef")
            .with_secret("EMPTY", "")
            .build();
        assert_eq!(ctx.mask("x abcdef y abc"), "x ******** y ********");
    }

    #[test]
    fn test_nested_braces() {
        let ctx = VariableContextBuilder::new().with_custom("sha", "abc123").build();
        let result = ctx.interpolate(r#"{"sha": "${sha}"}"#);
        assert_eq!(result, r#"{"sha": "abc123"}"#);
    }
}
