//! Provider settings: where the control plane lives.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, ConfigResult};

pub const BASE_URL_ENV: &str = "CONVEYOR_BASE_URL";
pub const WORKSPACE_ENV: &str = "CONVEYOR_WORKSPACE";

const DEFAULT_BASE_URL: &str = "https://app.conveyor.local";
const DEFAULT_WORKSPACE: &str = "local";

/// Control-plane location. `base_url` is validated whenever it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    base_url: String,
    pub workspace: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace: DEFAULT_WORKSPACE.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn base_url(&self) -> ConfigResult<Url> {
        parse_base_url(&self.base_url)
    }

    pub fn set_base_url(&mut self, raw: &str) -> ConfigResult<()> {
        parse_base_url(raw)?;
        self.base_url = raw.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Apply `CONVEYOR_BASE_URL` and `CONVEYOR_WORKSPACE` from the process
    /// environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable source. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.set_base_url(&raw)?;
        }
        if let Some(workspace) = lookup(WORKSPACE_ENV).filter(|v| !v.is_empty()) {
            self.workspace = workspace;
        }
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: "base-url".to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: "base-url".to_string(),
            message: format!("unsupported scheme: {}", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_provider() {
        let provider = ProviderConfig::default();
        assert_eq!(
            provider.base_url().unwrap().as_str(),
            "https://app.conveyor.local/"
        );
        assert_eq!(provider.workspace, "local");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (BASE_URL_ENV, "https://ci.example.com"),
            (WORKSPACE_ENV, "acme"),
        ]);
        let mut provider = ProviderConfig::default();
        provider
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(
            provider.base_url().unwrap().host_str(),
            Some("ci.example.com")
        );
        assert_eq!(provider.workspace, "acme");
    }

    #[test]
    fn test_empty_override_ignored() {
        let mut provider = ProviderConfig::default();
        provider.apply_overrides(|_| Some(String::new())).unwrap();
        assert_eq!(provider, ProviderConfig::default());
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut provider = ProviderConfig::default();
        assert!(matches!(
            provider.set_base_url("not a url"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(provider.set_base_url("ftp://example.com").is_err());
        assert_eq!(provider, ProviderConfig::default());
    }
}
