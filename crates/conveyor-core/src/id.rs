//! Resource identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identifier the remote control plane assigns to a resource.
///
/// Pipeline actions use numeric identifiers, but the engine treats every id
/// as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the id as a numeric identifier.
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Unique name the engine tracks a resource under.
///
/// Rendered as `urn:conveyor:<stack>::<project>::<type token>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("urn:conveyor:{stack}::{project}::{type_token}::{name}")]
pub struct Urn {
    pub stack: String,
    pub project: String,
    pub type_token: String,
    pub name: String,
}

impl Urn {
    pub fn new(
        stack: impl Into<String>,
        project: impl Into<String>,
        type_token: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            stack: stack.into(),
            project: project.into(),
            type_token: type_token.into(),
            name: name.into(),
        }
    }
}

impl std::str::FromStr for Urn {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("urn:conveyor:")
            .ok_or_else(|| crate::Error::InvalidInput(format!("not a urn: {s}")))?;
        let parts: Vec<&str> = rest.splitn(4, "::").collect();
        match parts.as_slice() {
            [stack, project, type_token, name] => Ok(Self::new(*stack, *project, *type_token, *name)),
            _ => Err(crate::Error::InvalidInput(format!("malformed urn: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urn_display_and_parse() {
        let urn = Urn::new("dev", "web", "conveyor:pipeline/sshCommand:SshCommand", "deploy");
        let rendered = urn.to_string();
        assert_eq!(
            rendered,
            "urn:conveyor:dev::web::conveyor:pipeline/sshCommand:SshCommand::deploy"
        );
        let parsed: Urn = rendered.parse().unwrap();
        assert_eq!(parsed, urn);
    }

    #[test]
    fn test_urn_rejects_foreign_prefix() {
        assert!("urn:other:dev::web::t::n".parse::<Urn>().is_err());
        assert!("urn:conveyor:dev::web".parse::<Urn>().is_err());
    }

    #[test]
    fn test_resource_id_numeric() {
        assert_eq!(ResourceId::from(42).as_number(), Some(42));
        assert_eq!(ResourceId::from("abc").as_number(), None);
    }
}
