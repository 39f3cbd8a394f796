//! The untyped property bag handed to the engine.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{Input, Output, Result};

/// One entry in a [`PropertyMap`].
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// A value known at construction time.
    Value(Value),
    /// A value that resolves later.
    Deferred(Output<Value>),
    /// A value only the engine can assign (server ids, urls).
    Computed,
}

impl PropertyValue {
    /// Serialize a known value.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(PropertyValue::Value(serde_json::to_value(value)?))
    }

    /// Serialize an input, eagerly when the value is known and through a
    /// deferred continuation otherwise.
    pub fn from_input<T>(input: Input<T>) -> Result<Self>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        match input {
            Input::Value(v) => Self::from_value(&v),
            Input::Output(o) => Ok(PropertyValue::Deferred(
                o.try_apply(|v| serde_json::to_value(v).map_err(Into::into)),
            )),
        }
    }

    /// The value, if it is known now.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            PropertyValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, PropertyValue::Computed)
    }

    /// Wait for the value. Computed entries resolve to `None`.
    pub async fn resolve(&self) -> Result<Option<Value>> {
        match self {
            PropertyValue::Value(v) => Ok(Some(v.clone())),
            PropertyValue::Deferred(o) => o.resolve().await.map(Some),
            PropertyValue::Computed => Ok(None),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Value(Value::String(s.to_string()))
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        PropertyValue::Value(v)
    }
}

/// String-keyed attribute bag with deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap(BTreeMap<String, PropertyValue>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys whose values only the engine can assign.
    pub fn computed_keys(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, v)| v.is_computed())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Wait for every deferred entry and produce plain JSON.
    /// Computed entries are left out.
    pub async fn resolve(&self) -> Result<Map<String, Value>> {
        let mut resolved = Map::new();
        for (key, value) in &self.0 {
            if let Some(v) = value.resolve().await? {
                resolved.insert(key.clone(), v);
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_mixed_entries() {
        let mut props = PropertyMap::new();
        props.insert("host", PropertyValue::from("example.com"));
        props.insert(
            "port",
            PropertyValue::from_input(Input::Output(Output::ready("22".to_string()))).unwrap(),
        );
        props.insert("action_id", PropertyValue::Computed);

        assert_eq!(props.len(), 3);
        assert_eq!(props.computed_keys(), vec!["action_id".to_string()]);

        let resolved = props.resolve().await.unwrap();
        assert_eq!(resolved.get("host"), Some(&json!("example.com")));
        assert_eq!(resolved.get("port"), Some(&json!("22")));
        assert!(!resolved.contains_key("action_id"));
    }

    #[test]
    fn test_insert_overwrites() {
        let mut props = PropertyMap::new();
        props.insert("type", PropertyValue::from("caller"));
        props.insert("type", PropertyValue::from("SSH_COMMAND"));
        assert_eq!(
            props.get("type").and_then(PropertyValue::as_value),
            Some(&json!("SSH_COMMAND"))
        );
    }

    #[test]
    fn test_from_input_known_value_is_eager() {
        let value = PropertyValue::from_input(Input::Value(vec!["a".to_string()])).unwrap();
        assert_eq!(value.as_value(), Some(&json!(["a"])));
    }
}
