//! Program file parsing.
//!
//! ```kdl
//! provider base-url="https://app.example.com" workspace="acme"
//! project "web" pipeline=12
//!
//! action "deploy" kind="SSH_COMMAND" {
//!     host "example.com"
//!     port "22"
//!     authentication_mode "PASS"
//!     password "${secrets.DEPLOY_PASSWORD}"
//!     commands "cd /srv" "./deploy.sh"
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use conveyor_actions::KindInfo;
use conveyor_actions::catalog;
use conveyor_core::{Context, CustomResource, ResourceId, ResourceOptions};
use kdl::{KdlDocument, KdlNode, KdlValue};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{ConfigError, ConfigResult, ProviderConfig, VariableContext};

/// A parsed program: provider settings and the declared actions, in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub provider: ProviderConfig,
    pub actions: Vec<ActionDecl>,
}

/// One `action` node.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDecl {
    /// Logical name, unique within the program.
    pub name: String,
    pub kind: String,
    /// Field values after interpolation, keyed by field name.
    pub attributes: Map<String, Value>,
    /// Adopt the existing action with this id instead of creating one.
    pub import_id: Option<String>,
    pub protect: bool,
    /// Earlier actions that must be registered first.
    pub depends_on: Vec<String>,
    pub ignore_changes: Vec<String>,
}

impl ActionDecl {
    /// Resource options for the declaration. Dependencies are resolved by
    /// [`Program::construct`].
    pub fn options(&self) -> ResourceOptions {
        let mut opts = ResourceOptions::new()
            .with_protect(self.protect)
            .with_ignore_changes(self.ignore_changes.iter().cloned());
        if let Some(id) = &self.import_id {
            opts = opts.with_id(ResourceId::new(id.clone()));
        }
        opts
    }
}

impl Program {
    pub fn find(&self, name: &str) -> Option<&ActionDecl> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Construct every declared action against `ctx`, in declaration order.
    pub fn construct(&self, ctx: &Context) -> ConfigResult<Vec<CustomResource>> {
        let mut built: HashMap<&str, CustomResource> = HashMap::new();
        let mut resources = Vec::with_capacity(self.actions.len());

        for decl in &self.actions {
            let info = lookup_kind(&decl.kind)?;
            let mut opts = decl.options();
            for dep in &decl.depends_on {
                let resource = built.get(dep.as_str()).ok_or_else(|| {
                    ConfigError::InvalidReference(format!(
                        "action '{}' depends on unknown action '{}'",
                        decl.name, dep
                    ))
                })?;
                opts = opts.with_depends_on(resource);
            }

            let resource = info
                .construct(ctx, &decl.name, decl.attributes.clone(), opts)
                .map_err(|source| ConfigError::Action {
                    name: decl.name.clone(),
                    source,
                })?;
            debug!(action = %decl.name, kind = %decl.kind, "Constructed action");
            built.insert(&decl.name, resource.clone());
            resources.push(resource);
        }

        Ok(resources)
    }
}

/// Read and parse a program file, then apply provider overrides from the
/// environment.
pub fn load_program(path: &Path, vars: &VariableContext) -> ConfigResult<Program> {
    let text = std::fs::read_to_string(path)?;
    let mut program = parse_program(&text, vars)?;
    program.provider.apply_env()?;
    Ok(program)
}

/// Parse a program from KDL text.
pub fn parse_program(kdl: &str, vars: &VariableContext) -> ConfigResult<Program> {
    let doc: KdlDocument = kdl.parse()?;

    let mut vars = vars.clone();
    let mut provider = ProviderConfig::default();
    let mut project: Option<(String, Option<i64>)> = None;
    let mut actions: Vec<ActionDecl> = Vec::new();
    let mut names = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "provider" => {
                if let Some(url) = get_string_prop(node, "base-url") {
                    provider.set_base_url(&vars.interpolate(&url))?;
                }
                if let Some(workspace) = get_string_prop(node, "workspace") {
                    provider.workspace = vars.interpolate(&workspace);
                }
                vars.workspace = provider.workspace.clone();
            }
            "var" => match get_all_string_args(node).as_slice() {
                [name, value] => {
                    let value = vars.interpolate(value);
                    vars.set(name, value);
                }
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "var".to_string(),
                        message: "expected a name and a value".to_string(),
                    });
                }
            },
            "project" => {
                let name = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("project name".to_string()))?;
                let pipeline = get_int_prop(node, "pipeline")?;
                vars.set_project(name.clone(), pipeline);
                project = Some((name, pipeline));
            }
            "action" => {
                let decl = parse_action(node, project.as_ref(), &vars)?;
                for dep in &decl.depends_on {
                    if !names.contains(dep) {
                        return Err(ConfigError::InvalidReference(format!(
                            "action '{}' depends on '{}', which is not declared before it",
                            decl.name, dep
                        )));
                    }
                }
                if !names.insert(decl.name.clone()) {
                    return Err(ConfigError::Duplicate(format!("action '{}'", decl.name)));
                }
                actions.push(decl);
            }
            other => debug!(node = other, "Ignoring unknown node"),
        }
    }

    Ok(Program { provider, actions })
}

fn lookup_kind(kind: &str) -> ConfigResult<&'static KindInfo> {
    catalog::lookup(kind).ok_or_else(|| ConfigError::UnknownKind(kind.to_string()))
}

fn parse_action(
    node: &KdlNode,
    project: Option<&(String, Option<i64>)>,
    vars: &VariableContext,
) -> ConfigResult<ActionDecl> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("action name".to_string()))?;
    let kind = get_string_prop(node, "kind")
        .ok_or_else(|| ConfigError::MissingField(format!("kind for action '{name}'")))?;
    let info = lookup_kind(&kind)?;

    let mut attributes = Map::new();
    if let Some((project_name, pipeline_id)) = project {
        attributes.insert("project_name".to_string(), Value::from(project_name.as_str()));
        if let Some(id) = pipeline_id {
            attributes.insert("pipeline_id".to_string(), Value::from(*id));
        }
    }
    attributes.insert("name".to_string(), Value::from(name.as_str()));

    let import_id = match node.get("id") {
        Some(KdlValue::String(s)) => Some(vars.interpolate(s)),
        Some(KdlValue::Integer(i)) => Some(i.to_string()),
        Some(_) => {
            return Err(ConfigError::InvalidValue {
                field: format!("{name}.id"),
                message: "expected a string or an integer".to_string(),
            });
        }
        None => None,
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let field = field_name(child.name().value());
            match field.as_str() {
                "integration" => {
                    let value = match get_first_string_arg(child) {
                        Some(hash_id) => {
                            let mut reference = Map::new();
                            reference.insert("hash_id".to_string(), Value::from(vars.interpolate(&hash_id)));
                            Value::Object(reference)
                        }
                        None => Value::Object(node_object(child, vars)?),
                    };
                    attributes.insert(field, value);
                }
                "variable" => push(&mut attributes, "variables", Value::Object(node_object(child, vars)?)),
                "trigger_condition" => push(
                    &mut attributes,
                    "trigger_conditions",
                    Value::Object(node_object(child, vars)?),
                ),
                "permissions" => {
                    attributes.insert(field, Value::Object(node_object(child, vars)?));
                }
                _ => {
                    let value = field_value(info, &name, &field, child, vars)?;
                    attributes.insert(field, value);
                }
            }
        }
    }

    debug!(action = %name, kind = %kind, fields = attributes.len(), "Parsed action");

    Ok(ActionDecl {
        import_id,
        protect: get_bool_prop(node, "protect").unwrap_or(false),
        depends_on: get_string_list_prop(node, "depends-on"),
        ignore_changes: get_string_list_prop(node, "ignore-changes")
            .into_iter()
            .map(|f| field_name(&f))
            .collect(),
        name,
        kind,
        attributes,
    })
}

/// A field node: one argument is a scalar, several are a list, `-` children
/// are a list. List fields always get a list.
fn field_value(
    info: &KindInfo,
    action: &str,
    field: &str,
    node: &KdlNode,
    vars: &VariableContext,
) -> ConfigResult<Value> {
    let path = format!("{action}.{field}");
    let dash_items = node
        .children()
        .map(|c| c.nodes().iter().filter(|n| n.name().value() == "-").collect::<Vec<_>>())
        .unwrap_or_default();

    let values = if dash_items.is_empty() {
        positional_values(node, &path, vars)?
    } else {
        let mut values = Vec::with_capacity(dash_items.len());
        for item in dash_items {
            values.extend(positional_values(item, &path, vars)?);
        }
        values
    };

    if info.is_list_field(field) {
        return Ok(Value::Array(values));
    }
    let mut values = values.into_iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(value),
        (None, _) => Err(ConfigError::InvalidValue {
            field: path,
            message: "expected a value".to_string(),
        }),
        (Some(_), Some(_)) => Err(ConfigError::InvalidValue {
            field: path,
            message: "expected a single value".to_string(),
        }),
    }
}

/// An object node: properties become fields, children with properties
/// become arrays of objects and children with arguments become arrays.
fn node_object(node: &KdlNode, vars: &VariableContext) -> ConfigResult<Map<String, Value>> {
    let mut object = Map::new();
    for entry in node.entries() {
        if let Some(key) = entry.name() {
            let key = field_name(key.value());
            let value = to_json(entry.value(), &key, vars)?;
            object.insert(key, value);
        }
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = field_name(child.name().value());
            if child.entries().iter().any(|e| e.name().is_some()) {
                push(&mut object, &key, Value::Object(node_object(child, vars)?));
            } else {
                let values = positional_values(child, &key, vars)?;
                object.insert(key, Value::Array(values));
            }
        }
    }
    Ok(object)
}

fn push(object: &mut Map<String, Value>, key: &str, value: Value) {
    match object.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        _ => {
            object.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}

fn positional_values(
    node: &KdlNode,
    field: &str,
    vars: &VariableContext,
) -> ConfigResult<Vec<Value>> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| to_json(e.value(), field, vars))
        .collect()
}

/// Convert one KDL value; `field` names it in errors.
fn to_json(value: &KdlValue, field: &str, vars: &VariableContext) -> ConfigResult<Value> {
    Ok(match value {
        KdlValue::String(s) => Value::String(vars.interpolate(s)),
        KdlValue::Integer(i) => {
            let n = i64::try_from(*i).map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("integer {i} out of range"),
            })?;
            Value::from(n)
        }
        KdlValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("{f} is not a finite number"),
            })?,
        KdlValue::Bool(b) => Value::Bool(*b),
        KdlValue::Null => Value::Null,
    })
}

fn field_name(raw: &str) -> String {
    raw.replace('-', "_")
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_bool_prop(node: &KdlNode, name: &str) -> Option<bool> {
    node.get(name).and_then(|v| v.as_bool())
}

fn get_int_prop(node: &KdlNode, name: &str) -> ConfigResult<Option<i64>> {
    match node.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .and_then(|i| i64::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: name.to_string(),
                message: "expected an integer".to_string(),
            }),
    }
}

/// Repeated properties (`depends-on="a" depends-on="b"`) or a child node with
/// the same name and several arguments.
fn get_string_list_prop(node: &KdlNode, name: &str) -> Vec<String> {
    let mut result = Vec::new();

    for entry in node.entries() {
        if let Some(entry_name) = entry.name() {
            if entry_name.value() == name {
                if let Some(s) = entry.value().as_string() {
                    result.push(s.to_string());
                }
            }
        }
    }

    if !result.is_empty() {
        return result;
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == name {
                return get_all_string_args(child);
            }
        }
    }

    Vec::new()
}
