//! Deploy node and access record files.
//!
//! ```kdl
//! node "deploy-cdn" type="deploy" {
//!     provider "tencentcloud-cdn"
//!     provider-access-id "tc-main"
//!     provider-config {
//!         domain "*.example.com"
//!     }
//! }
//!
//! access "tc-main" provider="tencentcloud" {
//!     secretId "${env.TENCENTCLOUD_SECRET_ID}"
//!     secretKey "${env.TENCENTCLOUD_SECRET_KEY}"
//! }
//! ```

use kdl::{KdlDocument, KdlNode, KdlValue};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::path::Path;

use crate::{ConfigError, ConfigResult, VariableContext};
use certdeploy_core::{AccessRecord, NodeType, WorkflowNode};

/// Workflow nodes and access records read from one or more files.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    pub nodes: Vec<WorkflowNode>,
    pub access: Vec<AccessRecord>,
}

impl ConfigDocument {
    /// Pick a node by id. Without an id the document must hold exactly one.
    pub fn node(&self, id: Option<&str>) -> ConfigResult<&WorkflowNode> {
        match id {
            Some(id) => self
                .nodes
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| ConfigError::invalid("node", format!("no node with id '{}'", id))),
            None => match self.nodes.as_slice() {
                [node] => Ok(node),
                [] => Err(ConfigError::MissingField("node".to_string())),
                _ => Err(ConfigError::invalid(
                    "node",
                    "document defines several nodes, pick one by id",
                )),
            },
        }
    }

    /// Append another document, rejecting duplicate ids.
    pub fn extend(&mut self, other: ConfigDocument) -> ConfigResult<()> {
        for node in other.nodes {
            if self.nodes.iter().any(|n| n.id == node.id) {
                return Err(ConfigError::Duplicate(format!("node '{}'", node.id)));
            }
            self.nodes.push(node);
        }
        for record in other.access {
            if self.access.iter().any(|a| a.id == record.id) {
                return Err(ConfigError::Duplicate(format!("access '{}'", record.id)));
            }
            self.access.push(record);
        }
        Ok(())
    }
}

/// Parse a document from KDL text without variable interpolation.
pub fn parse_document(kdl: &str) -> ConfigResult<ConfigDocument> {
    parse_document_with(kdl, &VariableContext::new())
}

/// Parse a document from KDL text, interpolating variables in every value.
pub fn parse_document_with(kdl: &str, vars: &VariableContext) -> ConfigResult<ConfigDocument> {
    let doc: KdlDocument = kdl.parse()?;

    let mut result = ConfigDocument::default();
    let mut node_ids = HashSet::new();
    let mut access_ids = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "node" => {
                let parsed = parse_node(node, vars)?;
                if !node_ids.insert(parsed.id.clone()) {
                    return Err(ConfigError::Duplicate(format!("node '{}'", parsed.id)));
                }
                result.nodes.push(parsed);
            }
            "access" => {
                let parsed = parse_access(node, vars)?;
                if !access_ids.insert(parsed.id.clone()) {
                    return Err(ConfigError::Duplicate(format!("access '{}'", parsed.id)));
                }
                result.access.push(parsed);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(result)
}

/// Read and parse a document from disk.
pub fn load_document(path: &Path, vars: &VariableContext) -> ConfigResult<ConfigDocument> {
    let text = std::fs::read_to_string(path)?;
    parse_document_with(&text, vars)
}

fn parse_node(node: &KdlNode, vars: &VariableContext) -> ConfigResult<WorkflowNode> {
    let id = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("node id".to_string()))?;
    let node_type = match get_string_prop(node, "type") {
        Some(t) => t
            .parse::<NodeType>()
            .map_err(|message| ConfigError::invalid(format!("type of node '{}'", id), message))?,
        None => NodeType::Deploy,
    };

    let mut workflow_node = WorkflowNode::new(id, node_type);
    workflow_node.name = get_string_prop(node, "name").unwrap_or_default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = match child.name().value() {
                "provider" => WorkflowNode::PROVIDER,
                "provider-access-id" | "providerAccessId" => WorkflowNode::PROVIDER_ACCESS_ID,
                "provider-config" | "providerConfig" => WorkflowNode::PROVIDER_CONFIG,
                _ => continue,
            };
            let mut value = node_value(child)?;
            vars.interpolate_value(&mut value)?;
            workflow_node.config.insert(key.to_string(), value);
        }
    }

    Ok(workflow_node)
}

fn parse_access(node: &KdlNode, vars: &VariableContext) -> ConfigResult<AccessRecord> {
    let id = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("access id".to_string()))?;
    let provider = get_string_prop(node, "provider")
        .ok_or_else(|| ConfigError::MissingField(format!("provider of access '{}'", id)))?;

    let mut record = AccessRecord::new(id, provider);
    record.name = get_string_prop(node, "name").unwrap_or_default();

    if let Some(children) = node.children() {
        let mut config = Value::Object(children_to_map(children)?);
        vars.interpolate_value(&mut config)?;
        if let Value::Object(map) = config {
            record.config = map;
        }
    }

    Ok(record)
}

/// Value of a configuration node: its children as a map, its single argument,
/// or all of its arguments as a list.
fn node_value(node: &KdlNode) -> ConfigResult<Value> {
    if let Some(children) = node.children() {
        return Ok(Value::Object(children_to_map(children)?));
    }

    let mut args: Vec<Value> = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| kdl_to_json(e.value()))
        .collect();

    Ok(match args.len() {
        0 => Value::Null,
        1 => args.remove(0),
        _ => Value::Array(args),
    })
}

fn children_to_map(children: &KdlDocument) -> ConfigResult<Map<String, Value>> {
    let mut map = Map::new();
    for child in children.nodes() {
        let key = child.name().value().to_string();
        if map.contains_key(&key) {
            return Err(ConfigError::Duplicate(format!("field '{}'", key)));
        }
        map.insert(key, node_value(child)?);
    }
    Ok(map)
}

fn kdl_to_json(value: &KdlValue) -> Value {
    if let Some(s) = value.as_string() {
        Value::String(s.to_string())
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string()))
    } else if let Some(f) = value.as_float() {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    } else {
        Value::Null
    }
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}
