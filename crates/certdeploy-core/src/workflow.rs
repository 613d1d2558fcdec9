//! Workflow node as handed over by the workflow engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a workflow node. Only deploy nodes reach this crate's deployers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    Apply,
    Upload,
    Monitor,
    Deploy,
    Notify,
    End,
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "apply" => Ok(Self::Apply),
            "upload" => Ok(Self::Upload),
            "monitor" => Ok(Self::Monitor),
            "deploy" => Ok(Self::Deploy),
            "notify" => Ok(Self::Notify),
            "end" => Ok(Self::End),
            other => Err(format!("unknown node type '{}'", other)),
        }
    }
}

/// A node of a workflow graph with its persisted configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl WorkflowNode {
    pub const PROVIDER: &'static str = "provider";
    pub const PROVIDER_ACCESS_ID: &'static str = "providerAccessId";
    pub const PROVIDER_CONFIG: &'static str = "providerConfig";

    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            node_type,
            config: Map::new(),
        }
    }

    /// Build a deploy node from its three inbound fields.
    pub fn deploy(
        id: impl Into<String>,
        provider: &str,
        access_id: &str,
        provider_config: Map<String, Value>,
    ) -> Self {
        let mut node = Self::new(id, NodeType::Deploy);
        node.config
            .insert(Self::PROVIDER.to_string(), Value::from(provider));
        node.config
            .insert(Self::PROVIDER_ACCESS_ID.to_string(), Value::from(access_id));
        node.config.insert(
            Self::PROVIDER_CONFIG.to_string(),
            Value::Object(provider_config),
        );
        node
    }

    /// String config value; empty when absent or not a string.
    pub fn config_string(&self, key: &str) -> &str {
        self.config.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    /// Map config value; empty when absent or not an object.
    pub fn config_map(&self, key: &str) -> Map<String, Value> {
        self.config
            .get(key)
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default()
    }

    pub fn provider(&self) -> &str {
        self.config_string(Self::PROVIDER)
    }

    pub fn provider_access_id(&self) -> &str {
        self.config_string(Self::PROVIDER_ACCESS_ID)
    }

    pub fn provider_config(&self) -> Map<String, Value> {
        self.config_map(Self::PROVIDER_CONFIG)
    }
}
