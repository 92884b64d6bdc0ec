//! Execution nodes and the execution context.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key/value mapping threaded through node execution.
pub type Context = serde_json::Map<String, Value>;

/// Routing hints attached to a node. Any subset may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// System name filter.
    #[serde(default)]
    pub system: Option<String>,
    /// Schema name filter.
    #[serde(default)]
    pub schema: Option<String>,
    /// Property name filter.
    #[serde(default)]
    pub prop: Option<String>,
}

impl Target {
    /// A target with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn system(mut self, name: impl Into<String>) -> Self {
        self.system = Some(name.into());
        self
    }

    #[must_use]
    pub fn schema(mut self, name: impl Into<String>) -> Self {
        self.schema = Some(name.into());
        self
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>) -> Self {
        self.prop = Some(name.into());
        self
    }
}

/// An opaque unit of execution handed to a system.
///
/// The dispatcher only reads [`Node::target`] to decide where the node goes.
/// `key` names the entry the node's result is stored under and `payload` is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub payload: Value,
}

impl Node {
    /// Create a node with a null payload.
    #[must_use]
    pub fn new(key: impl Into<String>, target: Target) -> Self {
        Self {
            key: key.into(),
            target,
            payload: Value::Null,
        }
    }

    /// Attach a payload to this node.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
