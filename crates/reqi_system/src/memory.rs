//! In-memory schema and system adapters.
//!
//! [`MemorySystem`] keeps its records as JSON objects grouped by schema name.
//! Executing a node collects the records (or one property of each record) of
//! every schema matching the node's target and stores them as a JSON array
//! under the node's key.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SystemError;
use crate::node::{Context, Node};
use crate::schema::Schema;
use crate::system::System;

/// A schema backed by a plain list of property names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySchema {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<String>,
}

impl MemorySchema {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl Schema for MemorySchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> &[String] {
        &self.properties
    }
}

/// A system holding its records in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySystem {
    pub name: String,
    #[serde(default)]
    pub schemas: Vec<Arc<MemorySchema>>,
    /// Records keyed by schema name.
    #[serde(default)]
    pub records: IndexMap<String, Vec<Map<String, Value>>>,
}

impl MemorySystem {
    /// Create an empty system.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: Vec::new(),
            records: IndexMap::new(),
        }
    }

    /// Expose an additional schema.
    #[must_use]
    pub fn with_schema(mut self, schema: MemorySchema) -> Self {
        self.schemas.push(Arc::new(schema));
        self
    }

    /// Append a record to the given schema.
    #[must_use]
    pub fn with_record(mut self, schema: impl Into<String>, record: Map<String, Value>) -> Self {
        self.records.entry(schema.into()).or_default().push(record);
        self
    }

    fn find_schema(&self, name: &str) -> Option<&MemorySchema> {
        self.schemas
            .iter()
            .map(Arc::as_ref)
            .find(|schema| schema.name == name)
    }

    fn answer(&self, node: &Node) -> Result<Value, SystemError> {
        let target = &node.target;

        if let Some(system) = target.system.as_deref()
            && system != self.name
        {
            return Err(SystemError::Rejected {
                system: self.name.clone(),
                reason: format!("node '{}' targets system '{system}'", node.key),
            });
        }

        let candidates: Vec<&MemorySchema> = match target.schema.as_deref() {
            Some(name) => {
                let schema = self
                    .find_schema(name)
                    .ok_or_else(|| SystemError::UnknownSchema {
                        system: self.name.clone(),
                        schema: name.to_string(),
                    })?;
                vec![schema]
            }
            None => self.schemas.iter().map(Arc::as_ref).collect(),
        };

        let mut values = Vec::new();
        for schema in candidates {
            if let Some(prop) = target.prop.as_deref()
                && !schema.has_property(prop)
            {
                continue;
            }
            let Some(records) = self.records.get(&schema.name) else {
                continue;
            };
            for record in records {
                let value = match target.prop.as_deref() {
                    Some(prop) => record.get(prop).cloned().unwrap_or(Value::Null),
                    None => Value::Object(record.clone()),
                };
                values.push(value);
            }
        }

        Ok(Value::Array(values))
    }
}

impl System for MemorySystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn schemas(&self) -> Vec<Arc<dyn Schema>> {
        self.schemas
            .iter()
            .map(|schema| Arc::clone(schema) as Arc<dyn Schema>)
            .collect()
    }

    fn execute(&self, nodes: &[Node], _ctx: &Context) -> Result<Context, SystemError> {
        let mut out = Context::new();
        for node in nodes {
            let value = self.answer(node)?;
            debug!(system = self.name, node = node.key, "answered node");
            out.insert(node.key.clone(), value);
        }
        Ok(out)
    }
}
