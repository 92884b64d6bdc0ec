//! Index builder — reverse lookups over the registered systems.
//!
//! The dispatcher scans every system and every schema once and derives four
//! tables:
//!
//! | Table              | Key           | Value                                  |
//! |--------------------|---------------|----------------------------------------|
//! | `system_schemas`   | system name   | schema names, in declaration order     |
//! | `schema_systems`   | schema name   | system names exposing it               |
//! | `schemas_by_name`  | schema name   | the schema object (last declared wins) |
//! | `property_schemas` | property name | schema names declaring it              |
//!
//! Lists keep repeats: a schema listed twice by a system is recorded twice.
//! A snapshot is built in full and never patched; the dispatcher swaps in a
//! new one on reload.

use std::sync::Arc;

use indexmap::IndexMap;
use reqi_system::{Schema, System};
use tracing::info;

use crate::error::DispatchError;

/// An immutable set of the four reverse-lookup tables.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    system_schemas: IndexMap<String, Vec<String>>,
    schema_systems: IndexMap<String, Vec<String>>,
    schemas_by_name: IndexMap<String, Arc<dyn Schema>>,
    property_schemas: IndexMap<String, Vec<String>>,
}

impl IndexSnapshot {
    /// Scan `systems` in registry order and build a fresh snapshot.
    ///
    /// Systems without schemas are still indexed, with an empty schema list.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRegistry`] if a system is registered
    /// under a name other than its own, or if a schema or property name is
    /// empty. Nothing is returned on failure, so callers never see a partial
    /// index.
    pub fn build(systems: &IndexMap<String, Arc<dyn System>>) -> Result<Self, DispatchError> {
        let mut index = Self::default();

        for (key, system) in systems {
            if system.name() != key {
                return Err(DispatchError::MalformedRegistry(format!(
                    "system '{}' registered under key '{key}'",
                    system.name()
                )));
            }

            let declared = index.system_schemas.entry(key.clone()).or_default();
            let schemas = system.schemas();

            for schema in schemas {
                let schema_name = schema.name();
                if schema_name.is_empty() {
                    return Err(DispatchError::MalformedRegistry(format!(
                        "system '{key}' exposes a schema with an empty name"
                    )));
                }
                if schema.properties().iter().any(String::is_empty) {
                    return Err(DispatchError::MalformedRegistry(format!(
                        "schema '{schema_name}' declares an empty property name"
                    )));
                }

                declared.push(schema_name.to_string());
                index
                    .schema_systems
                    .entry(schema_name.to_string())
                    .or_default()
                    .push(key.clone());
                for prop in schema.properties() {
                    index
                        .property_schemas
                        .entry(prop.clone())
                        .or_default()
                        .push(schema_name.to_string());
                }
                index
                    .schemas_by_name
                    .insert(schema_name.to_string(), Arc::clone(&schema));
            }
        }

        info!(
            systems = index.system_schemas.len(),
            schemas = index.schemas_by_name.len(),
            properties = index.property_schemas.len(),
            "built dispatch index"
        );

        Ok(index)
    }

    /// Schema names exposed by `system`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownSystem`] if `system` is not indexed.
    pub fn schemas_of(&self, system: &str) -> Result<&[String], DispatchError> {
        self.system_schemas
            .get(system)
            .map(Vec::as_slice)
            .ok_or_else(|| DispatchError::UnknownSystem(system.to_string()))
    }

    /// System names exposing `schema`, in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownSchema`] if `schema` is not indexed.
    pub fn systems_of(&self, schema: &str) -> Result<&[String], DispatchError> {
        self.schema_systems
            .get(schema)
            .map(Vec::as_slice)
            .ok_or_else(|| DispatchError::UnknownSchema(schema.to_string()))
    }

    /// Schema names declaring `prop`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownProperty`] if no schema declares `prop`.
    pub fn schemas_with(&self, prop: &str) -> Result<&[String], DispatchError> {
        self.property_schemas
            .get(prop)
            .map(Vec::as_slice)
            .ok_or_else(|| DispatchError::UnknownProperty(prop.to_string()))
    }

    /// The schema object registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownSchema`] if `name` is not indexed.
    pub fn schema(&self, name: &str) -> Result<&Arc<dyn Schema>, DispatchError> {
        self.schemas_by_name
            .get(name)
            .ok_or_else(|| DispatchError::UnknownSchema(name.to_string()))
    }

    /// All indexed system names, in registry order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.system_schemas.keys().map(String::as_str)
    }

    /// All indexed schema names, in first-seen order.
    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas_by_name.keys().map(String::as_str)
    }

    /// All indexed property names, in first-seen order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.property_schemas.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_system(&self, name: &str) -> bool {
        self.system_schemas.contains_key(name)
    }

    #[must_use]
    pub fn has_schema(&self, name: &str) -> bool {
        self.schema_systems.contains_key(name)
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.property_schemas.contains_key(name)
    }

    /// Describe the snapshot as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "systems": self.system_schemas,
            "schemas": self.schema_systems,
            "properties": self.property_schemas,
        })
    }
}
