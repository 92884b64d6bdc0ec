//! Resolver — turns a partially specified request into concrete systems and
//! schemas.
//!
//! A [`ResolveQuery`] carries up to three filters (`system`, `schema`,
//! `prop`) and two optional default sets. When the defaults are omitted they
//! are derived from the index:
//!
//! - neither given: every system, then every schema those systems expose;
//! - only schemas given: every system exposing one of them;
//! - only systems given: every schema one of them exposes.
//!
//! The filters are then applied in priority order:
//!
//! ```text
//! prop  schema  system   systems                        schemas
//! ----  ------  ------   -----------------------------  ---------------------------------
//!  -      -       -      defaults                       defaults
//!  -      -       S      [S]                            schemas of S ∩ defaults
//!  *      X       -      systems of X ∩ defaults        [X]
//!  *      X       S      [S]                            [X]
//!  P      -       -      systems of those schemas       schemas with P ∩ defaults
//!                        ∩ defaults
//!  P      -       S      [S]                            schemas with P ∩ schemas of S
//!                                                       ∩ defaults
//! ```
//!
//! When `system` and `schema` are both fixed no cross-check is made that the
//! system exposes the schema. Both result lists are finally collapsed with
//! [`UniqueSeq::keep_last`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DispatchError;
use crate::index::IndexSnapshot;
use crate::unique::UniqueSeq;

/// Filters and defaults for a resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub prop: Option<String>,
    /// Systems the answer is scoped to when `system` is absent.
    #[serde(default)]
    pub default_systems: Option<Vec<String>>,
    /// Schemas the answer is scoped to when `schema` is absent.
    #[serde(default)]
    pub default_schemas: Option<Vec<String>>,
}

impl ResolveQuery {
    /// A query with no filters and no defaults.
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

    #[must_use]
    pub fn default_systems<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_systems = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn default_schemas<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_schemas = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl From<&reqi_system::Target> for ResolveQuery {
    fn from(target: &reqi_system::Target) -> Self {
        Self {
            system: target.system.clone(),
            schema: target.schema.clone(),
            prop: target.prop.clone(),
            default_systems: None,
            default_schemas: None,
        }
    }
}

/// The systems and schemas a query concerns, each without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub systems: Vec<String>,
    pub schemas: Vec<String>,
}

impl IndexSnapshot {
    /// Resolve `query` against this snapshot.
    ///
    /// # Errors
    ///
    /// Returns an unknown-key error ([`DispatchError::UnknownSystem`],
    /// [`DispatchError::UnknownSchema`] or [`DispatchError::UnknownProperty`])
    /// if a filter or a default entry names something not in the index. Every
    /// name is checked before any work is done.
    pub fn resolve(&self, query: &ResolveQuery) -> Result<Resolution, DispatchError> {
        self.check_names(query)?;

        let (default_systems, default_schemas) = self.defaults(query)?;
        let in_systems: HashSet<&str> = default_systems.iter().map(String::as_str).collect();
        let in_schemas: HashSet<&str> = default_schemas.iter().map(String::as_str).collect();

        let system = query.system.as_deref();
        let schema = query.schema.as_deref();
        let prop = query.prop.as_deref();

        let (systems, schemas): (Vec<String>, Vec<String>) = match (prop, schema, system) {
            (None, None, None) => (default_systems.clone(), default_schemas.clone()),
            (None, None, Some(system)) => {
                let schemas: Vec<String> = self
                    .schemas_of(system)?
                    .iter()
                    .filter(|s| in_schemas.contains(s.as_str()))
                    .cloned()
                    .collect();
                (vec![system.to_string()], schemas)
            }
            (_, Some(schema), None) => {
                let systems: Vec<String> = self
                    .systems_of(schema)?
                    .iter()
                    .filter(|s| in_systems.contains(s.as_str()))
                    .cloned()
                    .collect();
                (systems, vec![schema.to_string()])
            }
            (_, Some(schema), Some(system)) => (vec![system.to_string()], vec![schema.to_string()]),
            (Some(prop), None, None) => {
                let schemas: Vec<String> = self
                    .schemas_with(prop)?
                    .iter()
                    .filter(|s| in_schemas.contains(s.as_str()))
                    .cloned()
                    .collect();
                let mut systems = Vec::new();
                for schema in &schemas {
                    systems.extend(
                        self.systems_of(schema)?
                            .iter()
                            .filter(|s| in_systems.contains(s.as_str()))
                            .cloned(),
                    );
                }
                (systems, schemas)
            }
            (Some(prop), None, Some(system)) => {
                let owned: HashSet<&str> =
                    self.schemas_of(system)?.iter().map(String::as_str).collect();
                let schemas: Vec<String> = self
                    .schemas_with(prop)?
                    .iter()
                    .filter(|s| owned.contains(s.as_str()) && in_schemas.contains(s.as_str()))
                    .cloned()
                    .collect();
                (vec![system.to_string()], schemas)
            }
        };

        let resolution = Resolution {
            systems: UniqueSeq::keep_last(systems).into_vec(),
            schemas: UniqueSeq::keep_last(schemas).into_vec(),
        };

        debug!(
            system,
            schema,
            prop,
            systems = ?resolution.systems,
            schemas = ?resolution.schemas,
            "resolved query"
        );

        Ok(resolution)
    }

    fn check_names(&self, query: &ResolveQuery) -> Result<(), DispatchError> {
        if let Some(system) = query.system.as_deref() {
            self.schemas_of(system)?;
        }
        if let Some(schema) = query.schema.as_deref() {
            self.systems_of(schema)?;
        }
        if let Some(prop) = query.prop.as_deref() {
            self.schemas_with(prop)?;
        }
        for system in query.default_systems.iter().flatten() {
            self.schemas_of(system)?;
        }
        for schema in query.default_schemas.iter().flatten() {
            self.systems_of(schema)?;
        }
        Ok(())
    }

    /// Fill in whichever default sets the query leaves out.
    fn defaults(&self, query: &ResolveQuery) -> Result<(Vec<String>, Vec<String>), DispatchError> {
        let systems = match (&query.default_systems, &query.default_schemas) {
            (Some(systems), _) => systems.clone(),
            (None, None) => self.system_names().map(str::to_string).collect(),
            (None, Some(schemas)) => {
                let mut systems = Vec::new();
                for schema in schemas {
                    systems.extend(self.systems_of(schema)?.iter().cloned());
                }
                systems
            }
        };

        let schemas = match &query.default_schemas {
            Some(schemas) => schemas.clone(),
            None => {
                let mut schemas = Vec::new();
                for system in &systems {
                    schemas.extend(self.schemas_of(system)?.iter().cloned());
                }
                schemas
            }
        };

        Ok((systems, schemas))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;
    use reqi_system::{MemorySchema, MemorySystem, System};

    use super::*;

    fn build(systems: Vec<MemorySystem>) -> IndexSnapshot {
        let registry: IndexMap<String, Arc<dyn System>> = systems
            .into_iter()
            .map(|s| (s.name.clone(), Arc::new(s) as Arc<dyn System>))
            .collect();
        IndexSnapshot::build(&registry).unwrap()
    }

    /// `{A: [x], B: [y]}`
    fn two_systems() -> IndexSnapshot {
        build(vec![
            MemorySystem::new("A").with_schema(MemorySchema::new("x", ["id"])),
            MemorySystem::new("B").with_schema(MemorySchema::new("y", ["id"])),
        ])
    }

    /// A: [person, city], B: [city, order], C: [order]
    fn shop() -> IndexSnapshot {
        build(vec![
            MemorySystem::new("A")
                .with_schema(MemorySchema::new("person", ["name", "age"]))
                .with_schema(MemorySchema::new("city", ["name", "zip"])),
            MemorySystem::new("B")
                .with_schema(MemorySchema::new("city", ["name", "zip"]))
                .with_schema(MemorySchema::new("order", ["total", "zip"])),
            MemorySystem::new("C").with_schema(MemorySchema::new("order", ["total", "zip"])),
        ])
    }

    fn resolve(index: &IndexSnapshot, query: ResolveQuery) -> (Vec<String>, Vec<String>) {
        let resolution = index.resolve(&query).unwrap();
        (resolution.systems, resolution.schemas)
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let (systems, schemas) = resolve(&two_systems(), ResolveQuery::new());
        assert_eq!(systems, ["A", "B"]);
        assert_eq!(schemas, ["x", "y"]);
    }

    #[test]
    fn test_system_only() {
        let (systems, schemas) = resolve(&two_systems(), ResolveQuery::new().system("A"));
        assert_eq!(systems, ["A"]);
        assert_eq!(schemas, ["x"]);
    }

    #[test]
    fn test_schema_only_intersects_default_systems() {
        let index = shop();
        let (systems, schemas) = resolve(&index, ResolveQuery::new().schema("city"));
        assert_eq!(systems, ["A", "B"]);
        assert_eq!(schemas, ["city"]);

        let (systems, _) = resolve(
            &index,
            ResolveQuery::new().schema("city").default_systems(["B", "C"]),
        );
        assert_eq!(systems, ["B"]);
    }

    #[test]
    fn test_system_and_schema_not_cross_checked() {
        let (systems, schemas) =
            resolve(&shop(), ResolveQuery::new().system("C").schema("person"));
        assert_eq!(systems, ["C"]);
        assert_eq!(schemas, ["person"]);
    }

    #[test]
    fn test_prop_only() {
        let (systems, schemas) = resolve(&shop(), ResolveQuery::new().prop("zip"));
        // city -> [A, B], order -> [B, C]; B keeps its last position.
        assert_eq!(schemas, ["city", "order"]);
        assert_eq!(systems, ["A", "B", "C"]);
    }

    #[test]
    fn test_prop_repeated_schemas_keep_last() {
        // Default schemas derive to [order, person, city]; "zip" is indexed
        // under city twice and order twice.
        let (systems, schemas) = resolve(
            &shop(),
            ResolveQuery::new().prop("zip").default_systems(["C", "A"]),
        );
        assert_eq!(schemas, ["city", "order"]);
        assert_eq!(systems, ["A", "C"]);
    }

    #[test]
    fn test_prop_and_system_keeps_system_fixed() {
        let index = shop();
        let (systems, schemas) = resolve(&index, ResolveQuery::new().system("B").prop("zip"));
        assert_eq!(systems, ["B"]);
        assert_eq!(schemas, ["city", "order"]);

        // The system stays in the answer even when none of its schemas match.
        let (systems, schemas) = resolve(&index, ResolveQuery::new().system("C").prop("age"));
        assert_eq!(systems, ["C"]);
        assert!(schemas.is_empty());
    }

    #[test]
    fn test_prop_and_system_respect_default_schemas() {
        let (systems, schemas) = resolve(
            &shop(),
            ResolveQuery::new()
                .system("B")
                .prop("zip")
                .default_schemas(["order"]),
        );
        assert_eq!(systems, ["B"]);
        assert_eq!(schemas, ["order"]);
    }

    #[test]
    fn test_prop_and_schema_ignores_prop() {
        let (systems, schemas) =
            resolve(&shop(), ResolveQuery::new().schema("order").prop("age"));
        assert_eq!(systems, ["B", "C"]);
        assert_eq!(schemas, ["order"]);
    }

    #[test]
    fn test_all_three_filters_fixed() {
        let (systems, schemas) = resolve(
            &shop(),
            ResolveQuery::new().system("A").schema("city").prop("zip"),
        );
        assert_eq!(systems, ["A"]);
        assert_eq!(schemas, ["city"]);
    }

    #[test]
    fn test_default_systems_derived_from_default_schemas() {
        let (systems, schemas) =
            resolve(&shop(), ResolveQuery::new().default_schemas(["order", "city"]));
        // order -> [B, C], city -> [A, B]
        assert_eq!(systems, ["C", "A", "B"]);
        assert_eq!(schemas, ["order", "city"]);
    }

    #[test]
    fn test_default_schemas_derived_from_default_systems() {
        let (systems, schemas) = resolve(&shop(), ResolveQuery::new().default_systems(["B", "A"]));
        // B -> [city, order], A -> [person, city]
        assert_eq!(systems, ["B", "A"]);
        assert_eq!(schemas, ["order", "person", "city"]);
    }

    #[test]
    fn test_defaults_used_as_given() {
        let (systems, schemas) = resolve(
            &shop(),
            ResolveQuery::new()
                .default_systems(["A", "C", "A"])
                .default_schemas(["person"]),
        );
        assert_eq!(systems, ["C", "A"]);
        assert_eq!(schemas, ["person"]);
    }

    #[test]
    fn test_system_filter_scoped_by_default_schemas() {
        let (systems, schemas) = resolve(
            &shop(),
            ResolveQuery::new().system("A").default_schemas(["city"]),
        );
        assert_eq!(systems, ["A"]);
        assert_eq!(schemas, ["city"]);
    }

    #[test]
    fn test_unknown_filters() {
        let index = two_systems();
        let err = index.resolve(&ResolveQuery::new().system("Z")).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownSystem(ref name) if name == "Z"));

        let err = index.resolve(&ResolveQuery::new().schema("z")).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownSchema(_)));

        let err = index.resolve(&ResolveQuery::new().prop("nope")).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownProperty(_)));
    }

    #[test]
    fn test_unknown_key_even_when_filters_fixed() {
        let err = two_systems()
            .resolve(&ResolveQuery::new().system("A").schema("missing"))
            .unwrap_err();
        assert!(err.is_unknown_key());
    }

    #[test]
    fn test_unknown_default_entries() {
        let index = two_systems();
        let err = index
            .resolve(&ResolveQuery::new().default_systems(["A", "Q"]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownSystem(_)));

        let err = index
            .resolve(&ResolveQuery::new().default_schemas(["q"]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownSchema(_)));
    }

    #[test]
    fn test_query_from_target() {
        let target = reqi_system::Target::new().schema("x").prop("id");
        let query = ResolveQuery::from(&target);
        assert_eq!(query.schema.as_deref(), Some("x"));
        assert_eq!(query.prop.as_deref(), Some("id"));
        assert!(query.default_systems.is_none());
    }
}
