//! Dispatcher — owns the systems and the current index snapshot.
//!
//! The dispatcher is built once from a mapping of system name to system and
//! immediately indexes it. The system set never changes afterwards. The index
//! can be rebuilt with [`Dispatcher::reload`], which swaps a complete new
//! snapshot in atomically so readers never observe a half-built index.

use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use reqi_system::{Context, Node, System};
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::index::IndexSnapshot;
use crate::queue::RequestQueue;
use crate::request::Request;
use crate::resolve::{Resolution, ResolveQuery};

/// Routes requests to the systems they concern.
pub struct Dispatcher {
    /// Systems keyed by name, in registration order.
    systems: IndexMap<String, Arc<dyn System>>,
    /// The current reverse-lookup tables.
    index: ArcSwap<IndexSnapshot>,
}

impl Dispatcher {
    /// Create a dispatcher over `systems` and build its index.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRegistry`] if the systems cannot be
    /// indexed.
    pub fn new(systems: IndexMap<String, Arc<dyn System>>) -> Result<Self, DispatchError> {
        let index = IndexSnapshot::build(&systems)?;
        Ok(Self {
            systems,
            index: ArcSwap::from_pointee(index),
        })
    }

    /// Start building a dispatcher system by system.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Rebuild the index from the registered systems.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRegistry`] if the rebuild fails. The
    /// previous snapshot stays in place.
    pub fn reload(&self) -> Result<(), DispatchError> {
        let snapshot = IndexSnapshot::build(&self.systems)?;
        self.index.store(Arc::new(snapshot));
        Ok(())
    }

    /// The current index snapshot.
    #[must_use]
    pub fn index(&self) -> Arc<IndexSnapshot> {
        self.index.load_full()
    }

    /// Look up a registered system.
    #[must_use]
    pub fn system(&self, name: &str) -> Option<&Arc<dyn System>> {
        self.systems.get(name)
    }

    /// Registered systems, in registration order.
    pub fn systems(&self) -> impl Iterator<Item = (&str, &Arc<dyn System>)> {
        self.systems.iter().map(|(name, system)| (name.as_str(), system))
    }

    /// Resolve `query` against the current index.
    ///
    /// # Errors
    ///
    /// Returns an unknown-key error if the query names an unindexed system,
    /// schema or property.
    pub fn resolve(&self, query: &ResolveQuery) -> Result<Resolution, DispatchError> {
        self.index.load().resolve(query)
    }

    /// Execute `nodes` with `ctx`.
    ///
    /// Each node is sent to every system its target resolves to. Systems run
    /// once each, in the order they were first reached, and their outputs are
    /// merged over a copy of `ctx` (later writes win). An empty node list
    /// returns `ctx` unchanged.
    ///
    /// # Errors
    ///
    /// Returns an unknown-key error if a node target cannot be resolved, or
    /// [`DispatchError::Execution`] with the first system failure. Systems
    /// after the failing one are not run.
    pub fn run(&self, nodes: &[Node], ctx: &Context) -> Result<Context, DispatchError> {
        let mut out = ctx.clone();
        if nodes.is_empty() {
            return Ok(out);
        }

        let index = self.index();
        let mut batches: IndexMap<String, Vec<Node>> = IndexMap::new();
        for node in nodes {
            let resolution = index.resolve(&ResolveQuery::from(&node.target))?;
            for system in resolution.systems {
                batches.entry(system).or_default().push(node.clone());
            }
        }

        for (name, batch) in &batches {
            let system = self
                .systems
                .get(name)
                .ok_or_else(|| DispatchError::UnknownSystem(name.clone()))?;

            debug!(system = name, nodes = batch.len(), "dispatching batch");

            let result = system.execute(batch, ctx).map_err(|source| {
                warn!(system = name, error = %source, "system execution failed");
                DispatchError::Execution {
                    system: name.clone(),
                    source,
                }
            })?;
            out.extend(result);
        }

        Ok(out)
    }

    /// Bind `nodes` and `ctx` to this dispatcher.
    #[must_use]
    pub fn request(&self, nodes: Vec<Node>, ctx: Option<Context>) -> Request<'_> {
        Request::new(self, nodes, ctx)
    }

    /// Create an empty request queue bound to this dispatcher.
    #[must_use]
    pub fn queue(&self) -> RequestQueue<'_> {
        RequestQueue::new(self)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("systems", &self.systems.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Collects systems before building a [`Dispatcher`].
///
/// A system registered under a name already present replaces the earlier
/// one and keeps its position.
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    systems: IndexMap<String, Arc<dyn System>>,
}

impl DispatcherBuilder {
    /// Register a system under its own name.
    #[must_use]
    pub fn system<S: System + 'static>(self, system: S) -> Self {
        self.shared(Arc::new(system))
    }

    /// Register an already shared system under its own name.
    #[must_use]
    pub fn shared(mut self, system: Arc<dyn System>) -> Self {
        self.systems.insert(system.name().to_string(), system);
        self
    }

    /// Build the dispatcher and its index.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::new`].
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        Dispatcher::new(self.systems)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reqi_system::{MemorySchema, MemorySystem, Schema, SystemError, Target};
    use serde_json::{Map, Value, json};

    use super::*;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::builder()
            .system(
                MemorySystem::new("users")
                    .with_schema(MemorySchema::new("person", ["name", "age"]))
                    .with_record("person", record(json!({"name": "ada", "age": 36}))),
            )
            .system(
                MemorySystem::new("geo")
                    .with_schema(MemorySchema::new("city", ["name", "zip"]))
                    .with_record("city", record(json!({"name": "paris", "zip": "75000"}))),
            )
            .build()
            .unwrap()
    }

    /// A system whose schema list can be swapped between index builds.
    struct Mutable {
        schemas: Mutex<Vec<Arc<dyn Schema>>>,
    }

    impl System for Mutable {
        fn name(&self) -> &str {
            "mutable"
        }

        fn schemas(&self) -> Vec<Arc<dyn Schema>> {
            self.schemas.lock().unwrap().clone()
        }

        fn execute(&self, _nodes: &[Node], _ctx: &Context) -> Result<Context, SystemError> {
            Err(SystemError::Backend("offline".to_string()))
        }
    }

    #[test]
    fn test_builder_registration_order() {
        let dispatcher = dispatcher();
        let names: Vec<&str> = dispatcher.systems().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["users", "geo"]);
        assert!(dispatcher.system("geo").is_some());
        assert!(dispatcher.system("nope").is_none());
    }

    #[test]
    fn test_duplicate_name_overwrites() {
        let dispatcher = Dispatcher::builder()
            .system(MemorySystem::new("db").with_schema(MemorySchema::new("old", ["id"])))
            .system(MemorySystem::new("db").with_schema(MemorySchema::new("new", ["id"])))
            .build()
            .unwrap();
        let index = dispatcher.index();
        assert_eq!(index.schemas_of("db").unwrap(), ["new"]);
        assert!(!index.has_schema("old"));
    }

    #[test]
    fn test_resolve_through_dispatcher() {
        let resolution = dispatcher()
            .resolve(&ResolveQuery::new().prop("zip"))
            .unwrap();
        assert_eq!(resolution.systems, vec!["geo"]);
        assert_eq!(resolution.schemas, vec!["city"]);
    }

    #[test]
    fn test_run_routes_nodes_by_target() {
        let nodes = vec![
            Node::new("names", Target::new().prop("name")),
            Node::new("zips", Target::new().schema("city").prop("zip")),
        ];
        let mut ctx = Context::new();
        ctx.insert("caller".to_string(), json!("test"));

        let out = dispatcher().run(&nodes, &ctx).unwrap();
        assert_eq!(out["caller"], json!("test"));
        // Both systems answer "names"; geo runs last and wins.
        assert_eq!(out["names"], json!(["paris"]));
        assert_eq!(out["zips"], json!(["75000"]));
    }

    #[test]
    fn test_run_empty_nodes_returns_context() {
        let mut ctx = Context::new();
        ctx.insert("k".to_string(), json!(1));
        let out = dispatcher().run(&[], &ctx).unwrap();
        assert_eq!(out, ctx);
    }

    #[test]
    fn test_run_unknown_target() {
        let nodes = vec![Node::new("x", Target::new().system("nowhere"))];
        let err = dispatcher().run(&nodes, &Context::new()).unwrap_err();
        assert!(err.is_unknown_key());
    }

    #[test]
    fn test_run_propagates_system_failure() {
        let system = Arc::new(Mutable {
            schemas: Mutex::new(vec![Arc::new(MemorySchema::new("s", ["p"])) as Arc<dyn Schema>]),
        });
        let dispatcher = Dispatcher::builder().shared(system).build().unwrap();
        let nodes = vec![Node::new("x", Target::new().prop("p"))];
        let err = dispatcher.run(&nodes, &Context::new()).unwrap_err();
        match err {
            DispatchError::Execution { system, source } => {
                assert_eq!(system, "mutable");
                assert!(matches!(source, SystemError::Backend(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reload_swaps_snapshot() {
        let system = Arc::new(Mutable {
            schemas: Mutex::new(vec![Arc::new(MemorySchema::new("a", ["p"])) as Arc<dyn Schema>]),
        });
        let dispatcher = Dispatcher::builder()
            .shared(system.clone())
            .build()
            .unwrap();
        let before = dispatcher.index();

        *system.schemas.lock().unwrap() =
            vec![Arc::new(MemorySchema::new("b", ["q"])) as Arc<dyn Schema>];
        dispatcher.reload().unwrap();

        let after = dispatcher.index();
        assert!(before.has_schema("a"));
        assert!(!after.has_schema("a"));
        assert_eq!(after.schemas_with("q").unwrap(), ["b"]);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let system = Arc::new(Mutable {
            schemas: Mutex::new(vec![Arc::new(MemorySchema::new("a", ["p"])) as Arc<dyn Schema>]),
        });
        let dispatcher = Dispatcher::builder()
            .shared(system.clone())
            .build()
            .unwrap();

        *system.schemas.lock().unwrap() =
            vec![Arc::new(MemorySchema::new("", ["q"])) as Arc<dyn Schema>];
        let err = dispatcher.reload().unwrap_err();
        assert!(matches!(err, DispatchError::MalformedRegistry(_)));

        let index = dispatcher.index();
        assert!(index.has_schema("a"));
        assert!(!index.has_property("q"));
    }
}
