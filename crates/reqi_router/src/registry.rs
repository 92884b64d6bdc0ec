//! Registry file loading.
//!
//! The registry is a JSON document listing in-memory systems:
//!
//! ```json
//! {
//!   "systems": [
//!     {
//!       "name": "users",
//!       "schemas": [{ "name": "person", "properties": ["name", "age"] }],
//!       "records": { "person": [{ "name": "ada", "age": 36 }] }
//!     }
//!   ]
//! }
//! ```
//!
//! File order is registry order. A later system with a repeated name replaces
//! the earlier one.

use std::path::Path;

use anyhow::{Context as _, Result};
use reqi_dispatch::Dispatcher;
use reqi_system::MemorySystem;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    systems: Vec<MemorySystem>,
}

/// Read `path` and build a dispatcher over its systems.
pub fn load(path: &Path) -> Result<Dispatcher> {
    info!(path = %path.display(), "loading registry");
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registry {}", path.display()))?;
    parse(&source).with_context(|| format!("invalid registry {}", path.display()))
}

/// Build a dispatcher from a registry document.
pub fn parse(source: &str) -> Result<Dispatcher> {
    let file: RegistryFile = serde_json::from_str(source)?;
    if file.systems.is_empty() {
        warn!("registry declares no systems");
    }

    let mut builder = Dispatcher::builder();
    for system in file.systems {
        builder = builder.system(system);
    }
    let dispatcher = builder.build()?;

    let index = dispatcher.index();
    info!(
        systems = index.system_names().count(),
        schemas = index.schema_names().count(),
        "registry loaded"
    );
    Ok(dispatcher)
}
