//! Router configuration.

use std::path::PathBuf;

/// Default registry file, relative to the working directory.
pub const DEFAULT_REGISTRY_PATH: &str = "registry.json";

/// The environment variable used to override the registry path.
pub const REGISTRY_ENV: &str = "REQI_REGISTRY";

/// Default tracing directive added on top of `RUST_LOG`.
pub const DEFAULT_LOG_DIRECTIVE: &str = "reqi_router=info";

/// Configuration for the router process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// JSON file describing the systems to load.
    pub registry_path: PathBuf,
    /// Tracing directive, e.g. `"reqi_dispatch=debug"`.
    pub log_directive: String,
}

impl RouterConfig {
    /// Create a config with the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            log_directive: DEFAULT_LOG_DIRECTIVE.to_string(),
        }
    }

    /// Defaults, with the registry path taken from `REQI_REGISTRY` if set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::new();
        match lookup(REGISTRY_ENV) {
            Some(path) if !path.is_empty() => config.with_registry_path(path),
            _ => config,
        }
    }

    /// Override the registry path.
    #[must_use]
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    /// Override the tracing directive.
    #[must_use]
    pub fn with_log_directive(mut self, directive: impl Into<String>) -> Self {
        self.log_directive = directive.into();
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}
