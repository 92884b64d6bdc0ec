//! Dispatch-layer error types.

use reqi_system::SystemError;

/// Errors that can occur while indexing, resolving or executing requests.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A system name is not present in the index.
    #[error("unknown system: {0}")]
    UnknownSystem(String),

    /// A schema name is not present in the index.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// A property name is not declared by any indexed schema.
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// The registry could not be indexed. The previous index is kept.
    #[error("malformed registry: {0}")]
    MalformedRegistry(String),

    /// A system failed while executing its nodes.
    #[error("system '{system}' failed")]
    Execution {
        system: String,
        #[source]
        source: SystemError,
    },
}

impl DispatchError {
    /// Returns `true` for the unknown system/schema/property family.
    #[must_use]
    pub fn is_unknown_key(&self) -> bool {
        matches!(
            self,
            Self::UnknownSystem(_) | Self::UnknownSchema(_) | Self::UnknownProperty(_)
        )
    }
}
