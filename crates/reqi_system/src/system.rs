//! The system capability interface.

use std::sync::Arc;

use crate::error::SystemError;
use crate::node::{Context, Node};
use crate::schema::Schema;

/// A named backend holding data for one or more schemas.
///
/// The dispatcher reads [`System::schemas`] once per index build and calls
/// [`System::execute`] with the nodes routed to this system.
pub trait System: Send + Sync {
    /// The system name. Must match the key it is registered under.
    fn name(&self) -> &str;

    /// Schemas exposed by this system, in declaration order. A schema listed
    /// twice is indexed twice.
    fn schemas(&self) -> Vec<Arc<dyn Schema>>;

    /// Execute an ordered node sequence against this system.
    ///
    /// # Errors
    ///
    /// Returns a [`SystemError`] if the backend cannot execute the nodes.
    fn execute(&self, nodes: &[Node], ctx: &Context) -> Result<Context, SystemError>;
}

impl std::fmt::Debug for dyn System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
