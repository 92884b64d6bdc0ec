//! Requests — a node sequence and a context bound to a dispatcher.

use std::fmt;

use reqi_system::{Context, Node};
use tracing::debug;
use uuid::Uuid;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;

/// Unique identifier attached to each request for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An ordered node sequence and an execution context to run through a
/// [`Dispatcher`].
///
/// The result of the last successful [`Request::run`] is kept and available
/// through [`Request::result`].
#[derive(Debug)]
pub struct Request<'d> {
    id: RequestId,
    dispatcher: &'d Dispatcher,
    nodes: Vec<Node>,
    ctx: Option<Context>,
    resctx: Option<Context>,
}

impl<'d> Request<'d> {
    #[must_use]
    pub fn new(dispatcher: &'d Dispatcher, nodes: Vec<Node>, ctx: Option<Context>) -> Self {
        Self {
            id: RequestId::new(),
            dispatcher,
            nodes,
            ctx,
            resctx: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn dispatcher(&self) -> &'d Dispatcher {
        self.dispatcher
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn ctx(&self) -> Option<&Context> {
        self.ctx.as_ref()
    }

    /// The result of the last successful run, if any.
    #[must_use]
    pub fn result(&self) -> Option<&Context> {
        self.resctx.as_ref()
    }

    /// Execute the nodes through the dispatcher and store the result.
    ///
    /// With no nodes nothing is executed and `None` is returned. Every call
    /// with nodes executes again and replaces the stored result; it is not a
    /// cache lookup.
    ///
    /// # Errors
    ///
    /// Propagates the dispatcher's error unchanged. The stored result is left
    /// as it was before the call.
    pub fn run(&mut self) -> Result<Option<&Context>, DispatchError> {
        if self.nodes.is_empty() {
            debug!(request_id = %self.id, "request has no nodes");
            return Ok(None);
        }

        debug!(request_id = %self.id, nodes = self.nodes.len(), "running request");

        let empty = Context::new();
        let ctx = self.ctx.as_ref().unwrap_or(&empty);
        let result = self.dispatcher.run(&self.nodes, ctx)?;
        self.resctx = Some(result);
        Ok(self.resctx.as_ref())
    }
}
