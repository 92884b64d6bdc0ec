//! Request queue — accumulates requests against one dispatcher and runs them
//! in insertion order.

use reqi_system::{Context, Node};
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::request::{Request, RequestId};

#[derive(Debug)]
pub struct RequestQueue<'d> {
    dispatcher: &'d Dispatcher,
    requests: Vec<Request<'d>>,
}

impl<'d> RequestQueue<'d> {
    #[must_use]
    pub fn new(dispatcher: &'d Dispatcher) -> Self {
        Self {
            dispatcher,
            requests: Vec::new(),
        }
    }

    /// Append a request and return its id.
    pub fn push(&mut self, nodes: Vec<Node>, ctx: Option<Context>) -> RequestId {
        let request = self.dispatcher.request(nodes, ctx);
        let id = request.id();
        self.requests.push(request);
        id
    }

    /// Run every queued request in order, stopping at the first failure.
    ///
    /// Requests before the failing one keep their results; later ones are
    /// not run.
    ///
    /// # Errors
    ///
    /// Returns the first request's error.
    pub fn run_all(&mut self) -> Result<(), DispatchError> {
        debug!(requests = self.requests.len(), "running request queue");
        for request in &mut self.requests {
            request.run()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn requests(&self) -> &[Request<'d>] {
        &self.requests
    }

    #[must_use]
    pub fn into_requests(self) -> Vec<Request<'d>> {
        self.requests
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
