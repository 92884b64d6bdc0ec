//! # reqi_dispatch
//!
//! Routes partially specified requests to the systems and schemas they
//! concern.
//!
//! ## Flow
//!
//! 1. A [`Dispatcher`] is built from a mapping of system name to [`System`].
//! 2. It scans every system once and stores an immutable [`IndexSnapshot`]
//!    holding the four reverse lookups (system→schemas, schema→systems,
//!    name→schema, property→schemas).
//! 3. [`Dispatcher::resolve`] turns a [`ResolveQuery`] (optional system,
//!    schema and property filters plus optional defaults) into a concrete
//!    [`Resolution`].
//! 4. A [`Request`] binds a node sequence and a context to the dispatcher and
//!    executes them with [`Request::run`].
//!
//! ## Usage
//!
//! ```rust
//! use reqi_dispatch::{Dispatcher, ResolveQuery};
//! use reqi_system::{MemorySchema, MemorySystem};
//!
//! let dispatcher = Dispatcher::builder()
//!     .system(MemorySystem::new("A").with_schema(MemorySchema::new("x", ["id"])))
//!     .system(MemorySystem::new("B").with_schema(MemorySchema::new("y", ["id"])))
//!     .build()
//!     .unwrap();
//!
//! let resolution = dispatcher.resolve(&ResolveQuery::new().system("A")).unwrap();
//! assert_eq!(resolution.systems, vec!["A"]);
//! assert_eq!(resolution.schemas, vec!["x"]);
//! ```
//!
//! [`System`]: reqi_system::System

pub mod dispatcher;
pub mod error;
pub mod index;
pub mod queue;
pub mod request;
pub mod resolve;
pub mod unique;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::DispatchError;
pub use index::IndexSnapshot;
pub use queue::RequestQueue;
pub use request::{Request, RequestId};
pub use resolve::{Resolution, ResolveQuery};
pub use unique::UniqueSeq;
