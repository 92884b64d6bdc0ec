//! # reqi_system
//!
//! The collaborator side of the request router. The dispatcher never looks
//! inside a backend: it only sees the capability interfaces defined here.
//!
//! This crate provides:
//!
//! - [`Schema`] trait — a named record shape, iterable over property names.
//! - [`System`] trait — a named backend exposing schemas and executing nodes.
//! - [`Node`], [`Target`] and [`Context`] — the opaque execution units and the
//!   key/value mapping threaded through execution.
//! - [`MemorySchema`] and [`MemorySystem`] — in-memory adapters used by the
//!   router binary and by tests.

pub mod error;
pub mod memory;
pub mod node;
pub mod schema;
pub mod system;

pub use error::SystemError;
pub use memory::{MemorySchema, MemorySystem};
pub use node::{Context, Node, Target};
pub use schema::Schema;
pub use system::System;
