//! Trace events: node paths and the event data model.
//!
//! Every event emitted by the tree carries the full ancestor path of the
//! emitting node, root first. Events are handed synchronously to the tree's
//! [`DebugSink`](crate::DebugSink).
//!
//! ## Contents
//! - [`DebugNode`], [`DebugPath`] root-to-node lineage, copied on attach
//! - [`EventKind`], [`Event`] event classification and payload

mod event;
mod path;

pub use event::{Event, EventKind};
pub use path::{DebugNode, DebugPath};
