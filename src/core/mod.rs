//! Runtime core: supervision tree, nodes and lifecycle.
//!
//! The public API from this module is [`Root`], [`Context`] and the tree
//! [`Config`].
//!
//! Internal modules:
//! - [`tree`]: per-root shared state (structure and cancellation locks, sink);
//! - [`node`]: attach, task lifecycle, freeze and collapse;
//! - [`barrier`]: async wait-group used for children/self readiness;
//! - [`context`]: capability handle passed to tasks;
//! - [`root`]: top-level node and its builder;
//! - [`config`]: tree configuration and orphan policy.

mod barrier;
mod config;
mod context;
mod node;
mod root;
mod tree;

#[cfg(test)]
mod tests;

pub use config::{Config, OrphanPolicy};
pub use context::Context;
pub use root::{Root, RootBuilder};
