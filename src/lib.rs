//! # ctxvisor
//!
//! **ctxvisor** is a hierarchical supervision and cancellation runtime for tokio.
//!
//! Work is organised as a tree of *contexts*. Each context runs exactly one
//! [`Task`]; tasks attach child contexts below their own. Cancelling any
//! context tears down the whole subtree rooted at it, children fully
//! terminated before their parent, before that context counts as closed.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                        ┌──────────────────────────────┐
//!                        │ Tree (one per Root)          │
//!                        │ - structure lock (attach)    │
//!                        │ - cancellation lock          │
//!                        │ - DebugSink                  │
//!                        └──────────────┬───────────────┘
//!                                       │ shared by every node
//!                              ┌────────┴────────┐
//!                              │   root node     │  RootTask: await signal
//!                              └───┬─────────┬───┘
//!                  spawn_child()   ▼         ▼   spawn_child()
//!                           ┌──────────┐ ┌──────────┐
//!                           │ node A   │ │ node C   │   one tokio task each
//!                           │ Task::run│ │ Task::run│
//!                           └────┬─────┘ └──────────┘
//!                                ▼ ctx.spawn_child()
//!                           ┌──────────┐
//!                           │ node B   │
//!                           └──────────┘
//! ```
//!
//! ### Cancellation
//! ```text
//! ctx.cancel()  (returns immediately)
//!   └─► tokio::spawn(cancel)
//!         ├─ cancellation lock        one sequence per tree at a time
//!         ├─ freeze                   creation_allowed = false, top-down
//!         └─ collapse                 depth-first:
//!               hook ─► drain children ─► collapse each ─► wait children
//!                    ─► detach from parent ─► close signal ─► wait own task
//!
//! B returns ─► A's signal closes ─► A returns ─► root's signal closes ─► root.wait() returns
//! ```
//!
//! ## Features
//! | Area            | Description                                                 | Key types                                 |
//! |-----------------|-------------------------------------------------------------|-------------------------------------------|
//! | **Tree**        | Create a supervision tree, cancel it, wait for it.          | [`Root`], [`RootBuilder`], [`Config`]     |
//! | **Tasks**       | Logic attached to a node; closures or custom types.         | [`Task`], [`TaskFn`], [`Context`]         |
//! | **Tracing**     | Path-tagged lifecycle and log events, pluggable receivers.  | [`DebugSink`], [`Event`], [`DebugPath`]   |
//! | **Errors**      | Typed lifecycle and task errors.                            | [`Error`], [`TaskError`], [`OrphanPolicy`]|
//!
//! ## Optional features
//! - `logging` (default): exports the stdout [`ConsoleSink`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use ctxvisor::{Context, Root, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Root::new();
//!
//!     let worker = TaskFn::new(|ctx: Context| async move {
//!         // A child of the worker; torn down before the worker's own signal fires.
//!         ctx.spawn_child(
//!             TaskFn::new(|ctx: Context| async move {
//!                 ctx.cancelled().await;
//!                 Ok::<_, TaskError>(())
//!             }),
//!             "helper",
//!             "idle",
//!         )
//!         .map_err(|e| TaskError::fail(e.to_string()))?;
//!
//!         ctx.cancelled().await;
//!         Ok::<_, TaskError>(())
//!     });
//!     root.spawn_child(worker, "worker", "demo")?;
//!
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     root.cancel();
//!     root.wait().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod sinks;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Config, Context, OrphanPolicy, Root, RootBuilder};
pub use error::{Error, TaskError};
pub use events::{DebugNode, DebugPath, Event, EventKind};
pub use sinks::{DebugSink, NoopSink, Subscribe, SubscriberSet, TracingSink};
pub use tasks::{Task, TaskFn};

// Optional: expose a simple stdout sink.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use sinks::ConsoleSink;
