//! # Trace events emitted by context nodes.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: task execution flow (started, finished, failed)
//! - **Teardown events**: subtree collapse (closing, signal closed)
//! - **Diagnostics**: rejected attaches, orphan violations, user log lines
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use ctxvisor::{DebugPath, Event, EventKind};
//!
//! let path = DebugPath::root("root", "root").child(0, "loop", "eventLoop");
//! let ev = Event::new(EventKind::Log, path).with_args(["tick", "42"]);
//!
//! assert_eq!(ev.kind, EventKind::Log);
//! assert_eq!(ev.args.len(), 2);
//! assert_eq!(ev.path.to_string(), "root->loop");
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use super::DebugPath;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The node's task is about to run its entry point.
    Started,
    /// The node's task entry point returned `Ok` or `Canceled`.
    Finished,
    /// The node's task entry point returned an error.
    ///
    /// Sets `args[0]`: error message.
    Failed,
    /// The node entered the collapse phase of a cancellation.
    Closing,
    /// The node's signal was closed (exactly once per node).
    SignalClosed,
    /// An attach was rejected because the node is closing.
    ///
    /// Sets `args[0]`: rejected component name.
    AttachRejected,
    /// A task returned while still owning children.
    ///
    /// Sets `args[0]`: number of children still attached.
    OrphanedChildren,
    /// Free-form line from [`Context::log`](crate::Context::log).
    Log,
}

impl EventKind {
    /// Returns a short stable label (kebab-case) for text sinks.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Finished => "finished",
            EventKind::Failed => "failed",
            EventKind::Closing => "closing",
            EventKind::SignalClosed => "signal-closed",
            EventKind::AttachRejected => "attach-rejected",
            EventKind::OrphanedChildren => "orphaned-children",
            EventKind::Log => "log",
        }
    }
}

/// Trace event with the emitting node's lineage.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `args`: rendered argument list; meaning depends on [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Root-to-node path of the emitting node.
    pub path: DebugPath,
    /// Free-form arguments, already rendered to text.
    pub args: Arc<[String]>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind, path: DebugPath) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            path,
            args: Arc::new([]),
        }
    }

    /// Attaches the argument list.
    #[inline]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches a single argument.
    #[inline]
    pub fn with_arg(self, arg: impl Into<String>) -> Self {
        self.with_args([arg.into()])
    }
}
