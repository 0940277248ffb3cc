//! # Context: the capability surface handed to a task.
//!
//! A [`Context`] is a cheap, cloneable handle to one node of a supervision
//! tree. The task attached to that node receives it as the argument of
//! [`Task::run`](crate::Task::run) and uses it to:
//! - attach children ([`Context::spawn_child`]),
//! - observe its own cancellation ([`Context::cancelled`]),
//! - request teardown of its subtree ([`Context::cancel`]),
//! - trace ([`Context::log`]).
//!
//! ## Typical task loop
//! ```rust
//! use std::time::Duration;
//! use ctxvisor::{Context, TaskError, TaskFn};
//!
//! let ticker = TaskFn::new(|ctx: Context| async move {
//!     let mut n = 0u64;
//!     loop {
//!         tokio::select! {
//!             _ = ctx.cancelled() => break,
//!             _ = tokio::time::sleep(Duration::from_millis(100)) => {
//!                 n += 1;
//!                 ctx.log(&[&"tick", &n]);
//!             }
//!         }
//!     }
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = ticker;
//! ```
//!
//! ## Finishing early
//! A task that wants to stop before anyone cancels it calls
//! [`Context::cancel`] on itself and keeps awaiting [`Context::cancelled`]:
//! its children are torn down first, then its own signal fires.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::{WaitForCancellationFuture, WaitForCancellationFutureOwned};

use crate::core::node::Node;
use crate::error::Error;
use crate::events::{DebugPath, Event, EventKind};
use crate::tasks::Task;

/// Handle to one node of a supervision tree.
#[derive(Clone)]
pub struct Context {
    node: Arc<Node>,
}

impl Context {
    pub(crate) fn from_node(node: Arc<Node>) -> Self {
        Self { node }
    }

    /// Attaches a child running `task`.
    ///
    /// `name` and `component_type` are free-form labels recorded in the
    /// child's [`DebugPath`].
    ///
    /// Fails with [`Error::ParentClosing`] once this node has begun cancelling;
    /// in that case nothing was spawned.
    pub fn spawn_child<T: Task>(
        &self,
        task: T,
        name: &str,
        component_type: &str,
    ) -> Result<Context, Error> {
        self.node
            .attach(Box::new(task), name, component_type)
            .map(Context::from_node)
    }

    /// Requests teardown of this node and its whole subtree.
    ///
    /// Returns immediately; the teardown runs on a separate tokio task, so a
    /// task may call this on its own context. Repeated calls are no-ops.
    pub fn cancel(&self) {
        tokio::spawn(Arc::clone(&self.node).cancel());
    }

    /// Resolves once this node's signal has been closed.
    ///
    /// By then every descendant task has already returned.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.node.signal().cancelled()
    }

    /// Owned variant of [`Context::cancelled`], for `'static` futures.
    pub fn cancelled_owned(&self) -> WaitForCancellationFutureOwned {
        self.node.signal().clone().cancelled_owned()
    }

    /// True once this node's signal has been closed.
    pub fn is_closed(&self) -> bool {
        self.node.is_closed()
    }

    /// Waits until every child task and then this node's own task have returned.
    ///
    /// Never call this on the context of the task that is awaiting it.
    pub async fn wait(&self) {
        self.node.wait().await;
    }

    /// Registers a callback run once, right before this node starts closing
    /// its children. Replaces any previously registered callback.
    pub fn set_on_before_closing<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.node.set_on_before_close(Box::new(hook));
    }

    /// Emits a [`EventKind::Log`] trace event tagged with this node's path.
    pub fn log(&self, args: &[&dyn fmt::Display]) {
        self.node.emit(
            Event::new(EventKind::Log, self.node.path().clone())
                .with_args(args.iter().map(|a| a.to_string())),
        );
    }

    /// Sibling-unique id of this node (`0` for a root).
    pub fn id(&self) -> u64 {
        self.node.id()
    }

    /// Root-to-node lineage of this node.
    pub fn path(&self) -> &DebugPath {
        self.node.path()
    }

    /// Number of children currently attached.
    pub fn child_count(&self) -> usize {
        self.node.child_count()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("path", &self.node.path().to_string())
            .field("closed", &self.node.is_closed())
            .finish()
    }
}
