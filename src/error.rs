//! Error types used by the ctxvisor runtime and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`Error`] — lifecycle errors raised by the supervision tree itself.
//! - [`TaskError`] — errors returned by individual task entry points.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logs and sinks.

use thiserror::Error;

use crate::events::DebugPath;

/// # Errors produced by the supervision tree.
///
/// `ParentClosing` is recoverable and returned to the caller of
/// [`Context::spawn_child`](crate::Context::spawn_child).
/// `OrphanedChildren` is a programming error in a task and is routed to the
/// configured [`OrphanPolicy`](crate::OrphanPolicy), never returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The parent has started cancelling; no child was created.
    #[error("cannot attach '{name}': parent {parent} is already closing")]
    ParentClosing {
        /// Debug path of the parent that rejected the attach.
        parent: DebugPath,
        /// Component name of the rejected child.
        name: String,
    },

    /// A task returned from its entry point while still owning live children.
    #[error(
        "context {path} returned with {count} unclosed children; cancel them and wait instead of returning"
    )]
    OrphanedChildren {
        /// Debug path of the offending node.
        path: DebugPath,
        /// Number of children still attached when the task returned.
        count: usize,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use ctxvisor::{DebugPath, Error};
    ///
    /// let err = Error::ParentClosing { parent: DebugPath::root("root", "root"), name: "worker".into() };
    /// assert_eq!(err.as_label(), "parent_closing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::ParentClosing { .. } => "parent_closing",
            Error::OrphanedChildren { .. } => "orphaned_children",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            Error::ParentClosing { parent, name } => {
                format!("attach of {name} rejected by closing parent {parent}")
            }
            Error::OrphanedChildren { path, count } => {
                format!("{path} exited owning {count} children")
            }
        }
    }
}

/// # Errors returned by a task entry point.
///
/// The tree does not act on these beyond tracing them: a failed task is still
/// cancelled and drained like any other node.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task logic failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed its signal and stopped early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use ctxvisor::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// `Canceled` is a graceful exit, not a failure.
    pub fn is_graceful(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// Extracts the message of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
