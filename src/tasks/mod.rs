//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait implemented by anything attached to a context node
//! - [`TaskFn`] - closure-backed task implementation

mod task;
mod task_fn;

pub use task::Task;
pub use task_fn::TaskFn;
