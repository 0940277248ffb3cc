//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(Context) -> Fut`, so small tasks and
//! tests do not need a dedicated type.
//!
//! ## Example
//! ```rust
//! use ctxvisor::{Context, TaskError, TaskFn};
//!
//! let idle = TaskFn::new(|ctx: Context| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = idle;
//! ```

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::core::Context;
use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
pub struct TaskFn<F> {
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
