//! # Task contract.
//!
//! A [`Task`] is the logic attached to exactly one context node. Its entry
//! point runs once, for the whole lifetime of the node, and receives the
//! node's [`Context`] as capability surface: it can attach children, await its
//! own signal, request cancellation, and log.
//!
//! The entry point must return only after the node's signal fired, or after
//! it cancelled its own subtree and waited for it. Returning while children
//! are still attached is a lifecycle violation (see
//! [`OrphanPolicy`](crate::OrphanPolicy)).

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Context;
use crate::error::TaskError;

/// # Supervised unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use ctxvisor::{Context, Task, TaskError};
///
/// struct Idle;
///
/// #[async_trait]
/// impl Task for Idle {
///     async fn run(&self, ctx: Context) -> Result<(), TaskError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Runs the node's logic until its signal fires.
    ///
    /// Errors are traced through the tree's sink; the node is torn down the
    /// same way whatever this returns.
    async fn run(&self, ctx: Context) -> Result<(), TaskError>;
}

#[async_trait]
impl<T: Task + ?Sized> Task for Box<T> {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        (**self).run(ctx).await
    }
}

#[async_trait]
impl<T: Task + ?Sized> Task for Arc<T> {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        (**self).run(ctx).await
    }
}
