//! # Root: entry point of a supervision tree.
//!
//! A [`Root`] owns the top-level node of one tree. Its task does nothing but
//! wait for its own signal; everything else hangs below it.
//!
//! ```text
//! Root::builder(cfg).with_sink(sink).build()
//!   └─► Tree { structure, cancellation, sink }
//!         └─► root node ── RootTask (await signal)
//!               ├─► spawn_child(task A) ── A.run(ctx)
//!               │                             └─► ctx.spawn_child(task B)
//!               └─► ...
//!
//! root.cancel()  ─► freeze + collapse (B, then A, then root)
//! root.wait()    ─► returns when the whole tree has exited
//! ```
//!
//! Building a root spawns its task, so it must happen inside a tokio runtime.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::Config;
use crate::core::context::Context;
use crate::core::node::Node;
use crate::core::tree::Tree;
use crate::error::{Error, TaskError};
use crate::events::DebugPath;
use crate::sinks::{DebugSink, NoopSink};
use crate::tasks::Task;

/// Built-in task of the root node: block until cancelled.
struct RootTask;

#[async_trait]
impl Task for RootTask {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        ctx.cancelled().await;
        Ok(())
    }
}

/// Top of a supervision tree.
pub struct Root {
    ctx: Context,
}

impl Root {
    /// Creates a tree with the default [`Config`] and a [`NoopSink`].
    pub fn new() -> Self {
        Self::builder(Config::default()).build()
    }

    /// Returns a builder for a tree with the given configuration.
    pub fn builder(cfg: Config) -> RootBuilder {
        RootBuilder::new(cfg)
    }

    /// Attaches a child of the root. See [`Context::spawn_child`].
    pub fn spawn_child<T: Task>(
        &self,
        task: T,
        name: &str,
        component_type: &str,
    ) -> Result<Context, Error> {
        self.ctx.spawn_child(task, name, component_type)
    }

    /// Requests teardown of the whole tree; returns immediately.
    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    /// Waits until every node of the tree has exited.
    pub async fn wait(&self) {
        self.ctx.wait().await;
    }

    /// Emits a log event scoped to the root's path.
    pub fn log(&self, args: &[&dyn fmt::Display]) {
        self.ctx.log(args);
    }

    /// The root node's context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root").field("ctx", &self.ctx).finish()
    }
}

/// Builder for constructing a [`Root`].
pub struct RootBuilder {
    cfg: Config,
    sink: Arc<dyn DebugSink>,
}

impl RootBuilder {
    /// Creates a new builder with the given configuration and a [`NoopSink`].
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            sink: Arc::new(NoopSink),
        }
    }

    /// Sets the sink that receives every trace event of the tree.
    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the tree and starts the root task.
    pub fn build(self) -> Root {
        let tree = Tree::new(self.sink, self.cfg.orphan_policy);
        let path = DebugPath::root(self.cfg.root_name.as_ref(), self.cfg.root_type.as_ref());
        let node = Node::spawn_root(tree, path, Box::new(RootTask));
        Root {
            ctx: Context::from_node(node),
        }
    }
}
