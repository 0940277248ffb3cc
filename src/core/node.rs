//! # Context node: attach, task lifecycle and subtree collapse.
//!
//! ## Attach
//! ```text
//! parent.attach(task)
//!   └─ structure lock
//!        ├─ creation_allowed == false ─► Err(ParentClosing)     (nothing spawned)
//!        └─ id = next_child_id++; path = parent.path + {id, type, name}
//!           children[id] = node; children_barrier.add(); node.start(task)
//! ```
//!
//! ## Task lifecycle
//! ```text
//! start():  self_barrier.add() ─► tokio::spawn(run)
//! run():    Started ─► task.run(ctx) ─► Finished | Failed
//!           ├─ children non-empty ─► OrphanedChildren ─► OrphanPolicy
//!           ├─ parent.children_barrier.done()
//!           └─ self_barrier.done()
//! ```
//!
//! ## Cancellation
//! ```text
//! cancel():  cancellation lock
//!   ├─ freeze   (structure lock) creation_allowed = false, top-down
//!   ├─ collapse (depth-first)
//!   │    ├─ on_before_close hook
//!   │    ├─ drain children (structure lock)
//!   │    ├─ collapse every drained child
//!   │    ├─ children_barrier.wait()
//!   │    ├─ detach from parent
//!   │    ├─ close signal (once)
//!   │    └─ self_barrier.wait()
//! ```
//!
//! ## Rules
//! - A signal closes only after every descendant task has returned.
//! - An attach either registers and spawns, or spawns nothing.
//! - Nodes frozen by a cancellation never accept children again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tokio_util::sync::CancellationToken;

use crate::core::barrier::Barrier;
use crate::core::config::OrphanPolicy;
use crate::core::context::Context;
use crate::core::tree::{StructureGuard, Tree, lock};
use crate::error::{Error, TaskError, panic_message};
use crate::events::{DebugPath, Event, EventKind};
use crate::tasks::Task;

type Hook = Box<dyn FnOnce() + Send + 'static>;

/// Structural state; only touched while the tree's structure lock is held.
struct Links {
    children: HashMap<u64, Arc<Node>>,
    next_child_id: u64,
    creation_allowed: bool,
}

pub(crate) struct Node {
    id: u64,
    parent: Option<Weak<Node>>,
    tree: Arc<Tree>,
    path: DebugPath,
    links: Mutex<Links>,
    children_barrier: Barrier,
    self_barrier: Barrier,
    signal: CancellationToken,
    closed: AtomicBool,
    on_before_close: Mutex<Option<Hook>>,
}

impl Node {
    fn new(id: u64, parent: Option<Weak<Node>>, tree: Arc<Tree>, path: DebugPath) -> Self {
        Self {
            id,
            parent,
            tree,
            path,
            links: Mutex::new(Links {
                children: HashMap::new(),
                next_child_id: 0,
                creation_allowed: true,
            }),
            children_barrier: Barrier::new(),
            self_barrier: Barrier::new(),
            signal: CancellationToken::new(),
            closed: AtomicBool::new(false),
            on_before_close: Mutex::new(None),
        }
    }

    /// Creates the root node of a new tree and starts `task` on it.
    pub(crate) fn spawn_root(tree: Arc<Tree>, path: DebugPath, task: Box<dyn Task>) -> Arc<Self> {
        let root = Arc::new(Node::new(0, None, tree, path));
        root.start(task);
        root
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn path(&self) -> &DebugPath {
        &self.path
    }

    pub(crate) fn signal(&self) -> &CancellationToken {
        &self.signal
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn emit(&self, event: Event) {
        self.tree.emit(event);
    }

    fn links<'a>(&'a self, _structure: &StructureGuard<'_>) -> MutexGuard<'a, Links> {
        lock(&self.links)
    }

    pub(crate) fn child_count(&self) -> usize {
        let structure = self.tree.lock_structure();
        self.links(&structure).children.len()
    }

    pub(crate) fn set_on_before_close(&self, hook: Hook) {
        *lock(&self.on_before_close) = Some(hook);
    }

    // ---------------------------
    // Attach
    // ---------------------------

    /// Registers a new child running `task`, or rejects it if this node is closing.
    pub(crate) fn attach(
        self: &Arc<Self>,
        task: Box<dyn Task>,
        name: &str,
        component_type: &str,
    ) -> Result<Arc<Node>, Error> {
        let structure = self.tree.lock_structure();
        let mut links = self.links(&structure);

        if !links.creation_allowed {
            drop(links);
            drop(structure);
            self.emit(Event::new(EventKind::AttachRejected, self.path.clone()).with_arg(name));
            return Err(Error::ParentClosing {
                parent: self.path.clone(),
                name: name.to_string(),
            });
        }

        let id = links.next_child_id;
        links.next_child_id += 1;

        let child = Arc::new(Node::new(
            id,
            Some(Arc::downgrade(self)),
            Arc::clone(&self.tree),
            self.path.child(id, name, component_type),
        ));
        // Inherits `creation_allowed == true` from this node.
        links.children.insert(id, Arc::clone(&child));
        self.children_barrier.add();
        child.start(task);

        Ok(child)
    }

    // ---------------------------
    // Task lifecycle
    // ---------------------------

    fn start(self: &Arc<Self>, task: Box<dyn Task>) {
        self.self_barrier.add();
        let node = Arc::clone(self);
        tokio::spawn(node.run(task));
    }

    async fn run(self: Arc<Self>, task: Box<dyn Task>) {
        self.emit(Event::new(EventKind::Started, self.path.clone()));

        let ctx = Context::from_node(Arc::clone(&self));
        let res = std::panic::AssertUnwindSafe(task.run(ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(TaskError::fail(format!(
                    "task panicked: {}",
                    panic_message(&*panic)
                )))
            });
        drop(task);

        match res {
            Ok(()) | Err(TaskError::Canceled) => {
                self.emit(Event::new(EventKind::Finished, self.path.clone()));
            }
            Err(e) => {
                self.emit(Event::new(EventKind::Failed, self.path.clone()).with_arg(e.to_string()));
            }
        }

        let live = self.child_count();
        if live != 0 {
            self.orphaned(live);
        }

        if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
            parent.children_barrier.done();
        }
        self.self_barrier.done();
    }

    fn orphaned(&self, count: usize) {
        let err = Error::OrphanedChildren {
            path: self.path.clone(),
            count,
        };
        self.emit(
            Event::new(EventKind::OrphanedChildren, self.path.clone()).with_arg(count.to_string()),
        );
        tracing::error!(target: "ctxvisor", label = err.as_label(), "{err}");

        match self.tree.orphan_policy() {
            OrphanPolicy::Abort => {
                eprintln!("[ctxvisor] fatal: {err}");
                std::process::abort()
            }
            OrphanPolicy::Report => {}
        }
    }

    // ---------------------------
    // Cancellation
    // ---------------------------

    /// Tears down this node and its subtree; returns once all of it is quiescent.
    pub(crate) async fn cancel(self: Arc<Self>) {
        let _serial = self.tree.lock_cancellation().await;

        {
            let structure = self.tree.lock_structure();
            self.freeze(&structure);
        }

        Arc::clone(&self).collapse().await;
    }

    /// Phase A: forbid new children everywhere in the subtree, parent first.
    fn freeze(&self, structure: &StructureGuard<'_>) {
        let children: Vec<Arc<Node>> = {
            let mut links = self.links(structure);
            links.creation_allowed = false;
            links.children.values().cloned().collect()
        };
        for child in children {
            child.freeze(structure);
        }
    }

    /// Phase B: collapse the subtree, children before their parent.
    fn collapse(self: Arc<Self>) -> BoxFuture<'static, ()> {
        async move {
            // A previous sweep already took this subtree down.
            if self.is_closed() {
                return;
            }
            self.emit(Event::new(EventKind::Closing, self.path.clone()));

            let hook = lock(&self.on_before_close).take();
            if let Some(hook) = hook {
                hook();
            }

            let children: Vec<Arc<Node>> = {
                let structure = self.tree.lock_structure();
                let mut links = self.links(&structure);
                links.children.drain().map(|(_, child)| child).collect()
            };
            join_all(children.into_iter().map(Node::collapse)).await;

            self.children_barrier.wait().await;
            // Leave the parent's map before the task can return, so a parent
            // that waited on this node never observes it as a live child.
            self.detach();
            self.close();
            self.self_barrier.wait().await;
        }
        .boxed()
    }

    /// Closes the signal; later calls are no-ops.
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.signal.cancel();
        self.emit(Event::new(EventKind::SignalClosed, self.path.clone()));
    }

    /// Removes this node from its parent's child map; a no-op once drained.
    fn detach(&self) {
        let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let structure = self.tree.lock_structure();
        // Child ids are never reused, so the id alone identifies this node.
        parent.links(&structure).children.remove(&self.id);
    }

    /// Waits until every child task and then this node's own task have returned.
    pub(crate) async fn wait(&self) {
        self.children_barrier.wait().await;
        self.self_barrier.wait().await;
    }
}
