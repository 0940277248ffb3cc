//! # Per-root shared state.
//!
//! One [`Tree`] is shared (via `Arc`) by every node descending from a root.
//!
//! ## Locks
//! ```text
//! structure     std Mutex    every read/write of a node's child map and
//!                            creation flag; never held across an await
//! cancellation  tokio Mutex  one cancel() sequence at a time, held for the
//!                            whole freeze + collapse
//! ```
//! Lock order is `cancellation` → `structure` → per-node links.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::config::OrphanPolicy;
use crate::events::Event;
use crate::sinks::DebugSink;

/// Proof that the structural lock is held.
pub(crate) struct StructureGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

pub(crate) struct Tree {
    structure: Mutex<()>,
    cancellation: tokio::sync::Mutex<()>,
    sink: Arc<dyn DebugSink>,
    orphan_policy: OrphanPolicy,
}

impl Tree {
    pub(crate) fn new(sink: Arc<dyn DebugSink>, orphan_policy: OrphanPolicy) -> Arc<Self> {
        Arc::new(Self {
            structure: Mutex::new(()),
            cancellation: tokio::sync::Mutex::new(()),
            sink,
            orphan_policy,
        })
    }

    pub(crate) fn lock_structure(&self) -> StructureGuard<'_> {
        StructureGuard {
            _guard: lock(&self.structure),
        }
    }

    pub(crate) async fn lock_cancellation(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.cancellation.lock().await
    }

    pub(crate) fn emit(&self, event: Event) {
        self.sink.on_event(&event);
    }

    pub(crate) fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }
}

/// Locks a std mutex, ignoring poisoning.
///
/// Every critical section in this crate leaves the data consistent before it
/// can panic, so a poisoned lock carries no torn state.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
