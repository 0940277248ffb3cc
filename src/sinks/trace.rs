//! # TracingSink — forward events to `tracing`
//!
//! Emits each event as a `tracing` event under the `ctxvisor` target, so trees
//! show up in whatever subscriber the embedding program installed.
//! Failures and orphan violations are logged at `WARN`/`ERROR`, everything
//! else at `DEBUG`.

use crate::events::{Event, EventKind};
use crate::sinks::DebugSink;

/// Sink backed by the `tracing` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn on_event(&self, e: &Event) {
        let args = e.args.join(",");
        match e.kind {
            EventKind::OrphanedChildren => tracing::error!(
                target: "ctxvisor",
                seq = e.seq,
                path = %e.path,
                children = %args,
                "task returned with live children"
            ),
            EventKind::Failed => tracing::warn!(
                target: "ctxvisor",
                seq = e.seq,
                path = %e.path,
                error = %args,
                "task failed"
            ),
            kind => tracing::debug!(
                target: "ctxvisor",
                seq = e.seq,
                path = %e.path,
                kind = kind.as_label(),
                args = %args,
            ),
        }
    }

    fn name(&self) -> &'static str {
        "TracingSink"
    }
}
