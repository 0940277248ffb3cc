//! # Core sink trait
//!
//! `DebugSink` is the single receiver a tree hands its trace events to.

use crate::events::Event;

/// Contract for trace receivers.
///
/// Called synchronously on the task that emitted the event, sometimes while
/// the tree's cancellation sequence is in progress. Implementations should
/// return quickly and never wait on the tree they observe.
pub trait DebugSink: Send + Sync + 'static {
    /// Handle a single event.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
