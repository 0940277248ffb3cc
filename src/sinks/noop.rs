use crate::events::Event;
use crate::sinks::DebugSink;

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    #[inline]
    fn on_event(&self, _event: &Event) {}

    fn name(&self) -> &'static str {
        "NoopSink"
    }
}
