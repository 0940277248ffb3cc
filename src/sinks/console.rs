//! # ConsoleSink — simple event printer
//!
//! A minimal sink that prints incoming [`Event`]s to stdout, one line each.
//! Use it for debugging or demos.
//!
//! ## Example output
//! ```text
//! 2026-10-19T10:00:00+00:00,root->loop    started
//! 2026-10-19T10:00:01+00:00,root->loop->timer0    tick,1
//! 2026-10-19T10:00:02+00:00,root->loop->timer0    signal-closed
//! 2026-10-19T10:00:02+00:00,root->loop    failed,execution failed: boom
//! ```

use chrono::{DateTime, Local, SecondsFormat};

use crate::events::{Event, EventKind};
use crate::sinks::DebugSink;

/// Stdout sink.
///
/// Enabled via the `logging` feature. Each line is
/// `<rfc3339>,<path joined by "->">    <args joined by ",">`; lifecycle events
/// print their kind label before their arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Construct a new [`ConsoleSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one event as a console line (without the trailing newline).
    pub fn render(e: &Event) -> String {
        let at: DateTime<Local> = e.at.into();
        let mut vars: Vec<&str> = Vec::with_capacity(e.args.len() + 1);
        if e.kind != EventKind::Log {
            vars.push(e.kind.as_label());
        }
        vars.extend(e.args.iter().map(String::as_str));

        format!(
            "{},{}    {}",
            at.to_rfc3339_opts(SecondsFormat::Secs, false),
            e.path,
            vars.join(",")
        )
    }
}

impl DebugSink for ConsoleSink {
    fn on_event(&self, e: &Event) {
        println!("{}", Self::render(e));
    }

    fn name(&self) -> &'static str {
        "ConsoleSink"
    }
}
