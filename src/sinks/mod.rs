//! # Debug sinks for the ctxvisor runtime.
//!
//! A [`DebugSink`] receives every trace [`Event`](crate::Event) of one tree,
//! synchronously, from whichever task emitted it.
//!
//! ## Architecture
//! ```text
//! Context::log / lifecycle ──► Tree.sink.on_event(&Event)
//!                                     │
//!                    ┌────────────────┼────────────────┬─────────────────┐
//!                    ▼                ▼                ▼                 ▼
//!                NoopSink        ConsoleSink      TracingSink      SubscriberSet
//!                (drop)          (stdout)         (tracing)        (per-subscriber queues)
//!                                                                        │
//!                                                                  Subscribe::on_event()
//! ```
//!
//! Sinks run on the emitting task: implementations must not block. Slow or
//! async consumers belong behind a [`SubscriberSet`].

mod noop;
mod set;
mod sink;
mod subscribe;
mod trace;

#[cfg(feature = "logging")]
mod console;

pub use noop::NoopSink;
pub use set::SubscriberSet;
pub use sink::DebugSink;
pub use subscribe::Subscribe;
pub use trace::TracingSink;

#[cfg(feature = "logging")]
pub use console::ConsoleSink;
