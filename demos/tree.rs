//! # Example: tree
//!
//! Builds a small supervision tree and tears it down.
//!
//! Shows how to:
//! - Attach nested contexts (an event loop owning interval timers)
//! - Finish a node early by cancelling itself (a deadline timer)
//! - Cancel the whole tree and wait for it, leaves first
//!
//! ## Flow
//! ```text
//! root
//!   └─► eventLoop
//!         ├─► timer0   ticks every 100ms until cancelled
//!         ├─► timer1   ticks every 150ms until cancelled
//!         └─► deadline cancels itself after 250ms
//!
//! after 600ms: root.cancel() ─► timers close ─► eventLoop closes ─► root closes
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example tree
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ctxvisor::{Config, ConsoleSink, Context, Root, Task, TaskError};

/// Logs a tick at a fixed period until its signal fires.
struct Interval {
    period: Duration,
}

#[async_trait]
impl Task for Interval {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        let mut ticker = tokio::time::interval(self.period);
        let mut n = 0u64;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    n += 1;
                    ctx.log(&[&"tick", &n]);
                }
            }
        }
    }
}

/// Requests its own teardown once `after` has elapsed.
struct Deadline {
    after: Duration,
}

#[async_trait]
impl Task for Deadline {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        tokio::select! {
            _ = ctx.cancelled() => return Ok(()),
            _ = tokio::time::sleep(self.after) => {
                ctx.log(&[&"deadline reached"]);
                ctx.cancel();
            }
        }
        ctx.cancelled().await;
        Ok(())
    }
}

/// Owns the timers; stays up until cancelled.
struct EventLoop;

#[async_trait]
impl Task for EventLoop {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        ctx.set_on_before_closing({
            let ctx = ctx.clone();
            move || ctx.log(&[&"closing timers"])
        });

        let timers = [
            ("timer0", Duration::from_millis(100)),
            ("timer1", Duration::from_millis(150)),
        ];
        for (name, period) in timers {
            ctx.spawn_child(Interval { period }, name, "intervalTimer")
                .map_err(|e| TaskError::fail(e.to_string()))?;
        }
        ctx.spawn_child(
            Deadline {
                after: Duration::from_millis(250),
            },
            "deadline",
            "timeout",
        )
        .map_err(|e| TaskError::fail(e.to_string()))?;

        ctx.cancelled().await;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== tree example ===\n");

    let root = Root::builder(Config::default())
        .with_sink(Arc::new(ConsoleSink::new()))
        .build();

    root.spawn_child(EventLoop, "eventLoop", "eventLoop")?;

    tokio::time::sleep(Duration::from_millis(600)).await;
    root.log(&[&"cancelling tree"]);
    root.cancel();
    root.wait().await;

    println!("\n=== example completed successfully ===");
    Ok(())
}
