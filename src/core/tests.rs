use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::{Config, Context, OrphanPolicy, Root};
use crate::error::{Error, TaskError};
use crate::events::{Event, EventKind};
use crate::sinks::DebugSink;
use crate::tasks::{Task, TaskFn};

const LIMIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    fn count(&self, kind: EventKind, path: &str) -> usize {
        self.of_kind(kind)
            .iter()
            .filter(|e| e.path.to_string() == path)
            .count()
    }
}

impl DebugSink for Recorder {
    fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn recorded_root(policy: OrphanPolicy) -> (Root, Arc<Recorder>) {
    let rec = Arc::new(Recorder::default());
    let cfg = Config {
        orphan_policy: policy,
        ..Config::default()
    };
    let root = Root::builder(cfg).with_sink(rec.clone()).build();
    (root, rec)
}

type Journal = Arc<Mutex<Vec<String>>>;

fn note(journal: &Journal, entry: &str) {
    journal.lock().unwrap().push(entry.to_string());
}

fn idle() -> impl Task {
    TaskFn::new(|ctx: Context| async move {
        ctx.cancelled().await;
        Ok::<(), TaskError>(())
    })
}

/// Waits for its signal, then records its label.
struct Leaf {
    label: &'static str,
    journal: Journal,
}

#[async_trait]
impl Task for Leaf {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        ctx.cancelled().await;
        note(&self.journal, self.label);
        Ok(())
    }
}

/// Attaches one `Leaf` child, reports readiness, waits, records its label.
struct Branch {
    label: &'static str,
    child: &'static str,
    journal: Journal,
    ready: mpsc::UnboundedSender<()>,
    hook: bool,
}

#[async_trait]
impl Task for Branch {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        if self.hook {
            let journal = self.journal.clone();
            ctx.set_on_before_closing(move || note(&journal, "hook"));
        }
        ctx.spawn_child(
            Leaf {
                label: self.child,
                journal: self.journal.clone(),
            },
            self.child,
            "leaf",
        )
        .map_err(|e| TaskError::fail(e.to_string()))?;
        let _ = self.ready.send(());

        ctx.cancelled().await;
        note(&self.journal, self.label);
        Ok(())
    }
}

#[tokio::test]
async fn nested_tree_collapses_leaves_first() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);
    let journal: Journal = Arc::default();
    let (ready, mut ready_rx) = mpsc::unbounded_channel();

    root.spawn_child(
        Branch {
            label: "A",
            child: "B",
            journal: journal.clone(),
            ready,
            hook: false,
        },
        "A",
        "branch",
    )
    .unwrap();
    timeout(LIMIT, ready_rx.recv()).await.unwrap().unwrap();

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");

    assert_eq!(*journal.lock().unwrap(), vec!["B", "A"]);

    // B finished before A's signal closed, A finished before the root's.
    let finished_b = rec
        .of_kind(EventKind::Finished)
        .into_iter()
        .find(|e| e.path.to_string() == "root->A->B")
        .unwrap();
    let closed = rec.of_kind(EventKind::SignalClosed);
    let closed_a = closed.iter().find(|e| e.path.to_string() == "root->A").unwrap();
    let closed_root = closed.iter().find(|e| e.path.to_string() == "root").unwrap();
    assert!(finished_b.seq < closed_a.seq);
    assert!(closed_a.seq < closed_root.seq);
}

#[tokio::test]
async fn before_closing_hook_runs_before_children_close() {
    let root = Root::new();
    let journal: Journal = Arc::default();
    let (ready, mut ready_rx) = mpsc::unbounded_channel();

    let a = root
        .spawn_child(
            Branch {
                label: "A",
                child: "B",
                journal: journal.clone(),
                ready,
                hook: true,
            },
            "A",
            "branch",
        )
        .unwrap();
    timeout(LIMIT, ready_rx.recv()).await.unwrap().unwrap();

    a.cancel();
    timeout(LIMIT, a.wait()).await.expect("subtree drained");
    assert_eq!(*journal.lock().unwrap(), vec!["hook", "B", "A"]);

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
}

/// Builds a `width`-ary subtree of the given depth below itself.
struct Fanout {
    depth: usize,
    width: usize,
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

#[async_trait]
impl Task for Fanout {
    async fn run(&self, ctx: Context) -> Result<(), TaskError> {
        if self.depth > 1 {
            for i in 0..self.width {
                ctx.spawn_child(
                    Fanout {
                        depth: self.depth - 1,
                        width: self.width,
                        started: self.started.clone(),
                        finished: self.finished.clone(),
                    },
                    &format!("n{i}"),
                    "fanout",
                )
                .map_err(|e| TaskError::fail(e.to_string()))?;
            }
        }
        self.started.fetch_add(1, Ordering::SeqCst);
        ctx.cancelled().await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_task_returns_once_and_every_signal_closes_once() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    // 3 + 9 + 27 nodes below the root.
    for i in 0..3 {
        root.spawn_child(
            Fanout {
                depth: 3,
                width: 3,
                started: started.clone(),
                finished: finished.clone(),
            },
            &format!("top{i}"),
            "fanout",
        )
        .unwrap();
    }
    timeout(LIMIT, async {
        while started.load(Ordering::SeqCst) < 39 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("all nodes started");

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");

    assert_eq!(finished.load(Ordering::SeqCst), 39);
    assert_eq!(rec.of_kind(EventKind::Started).len(), 40);
    assert_eq!(rec.of_kind(EventKind::Finished).len(), 40);

    let closed = rec.of_kind(EventKind::SignalClosed);
    assert_eq!(closed.len(), 40);
    let mut paths: Vec<String> = closed.iter().map(|e| e.path.to_string()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 40, "a signal closed twice");
    assert!(rec.of_kind(EventKind::OrphanedChildren).is_empty());
}

#[tokio::test]
async fn attach_to_closing_parent_is_rejected() {
    let root = Root::new();
    let ran = Arc::new(AtomicUsize::new(0));
    let a = root.spawn_child(idle(), "A", "idle").unwrap();

    a.cancel();
    timeout(LIMIT, a.wait()).await.expect("A drained");

    let counter = ran.clone();
    let res = a.spawn_child(
        TaskFn::new(move |_ctx: Context| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), TaskError>(())
            }
        }),
        "late",
        "idle",
    );
    match res {
        Err(Error::ParentClosing { parent, name }) => {
            assert_eq!(parent.to_string(), "root->A");
            assert_eq!(name, "late");
        }
        other => panic!("expected ParentClosing, got {other:?}"),
    }

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
    assert!(matches!(
        root.spawn_child(idle(), "after", "idle"),
        Err(Error::ParentClosing { .. })
    ));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);
    let a = root.spawn_child(idle(), "A", "idle").unwrap();

    a.cancel();
    a.cancel();
    timeout(LIMIT, a.wait()).await.expect("A drained");
    a.cancel();

    root.cancel();
    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
    root.cancel();
    // Let the trailing no-op cancellations run.
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(a.is_closed());
    assert_eq!(rec.count(EventKind::SignalClosed, "root->A"), 1);
    assert_eq!(rec.count(EventKind::SignalClosed, "root"), 1);
    assert_eq!(rec.count(EventKind::Closing, "root->A"), 1);
    assert_eq!(rec.count(EventKind::Closing, "root"), 1);
    assert_eq!(rec.count(EventKind::Finished, "root->A"), 1);
}

#[tokio::test]
async fn returning_with_live_children_reaches_orphan_path() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);

    root.spawn_child(
        TaskFn::new(|ctx: Context| async move {
            ctx.spawn_child(idle(), "B", "idle")
                .map_err(|e| TaskError::fail(e.to_string()))?;
            // Returns without cancelling B.
            Ok::<(), TaskError>(())
        }),
        "A",
        "careless",
    )
    .unwrap();

    timeout(LIMIT, async {
        while rec.of_kind(EventKind::OrphanedChildren).is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("violation reported");

    let violation = &rec.of_kind(EventKind::OrphanedChildren)[0];
    assert_eq!(violation.path.to_string(), "root->A");
    assert_eq!(&*violation.args, ["1".to_string()]);

    // The orphan is still torn down by the next sweep.
    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
    assert_eq!(rec.count(EventKind::Finished, "root->A->B"), 1);
}

#[tokio::test]
async fn task_may_finish_early_by_cancelling_itself() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);

    let a = root
        .spawn_child(
            TaskFn::new(|ctx: Context| async move {
                ctx.spawn_child(idle(), "B", "idle")
                    .map_err(|e| TaskError::fail(e.to_string()))?;
                ctx.cancel();
                ctx.cancelled().await;
                assert_eq!(ctx.child_count(), 0);
                Ok::<(), TaskError>(())
            }),
            "A",
            "oneshot",
        )
        .unwrap();

    timeout(LIMIT, a.wait()).await.expect("A finished");
    timeout(LIMIT, async {
        while root.context().child_count() != 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("A detached from root");

    assert!(rec.of_kind(EventKind::OrphanedChildren).is_empty());
    assert_eq!(rec.count(EventKind::Finished, "root->A->B"), 1);

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
}

/// Spawns B, cancels it, waits for it and returns.
fn tears_down_its_child() -> impl Task {
    TaskFn::new(|ctx: Context| async move {
        let b = ctx
            .spawn_child(idle(), "B", "idle")
            .map_err(|e| TaskError::fail(e.to_string()))?;
        b.cancel();
        b.wait().await;
        if ctx.child_count() != 0 {
            return Err(TaskError::fail("B still attached after wait"));
        }
        Ok::<(), TaskError>(())
    })
}

async fn cancel_wait_return_rounds(rounds: usize) {
    let (root, rec) = recorded_root(OrphanPolicy::Report);

    for i in 0..rounds {
        let a = root
            .spawn_child(tears_down_its_child(), &format!("A{i}"), "owner")
            .unwrap();
        timeout(LIMIT, a.wait()).await.expect("A finished");
    }

    assert!(rec.of_kind(EventKind::OrphanedChildren).is_empty());
    assert!(rec.of_kind(EventKind::Failed).is_empty());
    assert_eq!(rec.of_kind(EventKind::Finished).len(), rounds * 2);

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiting_on_a_cancelled_child_then_returning_is_clean() {
    cancel_wait_return_rounds(200).await;
}

#[tokio::test]
async fn waiting_on_a_cancelled_child_then_returning_is_clean_single_thread() {
    cancel_wait_return_rounds(50).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_attach_and_cancel_loses_nothing() {
    let root = Root::new();
    let parent = root.spawn_child(idle(), "P", "idle").unwrap();
    let ran = Arc::new(AtomicUsize::new(0));
    let exited = Arc::new(AtomicUsize::new(0));

    let mut attempts = Vec::new();
    for i in 0..64 {
        let p = parent.clone();
        let ran = ran.clone();
        let exited = exited.clone();
        attempts.push(tokio::spawn(async move {
            if i % 8 == 0 {
                tokio::task::yield_now().await;
            }
            let task = TaskFn::new(move |ctx: Context| {
                let ran = ran.clone();
                let exited = exited.clone();
                async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                    ctx.cancelled().await;
                    exited.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), TaskError>(())
                }
            });
            p.spawn_child(task, &format!("c{i}"), "worker")
        }));
        if i == 32 {
            parent.cancel();
        }
    }

    let mut accepted = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(Error::ParentClosing { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    timeout(LIMIT, parent.wait()).await.expect("P drained");
    assert_eq!(ran.load(Ordering::SeqCst), accepted);
    assert_eq!(exited.load(Ordering::SeqCst), accepted);

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
}

#[tokio::test]
async fn failing_and_panicking_tasks_are_traced_and_drained() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);

    root.spawn_child(
        TaskFn::new(|_ctx: Context| async move { Err::<(), _>(TaskError::fail("boom")) }),
        "failing",
        "worker",
    )
    .unwrap();
    root.spawn_child(
        TaskFn::new(|_ctx: Context| async move {
            if true {
                panic!("kaput");
            }
            Ok::<(), TaskError>(())
        }),
        "panicking",
        "worker",
    )
    .unwrap();

    timeout(LIMIT, async {
        while rec.of_kind(EventKind::Failed).len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("failures traced");

    let failed = rec.of_kind(EventKind::Failed);
    let text = |path: &str| {
        failed
            .iter()
            .find(|e| e.path.to_string() == path)
            .map(|e| e.args.join(","))
            .unwrap()
    };
    assert!(text("root->failing").contains("boom"));
    assert!(text("root->panicking").contains("kaput"));

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
}

#[tokio::test]
async fn log_events_carry_the_node_path() {
    let (root, rec) = recorded_root(OrphanPolicy::Report);
    root.log(&[&"hello", &1]);

    let worker = root.spawn_child(idle(), "worker", "idle").unwrap();
    worker.log(&[&"tick"]);
    assert_eq!(worker.id(), 0);
    assert_eq!(worker.path().depth(), 1);
    assert_eq!(&*worker.path().leaf().component_type, "idle");

    let logs = rec.of_kind(EventKind::Log);
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].path.to_string(), "root");
    assert_eq!(&*logs[0].args, ["hello".to_string(), "1".to_string()]);
    assert_eq!(logs[1].path.to_string(), "root->worker");

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
}

#[tokio::test]
async fn sibling_ids_increase_monotonically() {
    let root = Root::new();
    let ids: Vec<u64> = (0..4)
        .map(|i| root.spawn_child(idle(), &format!("w{i}"), "idle").unwrap().id())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(root.context().child_count(), 4);

    root.cancel();
    timeout(LIMIT, root.wait()).await.expect("tree drained");
    assert_eq!(root.context().child_count(), 0);
}
