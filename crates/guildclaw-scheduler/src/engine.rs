//! Scheduler engine — one generation-checked loop per subsystem.
//!
//! Every `restart` supersedes the running loop wholesale: a fresh
//! generation id, a fresh cancellation token, a queue rebuilt from the
//! new record snapshot. The old loop observes its own supersession
//! (token cancelled, or generation counter moved on) and exits without
//! firing anything further. The generation counter is re-checked after
//! every await and before every side effect, which closes the TOCTOU
//! window where a superseded loop could fire after its successor
//! already started.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use guildclaw_core::config::SchedulerConfig;
use guildclaw_core::types::{Record, Subsystem};
use guildclaw_core::{Notifier, RecordStore, Result};
use tokio_util::sync::CancellationToken;

use crate::derive;
use crate::queue::EventQueue;
use crate::recurrence;

/// Restart/stop control surface for one subsystem's scheduler.
///
/// `restart` and `stop` are safe to call from any task; the loop
/// itself runs on its own spawned task. Both must be called from
/// within a Tokio runtime.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    subsystem: Subsystem,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    callback_timeout: Duration,
    /// Monotonic generation counter; the highest value is the only
    /// generation allowed to produce side effects.
    generation: AtomicU64,
    stopped: AtomicBool,
    /// Token of the current generation. The lock serializes
    /// restart/stop so token replacement order matches generation
    /// order; it is never held across an await.
    current: Mutex<Option<CancellationToken>>,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        !self.stopped.load(Ordering::SeqCst)
            && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl Scheduler {
    pub fn new(
        subsystem: Subsystem,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                subsystem,
                store,
                notifier,
                callback_timeout: Duration::from_secs(config.callback_timeout_secs),
                generation: AtomicU64::new(0),
                stopped: AtomicBool::new(false),
                current: Mutex::new(None),
            }),
        }
    }

    pub fn subsystem(&self) -> Subsystem {
        self.inner.subsystem
    }

    /// Take a fresh snapshot from the record store and restart from
    /// it. This is the "on process ready" entry point and the usual
    /// follow-up after a chat command mutated the store.
    pub async fn restart_from_store(&self) -> Result<()> {
        let records = self.inner.store.list().await?;
        self.restart(records);
        Ok(())
    }

    /// Supersede any running generation with a new one scheduling
    /// `records`. Never blocks on an in-flight callback; under
    /// concurrent calls the last one wins.
    pub fn restart(&self, records: Vec<Record>) {
        let inner = Arc::clone(&self.inner);
        let token = CancellationToken::new();

        let generation = {
            let mut current = self
                .inner
                .current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if self.inner.stopped.load(Ordering::SeqCst) {
                tracing::debug!("[{}] restart ignored, scheduler stopped", self.inner.subsystem);
                return;
            }
            // Bumping the counter under the lock keeps token
            // replacement in generation order.
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
            generation
        };

        tracing::info!(
            "[{}] restart: generation {generation}, {} record(s)",
            self.inner.subsystem,
            records.len()
        );
        tokio::spawn(run_generation(inner, generation, token, records));
    }

    /// Terminate scheduling permanently. Idempotent.
    pub fn stop(&self) {
        let mut current = self
            .inner
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        // Move the counter past every live loop as well; belt and
        // braces with the token cancel.
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = current.take() {
            token.cancel();
        }
        tracing::info!("[{}] stopped", self.inner.subsystem);
    }
}

/// One generation of the loop: derive, then wait/fire until the queue
/// drains or a newer generation takes over.
async fn run_generation(
    inner: Arc<Inner>,
    generation: u64,
    token: CancellationToken,
    records: Vec<Record>,
) {
    let batch = derive::derive_events(inner.subsystem, &records, Utc::now());
    let mut queue = EventQueue::rebuild(batch);
    tracing::debug!(
        "[{}] generation {generation}: {} event(s) queued",
        inner.subsystem,
        queue.len()
    );

    loop {
        if !inner.is_current(generation) {
            return;
        }

        let due_at = match queue.peek() {
            Some(event) => event.due_at,
            None => {
                // Nothing pending — park until superseded. No
                // busy-poll; only restart/stop wake us, and then
                // only to exit.
                tracing::debug!("[{}] generation {generation}: queue empty, parked", inner.subsystem);
                token.cancelled().await;
                return;
            }
        };

        let sleep_for = (due_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(sleep_for) => {}
        }

        // Timer elapsed, but a restart may have landed while we
        // slept; re-check before popping or firing anything.
        if !inner.is_current(generation) {
            return;
        }

        let event = match queue.pop() {
            Ok(event) => event,
            Err(_) => continue,
        };

        tracing::info!(
            "[{}] firing {} for {}",
            inner.subsystem,
            event.kind,
            event.record.label()
        );

        let outcome = tokio::time::timeout(
            inner.callback_timeout,
            inner.notifier.handle(event.kind, &event.record),
        )
        .await;

        match outcome {
            Err(_) => {
                tracing::warn!(
                    "⚠️ [{}] {} handler timed out after {:?}",
                    inner.subsystem,
                    event.kind,
                    inner.callback_timeout
                );
            }
            Ok(Err(e)) => {
                // Recoverable: log and move on. The one-shot record
                // is kept so a later restart can re-derive it.
                tracing::warn!("⚠️ [{}] {} handler failed: {e}", inner.subsystem, event.kind);
            }
            Ok(Ok(())) => {
                if event.kind.consumes_record() {
                    // The firing was ours; consuming the record
                    // completes it even if a restart raced the
                    // callback. An elapsed edge is never re-derived,
                    // so this cannot double-fire.
                    if let Err(e) = inner.store.delete(event.record.id()).await {
                        tracing::warn!(
                            "⚠️ [{}] could not delete consumed record {}: {e}",
                            inner.subsystem,
                            event.record.id()
                        );
                    }
                }
            }
        }

        if let Some(rule) = event.kind.recurrence() {
            let next = recurrence::next_occurrence(rule, event.due_at, &event.record, Utc::now());
            tracing::debug!("[{}] {} requeued for {next}", inner.subsystem, event.kind);
            queue.insert(next, event.kind, Arc::clone(&event.record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use guildclaw_core::types::{AbsenceRecord, EventKind};
    use guildclaw_core::GuildclawError;
    use guildclaw_store::memory::MemoryStore;

    /// Records every firing; optionally fails or hangs a configured
    /// kind.
    struct RecordingNotifier {
        fired: Mutex<Vec<(EventKind, String)>>,
        fail_kind: Option<EventKind>,
        hang_kind: Option<EventKind>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fired: Mutex::new(Vec::new()),
                fail_kind: None,
                hang_kind: None,
            })
        }

        fn failing(kind: EventKind) -> Arc<Self> {
            Arc::new(Self {
                fired: Mutex::new(Vec::new()),
                fail_kind: Some(kind),
                hang_kind: None,
            })
        }

        fn hanging(kind: EventKind) -> Arc<Self> {
            Arc::new(Self {
                fired: Mutex::new(Vec::new()),
                fail_kind: None,
                hang_kind: Some(kind),
            })
        }

        fn fired(&self) -> Vec<(EventKind, String)> {
            self.fired.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn handle(&self, kind: EventKind, record: &Record) -> Result<()> {
            self.fired.lock().unwrap().push((kind, record.id().to_string()));
            if self.hang_kind == Some(kind) {
                // Far past any callback timeout a test configures.
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.fail_kind == Some(kind) {
                return Err(GuildclawError::notify("simulated failure"));
            }
            Ok(())
        }
    }

    fn absence_in(start_ms: i64, end_ms: i64) -> Record {
        let now = Utc::now();
        Record::Absence(AbsenceRecord::new(
            "42",
            "Mira",
            now + ChronoDuration::milliseconds(start_ms),
            now + ChronoDuration::milliseconds(end_ms),
        ))
    }

    fn scheduler(
        subsystem: Subsystem,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    ) -> Scheduler {
        Scheduler::new(subsystem, store, notifier, &SchedulerConfig::default())
    }

    #[tokio::test]
    async fn test_absence_scenario_fires_in_order() {
        let record = absence_in(100, 250);
        let id = record.id().to_string();
        let store = Arc::new(MemoryStore::with_records(Subsystem::Absence, vec![record]));
        let notifier = RecordingNotifier::new();
        let sched = scheduler(Subsystem::Absence, Arc::clone(&store), Arc::clone(&notifier));

        sched.restart_from_store().await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        let fired = notifier.fired();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0], (EventKind::AbsenceStart, id.clone()));
        assert_eq!(fired[1], (EventKind::AbsenceEnd, id.clone()));
        // The closing edge consumed the backing record.
        assert!(store.list().await.unwrap().is_empty());

        // Queue drained; the loop parks and nothing more fires.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notifier.fired().len(), 2);
        sched.stop();
    }

    #[tokio::test]
    async fn test_restart_supersedes_pending_event() {
        let store = Arc::new(MemoryStore::with_records(
            Subsystem::Absence,
            vec![absence_in(400, 800)],
        ));
        let notifier = RecordingNotifier::new();
        let sched = scheduler(Subsystem::Absence, store, Arc::clone(&notifier));

        sched.restart_from_store().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Replace the record set before anything came due.
        sched.restart(Vec::new());
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert!(notifier.fired().is_empty());
        sched.stop();
    }

    #[tokio::test]
    async fn test_concurrent_restarts_leave_one_generation() {
        let store = Arc::new(MemoryStore::new(Subsystem::Absence));
        let notifier = RecordingNotifier::new();
        let sched = scheduler(Subsystem::Absence, store, Arc::clone(&notifier));

        let set_a = vec![absence_in(150, 5_000)];
        let set_b = vec![absence_in(150, 5_000)];
        let id_a = set_a[0].id().to_string();
        let id_b = set_b[0].id().to_string();

        let s1 = sched.clone();
        let s2 = sched.clone();
        let t1 = tokio::spawn(async move { s1.restart(set_a) });
        let t2 = tokio::spawn(async move { s2.restart(set_b) });
        t1.await.unwrap();
        t2.await.unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        // Exactly one generation survived; the abandoned one never
        // reached the notifier.
        let fired = notifier.fired();
        assert_eq!(fired.len(), 1);
        let winner = &fired[0].1;
        assert!(winner == &id_a || winner == &id_b);
        sched.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_final() {
        let store = Arc::new(MemoryStore::with_records(
            Subsystem::Absence,
            vec![absence_in(100, 200)],
        ));
        let notifier = RecordingNotifier::new();
        let sched = scheduler(Subsystem::Absence, store, Arc::clone(&notifier));

        sched.restart_from_store().await.unwrap();
        sched.stop();
        sched.stop();

        // Restart after stop is a no-op.
        sched.restart(vec![absence_in(50, 100)]);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(notifier.fired().is_empty());
    }

    #[tokio::test]
    async fn test_callback_failure_keeps_record_and_loop() {
        let record = absence_in(100, 250);
        let store = Arc::new(MemoryStore::with_records(Subsystem::Absence, vec![record]));
        let notifier = RecordingNotifier::failing(EventKind::AbsenceEnd);
        let sched = scheduler(Subsystem::Absence, Arc::clone(&store), Arc::clone(&notifier));

        sched.restart_from_store().await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;

        // Both edges were attempted; the failing end did not kill
        // the loop.
        let fired = notifier.fired();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[1].0, EventKind::AbsenceEnd);

        // Delete only on confirmed success: the record is still there
        // for the next restart to re-derive.
        assert_eq!(store.list().await.unwrap().len(), 1);
        sched.stop();
    }

    #[tokio::test]
    async fn test_callback_timeout_does_not_stall_loop() {
        let record = absence_in(100, 300);
        let id = record.id().to_string();
        let store = Arc::new(MemoryStore::with_records(Subsystem::Absence, vec![record]));
        let notifier = RecordingNotifier::hanging(EventKind::AbsenceStart);
        let sched = Scheduler::new(
            Subsystem::Absence,
            Arc::clone(&store) as Arc<dyn RecordStore>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            &SchedulerConfig { callback_timeout_secs: 1 },
        );

        sched.restart_from_store().await.unwrap();
        // Start hangs at ~100ms and is cut off at ~1.1s; the overdue
        // end edge must still fire afterwards.
        tokio::time::sleep(Duration::from_millis(1700)).await;

        let fired = notifier.fired();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0], (EventKind::AbsenceStart, id.clone()));
        assert_eq!(fired[1], (EventKind::AbsenceEnd, id));
        sched.stop();
    }

    #[tokio::test]
    async fn test_callback_timeout_keeps_record() {
        let record = absence_in(100, 300);
        let store = Arc::new(MemoryStore::with_records(Subsystem::Absence, vec![record]));
        let notifier = RecordingNotifier::hanging(EventKind::AbsenceEnd);
        let sched = Scheduler::new(
            Subsystem::Absence,
            Arc::clone(&store) as Arc<dyn RecordStore>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            &SchedulerConfig { callback_timeout_secs: 1 },
        );

        sched.restart_from_store().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1700)).await;

        // The closing edge was attempted but timed out; a timeout is
        // not a success, so the record survives for the next restart.
        let fired = notifier.fired();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[1].0, EventKind::AbsenceEnd);
        assert_eq!(store.list().await.unwrap().len(), 1);
        sched.stop();
    }
}
