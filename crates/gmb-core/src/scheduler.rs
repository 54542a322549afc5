//! Fixed-rate periodic scheduler.
//!
//! A job fires at `origin + first + n * interval` on tokio's monotonic clock.
//! If a tick runs past later slots, those slots are dropped rather than
//! replayed, so a job never fires twice for one slot and never bursts. Nothing
//! is persisted: a restart begins a fresh schedule.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::messaging::types::Tick;

pub const RULES_JOB: &str = "rules-broadcast";
const RULES_FIRST: Duration = Duration::from_secs(10);
const RULES_INTERVAL: Duration = Duration::from_secs(48 * 60 * 60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeatingJob {
    pub name: String,
    /// Delay before slot 0.
    pub first: Duration,
    pub interval: Duration,
}

impl RepeatingJob {
    pub fn new(name: impl Into<String>, first: Duration, interval: Duration) -> Self {
        Self {
            name: name.into(),
            first,
            interval,
        }
    }

    /// Rules broadcast: 10s after startup, then every 48h.
    pub fn rules() -> Self {
        Self::new(RULES_JOB, RULES_FIRST, RULES_INTERVAL)
    }

    /// Offset of `slot` from the scheduler origin.
    pub fn due_offset(&self, slot: u64) -> Duration {
        let nanos = self.interval.as_nanos().saturating_mul(slot as u128);
        self.first
            .saturating_add(Duration::from_nanos(nanos.min(u64::MAX as u128) as u64))
    }

    /// First slot after `fired` that is not already overdue at `elapsed`.
    pub fn next_slot(&self, elapsed: Duration, fired: u64) -> u64 {
        let Some(since_first) = elapsed.checked_sub(self.first) else {
            return fired + 1;
        };
        let interval = self.interval.as_nanos().max(1);
        let on_time = since_first.as_nanos().div_ceil(interval);
        let on_time = u64::try_from(on_time).unwrap_or(u64::MAX);
        on_time.max(fired + 1)
    }
}

#[derive(Default)]
enum SchedulerState {
    #[default]
    Idle,
    Running {
        job: RepeatingJob,
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// Owns a single repeating job.
#[derive(Clone, Default)]
pub struct PeriodicScheduler {
    state: Arc<Mutex<SchedulerState>>,
}

impl PeriodicScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `job`. Returns `false` (and changes nothing) if a job is already running.
    pub async fn start<F, Fut>(&self, job: RepeatingJob, on_tick: F) -> bool
    where
        F: Fn(Tick) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut st = self.state.lock().await;
        if let SchedulerState::Running { job: running, .. } = &*st {
            tracing::warn!(job = %running.name, "scheduler already running; ignoring start");
            return false;
        }

        let origin = Instant::now();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(job_loop(job.clone(), origin, on_tick, cancel.clone()));
        tracing::info!(
            job = %job.name,
            first_secs = job.first.as_secs(),
            interval_secs = job.interval.as_secs(),
            "scheduler started"
        );
        *st = SchedulerState::Running {
            job,
            cancel,
            handle,
        };
        true
    }

    #[cfg(test)]
    async fn is_running(&self) -> bool {
        matches!(&*self.state.lock().await, SchedulerState::Running { .. })
    }

    /// Stop waiting for further ticks. A tick already in flight is allowed to finish.
    pub async fn shutdown(&self) {
        let st = std::mem::take(&mut *self.state.lock().await);
        if let SchedulerState::Running {
            job,
            cancel,
            handle,
        } = st
        {
            cancel.cancel();
            let _ = handle.await;
            tracing::info!(job = %job.name, "scheduler stopped");
        }
    }
}

async fn job_loop<F, Fut>(job: RepeatingJob, origin: Instant, on_tick: F, cancel: CancellationToken)
where
    F: Fn(Tick) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut slot = 0u64;
    loop {
        let due = origin + job.due_offset(slot);
        log_next_run(&job, slot, due);

        // Cancellation wins when the slot is also due.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep_until(due) => {}
        }

        tracing::debug!(job = %job.name, slot, "tick");
        on_tick(Tick {
            job: job.name.clone(),
            seq: slot,
        })
        .await;

        let next = job.next_slot(origin.elapsed(), slot);
        if next > slot + 1 {
            tracing::warn!(
                job = %job.name,
                dropped = next - slot - 1,
                "tick overran later slots; dropping them"
            );
        }
        slot = next;
    }
}

fn log_next_run(job: &RepeatingJob, slot: u64, due: Instant) {
    let wait = due.saturating_duration_since(Instant::now());
    let at = chrono::TimeDelta::from_std(wait)
        .ok()
        .and_then(|d| chrono::Local::now().checked_add_signed(d));
    match at {
        Some(at) => tracing::info!(
            job = %job.name,
            slot,
            "next run at {}",
            at.format("%Y-%m-%d %H:%M:%S")
        ),
        None => tracing::info!(job = %job.name, slot, "next run in {}s", wait.as_secs()),
    }
}
