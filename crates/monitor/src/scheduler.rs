//! Periodic task runner with explicit "tick now" and "cancel" controls.
//!
//! A [`Scheduler`] owns one spawned loop that runs its task on every
//! period and whenever [`SchedulerHandle::tick_now`] is called. Runs never
//! overlap: a tick requested while the task is running is performed right
//! after it. Tests drive the loop with paused tokio time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Cloneable control handle for a running [`Scheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    wake: Arc<Notify>,
    cancel: CancellationToken,
}

impl SchedulerHandle {
    /// Run the task as soon as possible and restart the period from there.
    pub fn tick_now(&self) {
        self.wake.notify_one();
    }

    /// Stop the loop. An in-progress run finishes first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub struct Scheduler {
    name: &'static str,
    handle: SchedulerHandle,
    task: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn a loop that runs `task` immediately, then every `period`.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_token(name, period, CancellationToken::new(), task)
    }

    /// Like [`Scheduler::spawn`], stopping when `cancel` (or a parent of
    /// it) is cancelled.
    pub fn spawn_with_token<F, Fut>(
        name: &'static str,
        period: Duration,
        cancel: CancellationToken,
        mut task: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = SchedulerHandle {
            wake: Arc::new(Notify::new()),
            cancel,
        };
        let wake = Arc::clone(&handle.wake);
        let cancel = handle.cancel.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(scheduler = name, period_secs = period.as_secs(), "Scheduler started");

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = wake.notified() => {
                        tracing::trace!(scheduler = name, "Manual tick");
                        interval.reset();
                    }
                    _ = interval.tick() => {}
                }
                task().await;
            }

            tracing::debug!(scheduler = name, "Scheduler stopped");
        });

        Self { name, handle, task }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.handle.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(scheduler = self.name, error = %e, "Scheduler task failed");
        }
    }
}
