//! Background polling task for reminders.
//!
//! One tokio task owns a [`ReminderScheduler`]. Every poll interval it reads
//! fresh candidates from the store on the blocking pool (bounded by a
//! timeout), runs one tick and hands fired events to the sink. Failed polls
//! and sink errors are logged and skipped; only the stop signal ends the
//! loop.
//!
//! A store call that times out keeps running on the blocking pool. The
//! runner holds on to it and skips ticks until it finishes, so at most one
//! store call is ever in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::scheduler::ReminderScheduler;
use super::sink::NotificationSink;
use super::source::{ReminderCandidate, ReminderSource};
use crate::clock::Clock;
use crate::error::{CoreError, DatabaseError, Result};
use crate::events::ReminderFired;
use crate::storage::RemindersConfig;

/// Timing knobs for the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub poll_interval: Duration,
    pub cooldown: Duration,
    pub store_timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&RemindersConfig::default())
    }
}

impl From<&RemindersConfig> for RunnerOptions {
    fn from(config: &RemindersConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            cooldown: config.cooldown(),
            store_timeout: config.store_timeout(),
        }
    }
}

/// Owns the background task. Dropping the handle drops the stop sender,
/// which also ends the loop at its next wait.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the loop to exit at its next check.
    pub fn request_stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop the loop and wait for it to finish.
    pub async fn stop(self) {
        self.request_stop();
        if let Err(err) = self.join.await {
            warn!(error = %err, "reminder task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Reminder polling loop wired to its collaborators.
pub struct ReminderRunner {
    scheduler: ReminderScheduler,
    source: Arc<dyn ReminderSource>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    options: RunnerOptions,
    in_flight: Option<JoinHandle<Result<Vec<ReminderCandidate>>>>,
}

impl ReminderRunner {
    pub fn new(
        source: Arc<dyn ReminderSource>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            scheduler: ReminderScheduler::new(options.cooldown),
            source,
            sink,
            clock,
            options,
            in_flight: None,
        }
    }

    /// Start the loop on the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(stop_rx));
        SchedulerHandle { stop_tx, join }
    }

    /// Run until `stop_rx` turns true or its sender is dropped.
    pub async fn run(mut self, mut stop_rx: watch::Receiver<bool>) {
        info!(
            poll_interval_ms = self.options.poll_interval.as_millis() as u64,
            cooldown_secs = self.options.cooldown.as_secs(),
            "reminder scheduler started"
        );

        loop {
            if *stop_rx.borrow() {
                break;
            }

            match self.poll_once().await {
                Ok(fired) => self.deliver(&fired),
                Err(err) => warn!(error = %err, "reminder poll failed; skipping tick"),
            }

            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.options.poll_interval) => {}
            }
        }

        let cooling = self.scheduler.cooling();
        self.scheduler.reset();
        self.in_flight = None;
        info!(cleared = cooling, "reminder scheduler stopped");
    }

    /// Read candidates and run one scheduler tick.
    pub async fn poll_once(&mut self) -> Result<Vec<ReminderFired>> {
        let now = self.clock.now();
        let candidates = self.fetch_candidates(now.date()).await?;
        debug!(candidates = candidates.len(), "reminder tick");
        Ok(self.scheduler.tick(&candidates, now))
    }

    async fn fetch_candidates(
        &mut self,
        today: chrono::NaiveDate,
    ) -> Result<Vec<ReminderCandidate>> {
        if let Some(pending) = self.in_flight.take() {
            if !pending.is_finished() {
                self.in_flight = Some(pending);
                return Err(CoreError::StoreUnavailable(DatabaseError::Busy));
            }
            // Its candidates belong to an earlier tick.
            debug!("discarding late store result");
        }

        let source = Arc::clone(&self.source);
        let mut call = tokio::task::spawn_blocking(move || source.reminder_candidates(today));

        match tokio::time::timeout(self.options.store_timeout, &mut call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(CoreError::StoreUnavailable(DatabaseError::QueryFailed(
                format!("store call panicked: {join_err}"),
            ))),
            Err(_) => {
                self.in_flight = Some(call);
                Err(CoreError::StoreUnavailable(DatabaseError::Timeout {
                    timeout_secs: self.options.store_timeout.as_secs(),
                }))
            }
        }
    }

    fn deliver(&self, fired: &[ReminderFired]) {
        for event in fired {
            info!(habit_id = %event.habit_id, habit = %event.habit_name, "reminder fired");
            if let Err(err) = self.sink.notify(event) {
                warn!(habit_id = %event.habit_id, error = %err, "notification sink failed");
            }
        }
    }
}
