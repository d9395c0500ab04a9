use thiserror::Error;
use tokio::sync::mpsc;

use crate::events::ReminderFired;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("notification channel closed")]
    Closed,
    #[error("notification queue full")]
    Full,
    #[error("notification failed: {0}")]
    Failed(String),
}

/// Receives fired reminders. Must not block; the scheduler logs and drops
/// any error it returns.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &ReminderFired) -> Result<(), SinkError>;
}

/// Forwards fired reminders over a bounded channel to the presentation layer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<ReminderFired>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ReminderFired>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, event: &ReminderFired) -> Result<(), SinkError> {
        self.tx.try_send(event.clone()).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Writes fired reminders to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, event: &ReminderFired) -> Result<(), SinkError> {
        tracing::info!(habit_id = %event.habit_id, "{}", event.message());
        Ok(())
    }
}
