//! Time-based habit reminders.
//!
//! - [`ReminderScheduler`]: per-habit Idle/Due/Fired/Cooling bookkeeping,
//!   driven one tick at a time.
//! - [`ReminderRunner`]: the background tokio task that polls the store and
//!   feeds the scheduler.
//! - [`NotificationSink`]: where fired reminders go.

mod runner;
mod scheduler;
mod sink;
mod source;

pub use runner::{ReminderRunner, RunnerOptions, SchedulerHandle};
pub use scheduler::{ReminderPhase, ReminderScheduler};
pub use sink::{ChannelSink, LogSink, NotificationSink, SinkError};
pub use source::{ReminderCandidate, ReminderSource};

/// Store key holding the local time of the most recently delivered reminder.
pub const LAST_FIRED_KEY: &str = "reminders.last_fired";
