//! # Habitloop Core Library
//!
//! Core logic for the habitloop habit tracker. Every operation is available
//! through the standalone `habitloop` CLI, which is a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Habits**: habit definitions, categories and completion records
//! - **Stats**: pure streak, weekly progress, level and activity functions
//!   that recompute derived state from stored completions on every call
//! - **Storage**: SQLite persistence and TOML-based configuration
//! - **Reminders**: a background polling task that fires each reminder at
//!   most once per due minute
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: the service presentation layers call into
//! - [`HabitDb`]: habit, category and completion persistence
//! - [`ReminderRunner`]: reminder polling loop
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod habit;
pub mod reminder;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::ReminderFired;
pub use habit::{Category, CompletionRecord, Habit, HabitDraft, HabitId, TimeOfDay};
pub use reminder::{
    ChannelSink, LogSink, NotificationSink, ReminderRunner, ReminderScheduler, RunnerOptions,
    SchedulerHandle,
};
pub use stats::{CategoryCount, CategoryPerformance, DayActivity, LevelState, Summary, WeeklyProgress};
pub use storage::{Config, HabitDb};
pub use tracker::{DerivedState, HabitStatus, HabitTracker, ALL_CATEGORIES};
