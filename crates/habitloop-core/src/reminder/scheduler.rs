//! Reminder state machine.
//!
//! Each habit with a reminder moves through:
//!
//! ```text
//! Idle -> Due -> Fired -> Cooling -> Idle
//! ```
//!
//! - Idle -> Due: reminder minute equals the current minute and the habit is
//!   not done today.
//! - Due -> Fired: exactly one [`ReminderFired`] is produced.
//! - Fired -> Cooling: the habit is skipped entirely until the cooldown ends.
//! - Cooling -> Idle: cooldown elapsed.
//!
//! Due and Fired both happen inside the tick that returns the event, so a
//! habit is only ever left resting in [`ReminderPhase::Idle`] or
//! [`ReminderPhase::Cooling`] between ticks.
//!
//! Besides the cooldown, the last fired `(date, minute)` slot is remembered
//! per habit, so a tick landing in the same minute after a short cooldown
//! still cannot fire twice.
//!
//! Like the timer engine this type owns no thread; the caller supplies `now`
//! and fresh candidates on every [`ReminderScheduler::tick`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::source::ReminderCandidate;
use crate::events::ReminderFired;
use crate::habit::{HabitId, TimeOfDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderPhase {
    Idle,
    Cooling,
}

#[derive(Debug, Clone)]
struct ReminderState {
    phase: ReminderPhase,
    fired_at: Option<NaiveDateTime>,
    last_slot: Option<(NaiveDate, TimeOfDay)>,
}

impl ReminderState {
    fn idle() -> Self {
        Self {
            phase: ReminderPhase::Idle,
            fired_at: None,
            last_slot: None,
        }
    }
}

/// Per-habit reminder bookkeeping across ticks.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    cooldown: chrono::Duration,
    states: HashMap<HabitId, ReminderState>,
}

impl ReminderScheduler {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: chrono::Duration::from_std(cooldown)
                .unwrap_or_else(|_| chrono::Duration::days(365)),
            states: HashMap::new(),
        }
    }

    /// Phase a habit was left in by the last tick.
    pub fn phase(&self, habit_id: &HabitId) -> ReminderPhase {
        self.states
            .get(habit_id)
            .map(|s| s.phase)
            .unwrap_or(ReminderPhase::Idle)
    }

    /// Habits currently inside their cooldown window.
    pub fn cooling(&self) -> usize {
        self.states
            .values()
            .filter(|s| s.phase == ReminderPhase::Cooling)
            .count()
    }

    /// Drop all per-habit state.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    /// Evaluate one tick and return the reminders to deliver.
    pub fn tick(&mut self, candidates: &[ReminderCandidate], now: NaiveDateTime) -> Vec<ReminderFired> {
        let today = now.date();
        let minute = TimeOfDay::from_time(now.time());

        // Forget habits that were deleted or lost their reminder.
        let live: HashSet<&HabitId> = candidates.iter().map(|c| &c.habit_id).collect();
        self.states.retain(|id, _| live.contains(id));

        let cooldown = self.cooldown;
        let mut fired = Vec::new();
        for candidate in candidates {
            let state = self
                .states
                .entry(candidate.habit_id.clone())
                .or_insert_with(ReminderState::idle);

            if state.phase == ReminderPhase::Cooling {
                let still_cooling = state
                    .fired_at
                    .is_some_and(|at| now >= at && now - at < cooldown);
                if still_cooling {
                    continue;
                }
                tracing::debug!(habit_id = %candidate.habit_id, "reminder cooldown elapsed");
                state.phase = ReminderPhase::Idle;
            }

            let due = !candidate.done_today
                && candidate.reminder_time.matches(now.time())
                && state.last_slot != Some((today, minute));
            if !due {
                state.phase = ReminderPhase::Idle;
                continue;
            }

            tracing::debug!(habit_id = %candidate.habit_id, at = %minute, "reminder due");
            fired.push(ReminderFired {
                habit_id: candidate.habit_id.clone(),
                habit_name: candidate.habit_name.clone(),
                reminder_time: candidate.reminder_time,
                fired_at: now,
            });
            state.fired_at = Some(now);
            state.last_slot = Some((today, minute));
            state.phase = ReminderPhase::Cooling;
        }
        fired
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
