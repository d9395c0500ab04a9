use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::habit::{HabitId, TimeOfDay};

/// Emitted by the reminder scheduler when a habit's reminder minute arrives
/// and the habit is still undone. Presentation layers turn it into a sound
/// and a system notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFired {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub reminder_time: TimeOfDay,
    /// Local wall-clock time of the tick that fired.
    pub fired_at: NaiveDateTime,
}

impl ReminderFired {
    /// One-line notification body.
    pub fn message(&self) -> String {
        format!("Time for '{}' ({})", self.habit_name, self.reminder_time)
    }
}
