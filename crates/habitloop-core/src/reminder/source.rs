use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::habit::{HabitId, TimeOfDay};
use crate::storage::HabitDb;

/// A habit with a reminder, as seen by one scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderCandidate {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub reminder_time: TimeOfDay,
    pub done_today: bool,
}

/// Where the scheduler reads reminder definitions from each tick.
///
/// Implementations must read fresh state on every call.
pub trait ReminderSource: Send + Sync {
    fn reminder_candidates(&self, today: NaiveDate) -> Result<Vec<ReminderCandidate>>;
}

impl ReminderSource for HabitDb {
    fn reminder_candidates(&self, today: NaiveDate) -> Result<Vec<ReminderCandidate>> {
        let done = self.completed_on(today)?;
        let candidates = self
            .list_habits(None)?
            .into_iter()
            .filter_map(|habit| {
                let reminder_time = habit.reminder_time?;
                Some(ReminderCandidate {
                    done_today: done.contains(&habit.id),
                    habit_id: habit.id,
                    habit_name: habit.name,
                    reminder_time,
                })
            })
            .collect();
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Habit, DEFAULT_CATEGORY};
    use chrono::Utc;

    #[test]
    fn only_habits_with_reminders_are_candidates() {
        let db = HabitDb::open_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut ids = Vec::new();
        for (name, time) in [("Run", Some("07:00")), ("Read", None)] {
            let habit = Habit {
                id: HabitId::new(),
                name: name.to_string(),
                reminder_time: time.map(|t| t.parse().unwrap()),
                category: DEFAULT_CATEGORY.to_string(),
                weekly_target: 0,
                created_at: Utc::now(),
            };
            db.insert_habit(&habit).unwrap();
            ids.push(habit.id);
        }
        db.insert_completion(&ids[0], today).unwrap();

        let candidates = db.reminder_candidates(today).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].habit_name, "Run");
        assert!(candidates[0].done_today);
    }
}
