//! Habit tracker service.
//!
//! The entry point presentation layers call into. Every query re-reads the
//! store and recomputes derived values through the pure functions in
//! [`crate::stats`]; nothing is cached between calls, so results can never
//! be stale across a date change.
//!
//! Operations that depend on the current date come in pairs: `foo(..)` uses
//! the tracker's clock, `foo_on(.., today)` takes the as-of date explicitly.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result, ValidationError};
use crate::habit::{validate_category_name, Category, Habit, HabitDraft, HabitId};
use crate::stats::{
    self, CategoryCount, CategoryPerformance, DayActivity, LevelState, Summary, WeeklyProgress,
};
use crate::storage::HabitDb;

/// A habit together with its state for the as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStatus {
    pub habit: Habit,
    pub done_today: bool,
    pub weekly_progress: WeeklyProgress,
    pub streak: u32,
}

/// Everything derived for one habit on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    pub habit_id: HabitId,
    pub as_of: NaiveDate,
    pub streak: u32,
    pub best_streak: u32,
    pub weekly_progress: WeeklyProgress,
    pub is_done_today: bool,
    pub total_xp: u64,
    pub level: u32,
}

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

pub struct HabitTracker {
    db: Arc<HabitDb>,
    clock: Arc<dyn Clock>,
}

impl HabitTracker {
    pub fn new(db: Arc<HabitDb>) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Arc<HabitDb>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Shared store handle, e.g. for the reminder runner.
    pub fn db(&self) -> &Arc<HabitDb> {
        &self.db
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn require_habit(&self, id: &HabitId) -> Result<Habit> {
        self.db
            .get_habit(id)?
            .ok_or_else(|| CoreError::habit_not_found(id.as_str()))
    }

    fn require_category(&self, name: &str) -> Result<Category> {
        self.db
            .get_category(name)?
            .ok_or_else(|| CoreError::category_not_found(name))
    }

    // ── Habits ───────────────────────────────────────────────────────

    pub fn list_habits(&self, category_filter: Option<&str>) -> Result<Vec<HabitStatus>> {
        self.list_habits_on(category_filter, self.today())
    }

    /// Habits with done-today flag, weekly progress and streak.
    ///
    /// `None` or `"All"` lists every habit.
    pub fn list_habits_on(
        &self,
        category_filter: Option<&str>,
        today: NaiveDate,
    ) -> Result<Vec<HabitStatus>> {
        let filter = category_filter.filter(|c| *c != ALL_CATEGORIES);
        let habits = self.db.list_habits(filter)?;
        let done = self.db.completed_on(today)?;

        habits
            .into_iter()
            .map(|habit| {
                let dates = self.db.completion_dates(&habit.id)?;
                Ok(HabitStatus {
                    done_today: done.contains(&habit.id),
                    weekly_progress: stats::weekly_progress(&dates, habit.weekly_target, today),
                    streak: stats::streak(&dates, today),
                    habit,
                })
            })
            .collect()
    }

    pub fn get_habit(&self, id: &HabitId) -> Result<Habit> {
        self.require_habit(id)
    }

    /// Create a habit.
    ///
    /// # Errors
    /// `Validation` for an empty name, malformed reminder time or negative
    /// target; `NotFound` if the category does not exist.
    pub fn add_habit(&self, draft: &HabitDraft) -> Result<HabitId> {
        let valid = draft.validate()?;
        self.require_category(&valid.category)?;

        let habit = Habit {
            id: HabitId::new(),
            name: valid.name,
            reminder_time: valid.reminder_time,
            category: valid.category,
            weekly_target: valid.weekly_target,
            created_at: chrono::Utc::now(),
        };
        self.db.insert_habit(&habit)?;
        info!(habit_id = %habit.id, name = %habit.name, "habit added");
        Ok(habit.id)
    }

    /// Replace a habit's name, reminder, category and target.
    pub fn update_habit(&self, id: &HabitId, draft: &HabitDraft) -> Result<()> {
        let valid = draft.validate()?;
        let mut habit = self.require_habit(id)?;
        self.require_category(&valid.category)?;

        habit.name = valid.name;
        habit.reminder_time = valid.reminder_time;
        habit.category = valid.category;
        habit.weekly_target = valid.weekly_target;

        if !self.db.update_habit(&habit)? {
            return Err(CoreError::habit_not_found(id.as_str()));
        }
        info!(habit_id = %id, "habit updated");
        Ok(())
    }

    /// Delete a habit and every completion recorded for it.
    pub fn delete_habit(&self, id: &HabitId) -> Result<()> {
        if !self.db.delete_habit(id)? {
            return Err(CoreError::habit_not_found(id.as_str()));
        }
        info!(habit_id = %id, "habit deleted");
        Ok(())
    }

    /// Mark or unmark a habit for a date. Repeating the same call is a no-op.
    pub fn set_completion(&self, id: &HabitId, date: NaiveDate, done: bool) -> Result<()> {
        self.require_habit(id)?;
        let changed = if done {
            self.db.insert_completion(id, date)?
        } else {
            self.db.delete_completion(id, date)?
        };
        if changed {
            info!(habit_id = %id, %date, done, "completion updated");
        }
        Ok(())
    }

    // ── Derived state ────────────────────────────────────────────────

    pub fn streak(&self, id: &HabitId) -> Result<u32> {
        self.streak_on(id, self.today())
    }

    pub fn streak_on(&self, id: &HabitId, today: NaiveDate) -> Result<u32> {
        self.require_habit(id)?;
        Ok(stats::streak(&self.db.completion_dates(id)?, today))
    }

    pub fn weekly_progress(&self, id: &HabitId) -> Result<WeeklyProgress> {
        self.weekly_progress_on(id, self.today())
    }

    pub fn weekly_progress_on(&self, id: &HabitId, today: NaiveDate) -> Result<WeeklyProgress> {
        let habit = self.require_habit(id)?;
        let dates = self.db.completion_dates(id)?;
        Ok(stats::weekly_progress(&dates, habit.weekly_target, today))
    }

    pub fn level_state(&self) -> Result<LevelState> {
        Ok(stats::level_for(self.db.total_completions()?)?)
    }

    pub fn derived_state(&self, id: &HabitId) -> Result<DerivedState> {
        self.derived_state_on(id, self.today())
    }

    pub fn derived_state_on(&self, id: &HabitId, today: NaiveDate) -> Result<DerivedState> {
        let habit = self.require_habit(id)?;
        let dates = self.db.completion_dates(id)?;
        let level = self.level_state()?;
        Ok(DerivedState {
            habit_id: habit.id,
            as_of: today,
            streak: stats::streak(&dates, today),
            best_streak: stats::best_streak(&dates),
            weekly_progress: stats::weekly_progress(&dates, habit.weekly_target, today),
            is_done_today: dates.contains(&today),
            total_xp: level.xp,
            level: level.level,
        })
    }

    // ── Categories ───────────────────────────────────────────────────

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.db.list_categories()
    }

    pub fn add_category(&self, name: &str, color: Option<&str>) -> Result<Category> {
        let category = Category::new(name, color)?;
        self.db.insert_category(&category)?;
        info!(category = %category.name, "category added");
        Ok(category)
    }

    /// Rename a category; every referencing habit follows atomically.
    /// Returns the number of habits moved.
    pub fn rename_category(&self, old: &str, new: &str) -> Result<usize> {
        let new = validate_category_name(new)?;
        let moved = self.db.rename_category(old, &new)?;
        info!(from = %old, to = %new, habits = moved, "category renamed");
        Ok(moved)
    }

    /// Delete a category.
    ///
    /// # Errors
    /// `CategoryInUse` if habits still reference it and no `reassign_to`
    /// target is given; `NotFound` for an unknown category or target.
    pub fn delete_category(&self, name: &str, reassign_to: Option<&str>) -> Result<usize> {
        let moved = self.db.delete_category(name, reassign_to)?;
        info!(category = %name, reassigned = moved, "category deleted");
        Ok(moved)
    }

    pub fn category_distribution(&self) -> Result<Vec<CategoryCount>> {
        let habits = self.db.list_habits(None)?;
        let categories = self.db.list_categories()?;
        Ok(stats::distribution(&habits, &categories))
    }

    pub fn category_performance(&self) -> Result<Vec<CategoryPerformance>> {
        self.category_performance_on(self.today())
    }

    pub fn category_performance_on(&self, today: NaiveDate) -> Result<Vec<CategoryPerformance>> {
        let habits = self.db.list_habits(None)?;
        let done = self.db.completed_on(today)?;
        Ok(stats::performance(&habits, &done))
    }

    // ── Activity ─────────────────────────────────────────────────────

    pub fn activity(&self, days: u32) -> Result<Vec<DayActivity>> {
        self.activity_on(days, self.today())
    }

    /// Completions per day for the `days` days ending at `today`.
    pub fn activity_on(&self, days: u32, today: NaiveDate) -> Result<Vec<DayActivity>> {
        if days == 0 {
            return Err(ValidationError::InvalidArgument {
                name: "days",
                message: "must be at least 1".into(),
            }
            .into());
        }
        let from = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MIN);
        let counts = self.db.completion_counts_by_day(from, today)?;
        Ok(stats::activity(&counts, today, days))
    }

    pub fn summary(&self) -> Result<Summary> {
        self.summary_on(self.today())
    }

    pub fn summary_on(&self, today: NaiveDate) -> Result<Summary> {
        let habits = self.db.list_habits(None)?;
        let done = self.db.completed_on(today)?;
        let done_today = habits.iter().filter(|h| done.contains(&h.id)).count();
        Ok(stats::summary(
            self.db.total_completions()?,
            habits.len(),
            done_today,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tracker_at(today: NaiveDate) -> HabitTracker {
        let db = Arc::new(HabitDb::open_memory().unwrap());
        let clock = Arc::new(ManualClock::new(today.and_hms_opt(12, 0, 0).unwrap()));
        HabitTracker::with_clock(db, clock)
    }

    #[test]
    fn clock_drives_default_date() {
        let tracker = tracker_at(d(2026, 3, 10));
        let id = tracker.add_habit(&HabitDraft::new("Run")).unwrap();
        tracker.set_completion(&id, d(2026, 3, 10), true).unwrap();
        tracker.set_completion(&id, d(2026, 3, 9), true).unwrap();

        assert_eq!(tracker.streak(&id).unwrap(), 2);
        let listed = tracker.list_habits(None).unwrap();
        assert!(listed[0].done_today);
    }

    #[test]
    fn derived_state_combines_everything() {
        let tracker = tracker_at(d(2026, 3, 12));
        let id = tracker
            .add_habit(&HabitDraft::new("Gym").weekly_target(3))
            .unwrap();
        for day in [9, 10, 11, 12] {
            tracker.set_completion(&id, d(2026, 3, day), true).unwrap();
        }

        let state = tracker.derived_state(&id).unwrap();
        assert_eq!(state.streak, 4);
        assert_eq!(state.best_streak, 4);
        assert_eq!(state.weekly_progress.count, 4);
        assert_eq!(state.weekly_progress.met, Some(true));
        assert!(state.is_done_today);
        assert_eq!(state.total_xp, 40);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn activity_rejects_empty_window() {
        let tracker = tracker_at(d(2026, 3, 12));
        assert!(matches!(
            tracker.activity(0),
            Err(CoreError::Validation(ValidationError::InvalidArgument { .. }))
        ));
        assert_eq!(tracker.activity(7).unwrap().len(), 7);
    }
}
