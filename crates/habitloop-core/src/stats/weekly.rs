//! Weekly goal progress.
//!
//! Weeks are ISO-8601 weeks: they start on Monday and are keyed by
//! `(iso_year, iso_week)`, so the last days of December can belong to
//! week 1 of the following year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Completions in the current week against the habit's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub count: u32,
    pub target: u32,
    /// `None` for daily habits (target 0), which have no weekly quota.
    pub met: Option<bool>,
}

/// ISO week bucket containing `date`.
pub fn week_key(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// Count distinct completion days in the same ISO week as `today`.
pub fn weekly_progress(dates: &[NaiveDate], target: u32, today: NaiveDate) -> WeeklyProgress {
    let key = week_key(today);
    let mut in_week: Vec<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|d| week_key(*d) == key)
        .collect();
    in_week.sort_unstable();
    in_week.dedup();

    let count = u32::try_from(in_week.len()).unwrap_or(u32::MAX);
    WeeklyProgress {
        count,
        target,
        met: (target > 0).then_some(count >= target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-03-09 is a Monday, 2026-03-15 the following Sunday.
        assert_eq!(week_key(d(2026, 3, 9)), week_key(d(2026, 3, 15)));
        assert_ne!(week_key(d(2026, 3, 8)), week_key(d(2026, 3, 9)));
    }

    #[test]
    fn counts_only_current_week() {
        let dates = [d(2026, 3, 8), d(2026, 3, 9), d(2026, 3, 11), d(2026, 3, 16)];
        let p = weekly_progress(&dates, 3, d(2026, 3, 12));
        assert_eq!(p.count, 2);
        assert_eq!(p.met, Some(false));
    }

    #[test]
    fn resets_at_week_boundary() {
        let dates = [d(2026, 3, 9), d(2026, 3, 10), d(2026, 3, 15)];
        assert_eq!(weekly_progress(&dates, 3, d(2026, 3, 15)).count, 3);
        assert_eq!(weekly_progress(&dates, 3, d(2026, 3, 16)).count, 0);
    }

    #[test]
    fn target_met_when_count_reaches_target() {
        let dates = [d(2026, 3, 9), d(2026, 3, 10)];
        assert_eq!(weekly_progress(&dates, 2, d(2026, 3, 10)).met, Some(true));
    }

    #[test]
    fn daily_habits_have_no_met_flag() {
        let p = weekly_progress(&[d(2026, 3, 9)], 0, d(2026, 3, 9));
        assert_eq!(p.count, 1);
        assert_eq!(p.met, None);
    }

    #[test]
    fn iso_year_boundary_groups_late_december_with_january() {
        // 2025-12-29 (Mon) through 2026-01-04 (Sun) is ISO week 2026-W01.
        let dates = [d(2025, 12, 29), d(2026, 1, 2)];
        assert_eq!(weekly_progress(&dates, 0, d(2026, 1, 4)).count, 2);
        assert_eq!(week_key(d(2025, 12, 29)), (2026, 1));
    }
}
