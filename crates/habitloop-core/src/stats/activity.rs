//! Consistency heatmap and dashboard summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::category::completion_rate;
use super::level::{level_for, LevelState};
use crate::error::ValidationError;

/// Completions logged on one day, with a 0-4 shading bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub completions: u32,
    pub intensity: u8,
}

/// Shading bucket: 0 for none, then 1-2, 3-4, 5-6, 7+.
pub fn intensity(completions: u32) -> u8 {
    match completions {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

/// Per-day completion counts for the `days` days ending at `today`, oldest first.
pub fn activity(
    counts_by_day: &HashMap<NaiveDate, u32>,
    today: NaiveDate,
    days: u32,
) -> Vec<DayActivity> {
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(u64::from(back))))
        .map(|date| {
            let completions = counts_by_day.get(&date).copied().unwrap_or(0);
            DayActivity {
                date,
                completions,
                intensity: intensity(completions),
            }
        })
        .collect()
}

/// Headline numbers for the analytics view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_completions: u64,
    pub level: LevelState,
    pub habits: usize,
    pub done_today: usize,
    /// Whole-percent share of habits done today.
    pub today_rate_pct: u32,
}

pub fn summary(
    total_completions: i64,
    habits: usize,
    done_today: usize,
) -> Result<Summary, ValidationError> {
    let level = level_for(total_completions)?;
    Ok(Summary {
        total_completions: total_completions.unsigned_abs(),
        level,
        habits,
        done_today,
        today_rate_pct: (completion_rate(done_today, habits) * 100.0).floor() as u32,
    })
}
