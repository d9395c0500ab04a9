//! Per-category aggregates for analytics views.
//!
//! Both reductions omit categories without habits and are ordered by
//! category name.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::habit::{Category, Habit, HabitId};

/// How many habits are filed under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub color: Option<String>,
    pub habits: usize,
}

/// Today's completion rate for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub total: usize,
    pub completed_today: usize,
    /// `completed_today / total`, or 0.0 when `total` is 0.
    pub rate: f64,
}

pub fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

/// Number of habits per category.
pub fn distribution(habits: &[Habit], categories: &[Category]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for habit in habits {
        *counts.entry(habit.category.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(name, habits)| CategoryCount {
            category: name.to_string(),
            color: categories
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.color.clone()),
            habits,
        })
        .collect()
}

/// Habits completed today versus total, per category.
pub fn performance(habits: &[Habit], done_today: &HashSet<HabitId>) -> Vec<CategoryPerformance> {
    let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for habit in habits {
        let entry = totals.entry(habit.category.as_str()).or_default();
        entry.0 += 1;
        if done_today.contains(&habit.id) {
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(name, (total, completed_today))| CategoryPerformance {
            category: name.to_string(),
            total,
            completed_today,
            rate: completion_rate(completed_today, total),
        })
        .collect()
}
