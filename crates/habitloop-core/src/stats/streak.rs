//! Consecutive-day streak calculation.
//!
//! A streak is alive only while today or yesterday has a completion. Today
//! is counted only once it is actually done, so an unfinished today still
//! shows yesterday's streak unchanged.

use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;

/// Current streak length as of `today`.
///
/// Duplicate dates are ignored, as are dates after `today`.
pub fn streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let done: BTreeSet<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    if done.is_empty() {
        return 0;
    }

    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
        return u32::from(done.contains(&today));
    };

    let mut cursor = if done.contains(&today) {
        today
    } else if done.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut count = 0;
    while done.contains(&cursor) {
        count += 1;
        match cursor.checked_sub_days(Days::new(1)) {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    count
}

/// Longest run of consecutive days anywhere in the history.
pub fn best_streak(dates: &[NaiveDate]) -> u32 {
    let done: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for date in done {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }
    best
}
