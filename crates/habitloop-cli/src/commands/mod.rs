pub mod category;
pub mod config;
pub mod habit;
pub mod remind;
pub mod stats;

use chrono::NaiveDate;
use habitloop_core::{HabitDb, HabitTracker};
use std::sync::Arc;

/// Open the default store behind a tracker using the system clock.
pub fn open_tracker() -> Result<HabitTracker, Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;
    Ok(HabitTracker::new(Arc::new(db)))
}

/// Parse an optional `YYYY-MM-DD` argument.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}").into()),
    }
}
