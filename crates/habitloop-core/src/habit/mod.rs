//! Habit, category, and completion types.
//!
//! A habit is a named recurring activity with an optional reminder time,
//! a category reference (by name) and a weekly target. Completions are
//! `(habit_id, date)` pairs, at most one per habit per calendar day.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Name of the category seeded on first open and used when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// Color assigned to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

/// Opaque habit identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Reminder time-of-day at minute resolution, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTimeOfDay(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Truncate a wall-clock time to its minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    /// Whether `time` falls inside this minute.
    pub fn matches(&self, time: NaiveTime) -> bool {
        Self::from_time(time) == *self
    }

    /// Parse optional user input where an empty string means "no reminder".
    pub fn parse_optional(input: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub reminder_time: Option<TimeOfDay>,
    pub category: String,
    /// Completions required per ISO week; 0 marks a daily habit.
    pub weekly_target: u32,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated habit fields as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    /// `HH:MM`, or empty/`None` for no reminder.
    pub reminder_time: Option<String>,
    /// Empty means the default category.
    pub category: String,
    pub weekly_target: i64,
}

/// Fields of a draft after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidHabit {
    pub name: String,
    pub reminder_time: Option<TimeOfDay>,
    pub category: String,
    pub weekly_target: u32,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn reminder(mut self, time: impl Into<String>) -> Self {
        self.reminder_time = Some(time.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn weekly_target(mut self, target: i64) -> Self {
        self.weekly_target = target;
        self
    }

    /// Check every field and normalize whitespace.
    pub fn validate(&self) -> Result<ValidHabit, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName { field: "habit name" });
        }
        let reminder_time = TimeOfDay::parse_optional(self.reminder_time.as_deref())?;
        if self.weekly_target < 0 {
            return Err(ValidationError::NegativeTarget(self.weekly_target));
        }
        let weekly_target = u32::try_from(self.weekly_target).map_err(|_| {
            ValidationError::InvalidArgument {
                name: "weekly_target",
                message: format!("{} is too large", self.weekly_target),
            }
        })?;
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };
        Ok(ValidHabit {
            name: name.to_string(),
            reminder_time,
            category,
            weekly_target,
        })
    }
}

/// A habit category with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    /// Validate name and color, falling back to the default color when none is given.
    pub fn new(name: &str, color: Option<&str>) -> Result<Self, ValidationError> {
        let name = validate_category_name(name)?;
        let color = match color.map(str::trim) {
            None | Some("") => DEFAULT_CATEGORY_COLOR.to_string(),
            Some(c) => validate_color(c)?,
        };
        Ok(Self { name, color })
    }
}

pub(crate) fn validate_category_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName {
            field: "category name",
        });
    }
    Ok(name.to_string())
}

fn validate_color(color: &str) -> Result<String, ValidationError> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

/// One day a habit was marked done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub habit_id: HabitId,
    pub date: NaiveDate,
}
