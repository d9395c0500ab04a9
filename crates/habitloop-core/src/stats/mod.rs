//! Statistics module for habitloop
//!
//! Pure reductions over habit definitions and completion dates: streaks,
//! weekly goal progress, XP levels, category breakdowns and the activity
//! heatmap. Nothing here touches storage; callers pass in fresh data and an
//! explicit as-of date.

mod activity;
mod category;
mod level;
mod streak;
mod weekly;

pub use activity::{activity, intensity, summary, DayActivity, Summary};
pub use category::{
    completion_rate, distribution, performance, CategoryCount, CategoryPerformance,
};
pub use level::{level_for, LevelState, LEVEL_CEILING_XP, LEVEL_THRESHOLDS, XP_PER_COMPLETION};
pub use streak::{best_streak, streak};
pub use weekly::{week_key, weekly_progress, WeeklyProgress};
