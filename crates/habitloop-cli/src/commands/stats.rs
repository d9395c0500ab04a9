use clap::Subcommand;
use habitloop_core::{Config, HabitId};
use serde_json::json;

use super::open_tracker;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current streak for a habit
    Streak {
        /// Habit ID
        id: String,
    },
    /// This week's progress for a habit
    Weekly {
        /// Habit ID
        id: String,
    },
    /// Total XP and level
    Level,
    /// Habits per category
    Distribution,
    /// Today's completion rate per category
    Performance,
    /// Completions per day
    Activity {
        /// Number of days (default: display.heatmap_days)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Headline numbers
    Summary,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        StatsAction::Streak { id } => {
            let id = HabitId::from(id);
            let streak = tracker.streak(&id)?;
            println!("{}", serde_json::to_string_pretty(&json!({ "habit_id": id, "streak": streak }))?);
        }
        StatsAction::Weekly { id } => {
            let progress = tracker.weekly_progress(&HabitId::from(id))?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        StatsAction::Level => {
            let level = tracker.level_state()?;
            println!("{}", serde_json::to_string_pretty(&level)?);
        }
        StatsAction::Distribution => {
            let distribution = tracker.category_distribution()?;
            println!("{}", serde_json::to_string_pretty(&distribution)?);
        }
        StatsAction::Performance => {
            let performance = tracker.category_performance()?;
            println!("{}", serde_json::to_string_pretty(&performance)?);
        }
        StatsAction::Activity { days } => {
            let days = match days {
                Some(d) => d,
                None => Config::load()?.display.heatmap_days,
            };
            let activity = tracker.activity(days)?;
            println!("{}", serde_json::to_string_pretty(&activity)?);
        }
        StatsAction::Summary => {
            let summary = tracker.summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
