//! Habit management commands for CLI.

use clap::Subcommand;
use habitloop_core::{HabitDraft, HabitId};
use serde_json::json;

use super::{open_tracker, parse_date};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Daily reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
        /// Category name (default: General)
        #[arg(long, default_value = "General")]
        category: String,
        /// Completions required per week; 0 means daily
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        weekly_target: i64,
    },
    /// List habits with today's status
    List {
        /// Filter by category ("All" for every category)
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a habit and its derived state
    Show {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New reminder time (HH:MM)
        #[arg(long, conflicts_with = "clear_reminder")]
        reminder: Option<String>,
        /// Remove the reminder
        #[arg(long)]
        clear_reminder: bool,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New weekly target
        #[arg(long, allow_negative_numbers = true)]
        weekly_target: Option<i64>,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit ID
        id: String,
    },
    /// Mark a habit done
    Done {
        /// Habit ID
        id: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Unmark a habit
    Undo {
        /// Habit ID
        id: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        HabitAction::Add {
            name,
            reminder,
            category,
            weekly_target,
        } => {
            let mut draft = HabitDraft::new(name)
                .category(category)
                .weekly_target(weekly_target);
            draft.reminder_time = reminder;
            let id = tracker.add_habit(&draft)?;
            let habit = tracker.get_habit(&id)?;
            println!("Habit created: {id}");
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { category } => {
            let habits = tracker.list_habits(category.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Show { id } => {
            let id = HabitId::from(id);
            let habit = tracker.get_habit(&id)?;
            let state = tracker.derived_state(&id)?;
            let out = json!({ "habit": habit, "state": state });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        HabitAction::Update {
            id,
            name,
            reminder,
            clear_reminder,
            category,
            weekly_target,
        } => {
            let id = HabitId::from(id);
            let habit = tracker.get_habit(&id)?;

            let mut draft = HabitDraft {
                name: name.unwrap_or(habit.name),
                reminder_time: habit.reminder_time.map(|t| t.to_string()),
                category: category.unwrap_or(habit.category),
                weekly_target: weekly_target.unwrap_or(i64::from(habit.weekly_target)),
            };
            if clear_reminder {
                draft.reminder_time = None;
            } else if reminder.is_some() {
                draft.reminder_time = reminder;
            }

            tracker.update_habit(&id, &draft)?;
            println!("Habit updated:");
            println!("{}", serde_json::to_string_pretty(&tracker.get_habit(&id)?)?);
        }
        HabitAction::Delete { id } => {
            tracker.delete_habit(&HabitId::from(id.as_str()))?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Done { id, date } => {
            let date = parse_date(date.as_deref())?.unwrap_or_else(|| tracker.today());
            let id = HabitId::from(id);
            tracker.set_completion(&id, date, true)?;
            let state = tracker.derived_state_on(&id, date)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        HabitAction::Undo { id, date } => {
            let date = parse_date(date.as_deref())?.unwrap_or_else(|| tracker.today());
            let id = HabitId::from(id);
            tracker.set_completion(&id, date, false)?;
            let state = tracker.derived_state_on(&id, date)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}
