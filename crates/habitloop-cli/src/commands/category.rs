//! Category management commands for CLI.

use clap::Subcommand;

use super::open_tracker;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Display color (#rrggbb)
        #[arg(long)]
        color: Option<String>,
    },
    /// List categories
    List,
    /// Rename a category; its habits follow
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },
    /// Delete a category
    Delete {
        /// Category name
        name: String,
        /// Move referencing habits to this category first
        #[arg(long)]
        reassign_to: Option<String>,
    },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;

    match action {
        CategoryAction::Add { name, color } => {
            let category = tracker.add_category(&name, color.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        CategoryAction::List => {
            let categories = tracker.list_categories()?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        CategoryAction::Rename { old, new } => {
            let moved = tracker.rename_category(&old, &new)?;
            println!("Category renamed: {old} -> {} ({moved} habit(s) moved)", new.trim());
        }
        CategoryAction::Delete { name, reassign_to } => {
            let moved = tracker.delete_category(&name, reassign_to.as_deref())?;
            match reassign_to {
                Some(target) => println!("Category deleted: {name} ({moved} habit(s) moved to {target})"),
                None => println!("Category deleted: {name}"),
            }
        }
    }
    Ok(())
}
