//! SQLite-backed habit log store.
//!
//! Provides persistent storage for:
//! - Habit definitions and their categories
//! - The completion log (one row per habit per day)
//! - Key-value store for application state
//!
//! The connection sits behind a mutex so one `HabitDb` can be shared through
//! an `Arc` by the tracker service and the reminder scheduler.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{data_dir, migrations};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::habit::{Category, CompletionRecord, Habit, HabitId, TimeOfDay, DEFAULT_CATEGORY};

const DATE_FORMAT: &str = "%Y-%m-%d";

const HABIT_COLUMNS: &str = "id, name, reminder_time, category, weekly_target, created_at";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
    let reminder: Option<String> = row.get(2)?;
    let reminder_time = reminder
        .as_deref()
        .map(str::parse::<TimeOfDay>)
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
    let created_at: String = row.get(5)?;

    Ok(Habit {
        id: HabitId::from(row.get::<_, String>(0)?),
        name: row.get(1)?,
        reminder_time,
        category: row.get(3)?,
        weekly_target: row.get(4)?,
        created_at: parse_datetime_fallback(&created_at),
    })
}

/// SQLite database for habits, categories and completions.
pub struct HabitDb {
    conn: Mutex<Connection>,
}

impl HabitDb {
    /// Open the database at `<data_dir>/habitloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitloop.db");
        Self::open_path(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Habits ───────────────────────────────────────────────────────

    pub fn insert_habit(&self, habit: &Habit) -> Result<()> {
        self.conn().execute(
            "INSERT INTO habits (id, name, reminder_time, category, weekly_target, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                habit.id.as_str(),
                habit.name,
                habit.reminder_time.map(|t| t.to_string()),
                habit.category,
                habit.weekly_target,
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Overwrite a habit's mutable fields. Returns `false` if the id is unknown.
    pub fn update_habit(&self, habit: &Habit) -> Result<bool> {
        let changed = self.conn().execute(
            "UPDATE habits SET name = ?2, reminder_time = ?3, category = ?4, weekly_target = ?5
             WHERE id = ?1",
            params![
                habit.id.as_str(),
                habit.name,
                habit.reminder_time.map(|t| t.to_string()),
                habit.category,
                habit.weekly_target,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a habit and its completion log. Returns `false` if the id is unknown.
    pub fn delete_habit(&self, id: &HabitId) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM completions WHERE habit_id = ?1",
            params![id.as_str()],
        )?;
        let deleted = tx.execute("DELETE FROM habits WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    pub fn get_habit(&self, id: &HabitId) -> Result<Option<Habit>> {
        let conn = self.conn();
        let habit = conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id.as_str()],
                row_to_habit,
            )
            .optional()?;
        Ok(habit)
    }

    /// All habits in creation order, optionally restricted to one category.
    pub fn list_habits(&self, category: Option<&str>) -> Result<Vec<Habit>> {
        let conn = self.conn();
        let habits = match category {
            Some(name) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {HABIT_COLUMNS} FROM habits WHERE category = ?1
                     ORDER BY created_at, rowid"
                ))?;
                let rows = stmt.query_map(params![name], row_to_habit)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at, rowid"
                ))?;
                let rows = stmt.query_map([], row_to_habit)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(habits)
    }

    // ── Completions ──────────────────────────────────────────────────

    /// Record a completion. Returns `false` when the day was already marked.
    pub fn insert_completion(&self, id: &HabitId, date: NaiveDate) -> Result<bool> {
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO completions (habit_id, log_date) VALUES (?1, ?2)",
            params![id.as_str(), format_date(date)],
        )?;
        Ok(inserted > 0)
    }

    /// Remove a completion. Returns `false` when the day was not marked.
    pub fn delete_completion(&self, id: &HabitId, date: NaiveDate) -> Result<bool> {
        let deleted = self.conn().execute(
            "DELETE FROM completions WHERE habit_id = ?1 AND log_date = ?2",
            params![id.as_str(), format_date(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Distinct completion dates for one habit, most recent first.
    pub fn completion_dates(&self, id: &HabitId) -> Result<Vec<NaiveDate>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT log_date FROM completions WHERE habit_id = ?1 ORDER BY log_date DESC",
        )?;
        let rows = stmt.query_map(params![id.as_str()], |row| {
            let raw: String = row.get(0)?;
            parse_date(0, &raw)
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every completion record in the log.
    pub fn all_completions(&self) -> Result<Vec<CompletionRecord>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT habit_id, log_date FROM completions ORDER BY log_date, habit_id")?;
        let rows = stmt.query_map([], |row| {
            let raw: String = row.get(1)?;
            Ok(CompletionRecord {
                habit_id: HabitId::from(row.get::<_, String>(0)?),
                date: parse_date(1, &raw)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Ids of habits marked done on `date`.
    pub fn completed_on(&self, date: NaiveDate) -> Result<HashSet<HabitId>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT habit_id FROM completions WHERE log_date = ?1")?;
        let rows = stmt.query_map(params![format_date(date)], |row| {
            row.get::<_, String>(0).map(HabitId::from)
        })?;
        Ok(rows.collect::<rusqlite::Result<HashSet<_>>>()?)
    }

    pub fn total_completions(&self) -> Result<i64> {
        let total = self
            .conn()
            .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))?;
        Ok(total)
    }

    /// Completions per day within `[from, to]`.
    pub fn completion_counts_by_day(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, u32>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT log_date, COUNT(*) FROM completions
             WHERE log_date >= ?1 AND log_date <= ?2
             GROUP BY log_date",
        )?;
        let rows = stmt.query_map(params![format_date(from), format_date(to)], |row| {
            let raw: String = row.get(0)?;
            Ok((parse_date(0, &raw)?, row.get::<_, u32>(1)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<HashMap<_, _>>>()?)
    }

    // ── Categories ───────────────────────────────────────────────────

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name, color FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                name: row.get(0)?,
                color: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_category(&self, name: &str) -> Result<Option<Category>> {
        let category = self
            .conn()
            .query_row(
                "SELECT name, color FROM categories WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Category {
                        name: row.get(0)?,
                        color: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    /// Insert a category, rejecting duplicate names.
    pub fn insert_category(&self, category: &Category) -> Result<()> {
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO categories (name, color) VALUES (?1, ?2)",
            params![category.name, category.color],
        )?;
        if inserted == 0 {
            return Err(ValidationError::DuplicateCategory(category.name.clone()).into());
        }
        Ok(())
    }

    /// Rename a category and re-point every habit that references it.
    ///
    /// Runs in one transaction: either the category and all referencing
    /// habits change, or nothing does.
    pub fn rename_category(&self, old: &str, new: &str) -> Result<usize> {
        if old == DEFAULT_CATEGORY {
            return Err(ValidationError::ProtectedCategory(old.to_string()).into());
        }
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM categories WHERE name = ?1",
                params![old],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(CoreError::category_not_found(old));
        }
        if old == new {
            return Ok(0);
        }
        let taken = tx
            .query_row(
                "SELECT 1 FROM categories WHERE name = ?1",
                params![new],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(ValidationError::DuplicateCategory(new.to_string()).into());
        }

        let color: String = tx.query_row(
            "SELECT color FROM categories WHERE name = ?1",
            params![old],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO categories (name, color) VALUES (?1, ?2)",
            params![new, color],
        )?;
        let moved = tx.execute(
            "UPDATE habits SET category = ?2 WHERE category = ?1",
            params![old, new],
        )?;
        tx.execute("DELETE FROM categories WHERE name = ?1", params![old])?;
        tx.commit()?;
        Ok(moved)
    }

    /// Delete a category.
    ///
    /// With `reassign_to`, referencing habits move to that category in the
    /// same transaction. Without it, deletion is refused while any habit
    /// still references the category.
    pub fn delete_category(&self, name: &str, reassign_to: Option<&str>) -> Result<usize> {
        if name == DEFAULT_CATEGORY {
            return Err(ValidationError::ProtectedCategory(name.to_string()).into());
        }
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM categories WHERE name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(CoreError::category_not_found(name));
        }

        let referencing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM habits WHERE category = ?1",
            params![name],
            |row| row.get(0),
        )?;
        let referencing = usize::try_from(referencing).unwrap_or_default();

        let moved = match reassign_to {
            Some(target) if target == name => {
                return Err(ValidationError::InvalidArgument {
                    name: "reassign_to",
                    message: "cannot reassign habits to the category being deleted".into(),
                }
                .into());
            }
            Some(target) => {
                let target_exists = tx
                    .query_row(
                        "SELECT 1 FROM categories WHERE name = ?1",
                        params![target],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some();
                if !target_exists {
                    return Err(CoreError::category_not_found(target));
                }
                tx.execute(
                    "UPDATE habits SET category = ?2 WHERE category = ?1",
                    params![name, target],
                )?
            }
            None if referencing > 0 => {
                return Err(CoreError::CategoryInUse {
                    name: name.to_string(),
                    habits: referencing,
                });
            }
            None => 0,
        };

        tx.execute("DELETE FROM categories WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(moved)
    }

    // ── Key/value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
