//! Integration tests for the habit tracker service.
//!
//! These tests drive `HabitTracker` end to end against a real SQLite store
//! with a pinned clock.

use chrono::{Days, NaiveDate};
use habitloop_core::error::{CoreError, ValidationError};
use habitloop_core::{HabitDb, HabitDraft, HabitId, HabitTracker, ManualClock};
use std::sync::Arc;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn tracker_on(today: NaiveDate) -> HabitTracker {
    let db = Arc::new(HabitDb::open_memory().unwrap());
    let clock = Arc::new(ManualClock::new(today.and_hms_opt(8, 0, 0).unwrap()));
    HabitTracker::with_clock(db, clock)
}

// ============================================================================
// Habits and completions
// ============================================================================

#[test]
fn test_add_list_and_complete() {
    let today = d(2026, 3, 11);
    let tracker = tracker_on(today);
    let id = tracker
        .add_habit(&HabitDraft::new("  Read  ").reminder("21:30").weekly_target(5))
        .unwrap();

    let listed = tracker.list_habits(None).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].habit.name, "Read");
    assert_eq!(listed[0].habit.category, "General");
    assert!(!listed[0].done_today);

    tracker.set_completion(&id, today, true).unwrap();
    let listed = tracker.list_habits(Some("All")).unwrap();
    assert!(listed[0].done_today);
    assert_eq!(listed[0].streak, 1);
    assert_eq!(listed[0].weekly_progress.count, 1);
    assert_eq!(listed[0].weekly_progress.met, Some(false));
}

#[test]
fn test_double_completion_leaves_one_record() {
    let today = d(2026, 3, 11);
    let tracker = tracker_on(today);
    let id = tracker.add_habit(&HabitDraft::new("Walk")).unwrap();

    tracker.set_completion(&id, today, true).unwrap();
    tracker.set_completion(&id, today, true).unwrap();

    assert_eq!(tracker.db().total_completions().unwrap(), 1);
    assert_eq!(tracker.level_state().unwrap().xp, 10);

    tracker.set_completion(&id, today, false).unwrap();
    tracker.set_completion(&id, today, false).unwrap();
    assert_eq!(tracker.db().total_completions().unwrap(), 0);
}

#[test]
fn test_streak_breaks_after_missed_day() {
    let tracker = tracker_on(d(2026, 3, 11));
    let id = tracker.add_habit(&HabitDraft::new("Meditate")).unwrap();
    tracker.set_completion(&id, d(2026, 3, 10), true).unwrap();
    tracker.set_completion(&id, d(2026, 3, 11), true).unwrap();

    assert_eq!(tracker.streak_on(&id, d(2026, 3, 11)).unwrap(), 2);
    // Not done on the 12th: still alive through yesterday.
    assert_eq!(tracker.streak_on(&id, d(2026, 3, 12)).unwrap(), 2);
    // Missed the 12th entirely.
    assert_eq!(tracker.streak_on(&id, d(2026, 3, 13)).unwrap(), 0);
}

#[test]
fn test_weekly_progress_resets_on_monday() {
    let tracker = tracker_on(d(2026, 3, 15));
    let id = tracker
        .add_habit(&HabitDraft::new("Swim").weekly_target(2))
        .unwrap();
    // Saturday and Sunday.
    tracker.set_completion(&id, d(2026, 3, 14), true).unwrap();
    tracker.set_completion(&id, d(2026, 3, 15), true).unwrap();

    let sunday = tracker.weekly_progress_on(&id, d(2026, 3, 15)).unwrap();
    assert_eq!(sunday.count, 2);
    assert_eq!(sunday.met, Some(true));

    let monday = tracker.weekly_progress_on(&id, d(2026, 3, 16)).unwrap();
    assert_eq!(monday.count, 0);
    assert_eq!(monday.met, Some(false));
}

#[test]
fn test_delete_habit_leaves_no_completions() {
    let today = d(2026, 3, 11);
    let tracker = tracker_on(today);
    let keep = tracker.add_habit(&HabitDraft::new("Keep")).unwrap();
    let gone = tracker.add_habit(&HabitDraft::new("Gone")).unwrap();
    for offset in 0..5 {
        let day = today.checked_sub_days(Days::new(offset)).unwrap();
        tracker.set_completion(&gone, day, true).unwrap();
    }
    tracker.set_completion(&keep, today, true).unwrap();

    tracker.delete_habit(&gone).unwrap();

    assert!(tracker.db().completion_dates(&gone).unwrap().is_empty());
    let remaining = tracker.db().all_completions().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].habit_id, keep);
    assert!(matches!(
        tracker.get_habit(&gone),
        Err(CoreError::NotFound { entity: "habit", .. })
    ));
}

#[test]
fn test_unknown_habit_is_not_found_everywhere() {
    let tracker = tracker_on(d(2026, 3, 11));
    let missing = HabitId::from("does-not-exist");

    assert!(matches!(
        tracker.set_completion(&missing, d(2026, 3, 11), true),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(tracker.delete_habit(&missing), Err(CoreError::NotFound { .. })));
    assert!(matches!(tracker.streak(&missing), Err(CoreError::NotFound { .. })));
    assert!(matches!(
        tracker.update_habit(&missing, &HabitDraft::new("x")),
        Err(CoreError::NotFound { .. })
    ));
    assert_eq!(tracker.db().total_completions().unwrap(), 0);
}

#[test]
fn test_invalid_drafts_do_not_write() {
    let tracker = tracker_on(d(2026, 3, 11));

    assert!(matches!(
        tracker.add_habit(&HabitDraft::new("   ")),
        Err(CoreError::Validation(ValidationError::EmptyName { .. }))
    ));
    assert!(matches!(
        tracker.add_habit(&HabitDraft::new("Run").reminder("25:00")),
        Err(CoreError::Validation(ValidationError::InvalidTimeOfDay(_)))
    ));
    assert!(matches!(
        tracker.add_habit(&HabitDraft::new("Run").weekly_target(-1)),
        Err(CoreError::Validation(ValidationError::NegativeTarget(-1)))
    ));
    assert!(matches!(
        tracker.add_habit(&HabitDraft::new("Run").category("Nowhere")),
        Err(CoreError::NotFound { entity: "category", .. })
    ));
    assert!(tracker.list_habits(None).unwrap().is_empty());
}

#[test]
fn test_update_habit_changes_fields() {
    let tracker = tracker_on(d(2026, 3, 11));
    tracker.add_category("Health", Some("#2ECC71")).unwrap();
    let id = tracker
        .add_habit(&HabitDraft::new("Run").reminder("07:00"))
        .unwrap();

    tracker
        .update_habit(
            &id,
            &HabitDraft::new("Run 5k").category("Health").weekly_target(3),
        )
        .unwrap();

    let habit = tracker.get_habit(&id).unwrap();
    assert_eq!(habit.name, "Run 5k");
    assert_eq!(habit.category, "Health");
    assert_eq!(habit.reminder_time, None);
    assert_eq!(habit.weekly_target, 3);
}

// ============================================================================
// Categories
// ============================================================================

#[test]
fn test_category_performance_rate() {
    let today = d(2026, 3, 11);
    let tracker = tracker_on(today);
    tracker.add_category("Health", None).unwrap();
    let ids: Vec<HabitId> = ["Run", "Stretch", "Sleep early"]
        .iter()
        .map(|name| {
            tracker
                .add_habit(&HabitDraft::new(*name).category("Health"))
                .unwrap()
        })
        .collect();
    tracker.set_completion(&ids[0], today, true).unwrap();
    tracker.set_completion(&ids[1], today, true).unwrap();

    let performance = tracker.category_performance().unwrap();
    assert_eq!(performance.len(), 1);
    assert_eq!(performance[0].category, "Health");
    assert_eq!(performance[0].total, 3);
    assert_eq!(performance[0].completed_today, 2);
    assert!((performance[0].rate - 0.667).abs() < 0.001);

    // General has no habits, so it is left out of the distribution.
    let distribution = tracker.category_distribution().unwrap();
    assert_eq!(distribution.len(), 1);
    assert_eq!(distribution[0].habits, 3);
}

#[test]
fn test_rename_category_repoints_habits() {
    let tracker = tracker_on(d(2026, 3, 11));
    tracker.add_category("Fitness", Some("#ff0000")).unwrap();
    let a = tracker.add_habit(&HabitDraft::new("Run").category("Fitness")).unwrap();
    let b = tracker.add_habit(&HabitDraft::new("Lift").category("Fitness")).unwrap();
    tracker.add_habit(&HabitDraft::new("Read")).unwrap();

    assert_eq!(tracker.rename_category("Fitness", " Movement ").unwrap(), 2);

    assert_eq!(tracker.get_habit(&a).unwrap().category, "Movement");
    assert_eq!(tracker.get_habit(&b).unwrap().category, "Movement");
    assert!(tracker.list_habits(Some("Fitness")).unwrap().is_empty());
    assert_eq!(tracker.list_habits(Some("Movement")).unwrap().len(), 2);

    let names: Vec<String> = tracker
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert!(names.contains(&"Movement".to_string()));
    assert!(!names.contains(&"Fitness".to_string()));
}

#[test]
fn test_rename_onto_existing_category_fails() {
    let tracker = tracker_on(d(2026, 3, 11));
    tracker.add_category("Fitness", None).unwrap();
    assert!(matches!(
        tracker.rename_category("Fitness", "General"),
        Err(CoreError::Validation(ValidationError::DuplicateCategory(_)))
    ));
    assert_eq!(tracker.list_categories().unwrap().len(), 2);
}

#[test]
fn test_delete_referenced_category_is_blocked() {
    let tracker = tracker_on(d(2026, 3, 11));
    tracker.add_category("Fitness", None).unwrap();
    let id = tracker.add_habit(&HabitDraft::new("Run").category("Fitness")).unwrap();

    match tracker.delete_category("Fitness", None) {
        Err(CoreError::CategoryInUse { name, habits }) => {
            assert_eq!(name, "Fitness");
            assert_eq!(habits, 1);
        }
        other => panic!("expected CategoryInUse, got {other:?}"),
    }
    // Nothing changed.
    assert_eq!(tracker.list_categories().unwrap().len(), 2);
    assert_eq!(tracker.get_habit(&id).unwrap().category, "Fitness");
}

#[test]
fn test_delete_category_with_reassignment() {
    let tracker = tracker_on(d(2026, 3, 11));
    tracker.add_category("Fitness", None).unwrap();
    let id = tracker.add_habit(&HabitDraft::new("Run").category("Fitness")).unwrap();

    assert_eq!(tracker.delete_category("Fitness", Some("General")).unwrap(), 1);
    assert_eq!(tracker.get_habit(&id).unwrap().category, "General");
    assert_eq!(tracker.list_categories().unwrap().len(), 1);

    assert!(matches!(
        tracker.delete_category("Fitness", None),
        Err(CoreError::NotFound { entity: "category", .. })
    ));
}

#[test]
fn test_default_category_is_protected() {
    let tracker = tracker_on(d(2026, 3, 11));
    tracker.add_category("Misc", None).unwrap();

    assert!(matches!(
        tracker.rename_category("General", "Inbox"),
        Err(CoreError::Validation(ValidationError::ProtectedCategory(_)))
    ));
    assert!(matches!(
        tracker.delete_category("General", Some("Misc")),
        Err(CoreError::Validation(ValidationError::ProtectedCategory(_)))
    ));

    // Drafts without a category still land somewhere.
    let id = tracker.add_habit(&HabitDraft::new("Tidy desk")).unwrap();
    assert_eq!(tracker.get_habit(&id).unwrap().category, "General");
}

// ============================================================================
// Activity, summary and persistence
// ============================================================================

#[test]
fn test_activity_and_summary() {
    let today = d(2026, 3, 11);
    let tracker = tracker_on(today);
    let a = tracker.add_habit(&HabitDraft::new("A")).unwrap();
    let b = tracker.add_habit(&HabitDraft::new("B")).unwrap();
    tracker.set_completion(&a, today, true).unwrap();
    tracker.set_completion(&b, today, true).unwrap();
    tracker.set_completion(&a, d(2026, 3, 9), true).unwrap();
    // Outside the 7-day window.
    tracker.set_completion(&a, d(2026, 2, 1), true).unwrap();

    let days = tracker.activity(7).unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days.first().unwrap().date, d(2026, 3, 5));
    assert_eq!(days.last().unwrap().date, today);
    assert_eq!(days.last().unwrap().completions, 2);
    assert_eq!(days.last().unwrap().intensity, 1);
    let total: u32 = days.iter().map(|day| day.completions).sum();
    assert_eq!(total, 3);

    let summary = tracker.summary().unwrap();
    assert_eq!(summary.total_completions, 4);
    assert_eq!(summary.habits, 2);
    assert_eq!(summary.done_today, 2);
    assert_eq!(summary.today_rate_pct, 100);
    assert_eq!(summary.level.xp, 40);
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitloop.db");
    let today = d(2026, 3, 11);

    let id = {
        let db = Arc::new(HabitDb::open_path(&path).unwrap());
        let tracker = HabitTracker::new(db);
        let id = tracker.add_habit(&HabitDraft::new("Journal")).unwrap();
        tracker.set_completion(&id, today, true).unwrap();
        id
    };

    let db = Arc::new(HabitDb::open_path(&path).unwrap());
    let tracker = HabitTracker::new(db);
    assert_eq!(tracker.get_habit(&id).unwrap().name, "Journal");
    assert_eq!(tracker.streak_on(&id, today).unwrap(), 1);
}
