//! Reminder commands for CLI.
//!
//! `remind run` keeps the scheduler in the foreground and prints every fired
//! reminder as JSON until interrupted.

use clap::Subcommand;
use habitloop_core::reminder::LAST_FIRED_KEY;
use habitloop_core::{ChannelSink, Config, HabitDb, ReminderRunner, RunnerOptions, SystemClock};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Run the reminder scheduler until Ctrl-C
    Run,
    /// Show reminder settings and scheduled habits
    Status,
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        RemindAction::Run => {
            if !config.reminders.enabled {
                return Err("reminders are disabled (set reminders.enabled to true)".into());
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_scheduler(RunnerOptions::from(&config.reminders)))?;
        }
        RemindAction::Status => {
            let db = HabitDb::open()?;
            let scheduled: Vec<_> = db
                .list_habits(None)?
                .into_iter()
                .filter_map(|habit| {
                    habit.reminder_time.map(|time| {
                        json!({ "id": habit.id, "name": habit.name, "reminder_time": time })
                    })
                })
                .collect();
            let out = json!({
                "enabled": config.reminders.enabled,
                "poll_interval_secs": config.reminders.poll_interval_secs,
                "cooldown_secs": config.reminders.cooldown_secs,
                "last_fired": db.kv_get(LAST_FIRED_KEY)?,
                "habits": scheduled,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

async fn run_scheduler(options: RunnerOptions) -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(HabitDb::open()?);
    let (sink, mut rx) = ChannelSink::new(32);
    let handle = ReminderRunner::new(
        db.clone(),
        Arc::new(sink),
        Arc::new(SystemClock),
        options,
    )
    .spawn();
    eprintln!("Reminder scheduler running. Press Ctrl-C to stop.");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to listen for Ctrl-C");
                }
                break;
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string_pretty(&event)?);
                let fired_at = event.fired_at.format("%Y-%m-%d %H:%M:%S").to_string();
                if let Err(err) = db.kv_set(LAST_FIRED_KEY, &fired_at) {
                    warn!(error = %err, "failed to record last reminder");
                }
            }
        }
    }

    handle.stop().await;
    info!("reminder scheduler shut down");
    Ok(())
}
