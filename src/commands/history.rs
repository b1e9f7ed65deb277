use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::models::WorkoutEntry;
use crate::storage::Storage;
use crate::types::{OutputFmt, emit};
use crate::utils::parse_date;

pub const HISTORY_LIMIT: usize = 10;

pub const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD (e.g., 2026-01-24)";

pub(crate) fn rule() -> String {
    "-".repeat(80).dimmed().to_string()
}

/// `Day A | Pushups - Half | 20x2 → 25x2 | comment`
pub(crate) fn describe(entry: &WorkoutEntry) -> String {
    format!(
        "Day {} | {} - {} | {} → {} | {}",
        entry.day.yellow(),
        entry.exercise.bold(),
        entry.level,
        entry.reps_sets,
        entry.goal.cyan(),
        entry.comment.dimmed()
    )
}

/// One `[n] ...` line per entry, numbered from 1.
pub(crate) fn numbered(entries: &[WorkoutEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("[{}] {}", (i + 1).to_string().yellow(), describe(e)))
        .collect()
}

pub(crate) fn render_history(entries: &[WorkoutEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No workouts logged yet".dimmed().to_string()];
    }

    let mut out = vec![format!("Last {HISTORY_LIMIT} workouts:").cyan().bold().to_string()];
    out.push(rule());
    out.extend(
        entries
            .iter()
            .map(|e| format!("{} | {}", e.date.green(), describe(e))),
    );
    out.push(rule());
    out.push(format!("Total: {} workout(s)", entries.len()));
    out
}

pub(crate) fn render_search(date: &str, entries: &[WorkoutEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![format!("No workouts found for {date}").dimmed().to_string()];
    }

    let mut out = vec![format!("Workouts for {date}:").cyan().bold().to_string()];
    out.push(rule());
    out.extend(numbered(entries));
    out.push(rule());
    out.push(format!("Total: {} workout(s)", entries.len()));
    out
}

/// Reject anything that is not a full `YYYY-MM-DD` date.
pub fn require_date(date: &str) -> Result<()> {
    if parse_date(date).is_none() {
        bail!(INVALID_DATE);
    }
    Ok(())
}

pub async fn history<S: Storage>(storage: &S, fmt: OutputFmt) -> Result<()> {
    let entries = storage
        .recent(HISTORY_LIMIT)
        .await
        .context("Error reading workout history")?;

    emit(fmt, &entries, || {
        for line in render_history(&entries) {
            println!("{line}");
        }
    })
}

pub async fn search<S: Storage>(storage: &S, date: &str, fmt: OutputFmt) -> Result<()> {
    require_date(date)?;

    let entries = storage
        .search_by_date(date)
        .await
        .context("Error searching workouts")?;

    emit(fmt, &entries, || {
        for line in render_search(date, &entries) {
            println!("{line}");
        }
    })
}
