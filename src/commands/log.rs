use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use log::warn;

use crate::catalog::{Catalog, DAY_PLAN};
use crate::models::WorkoutEntry;
use crate::prompt::{MenuPolicy, Prompter};
use crate::storage::Storage;

pub struct LogOptions {
    pub policy: MenuPolicy,
    /// Date stamped on the new entry.
    pub date: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LogOutcome {
    Logged(WorkoutEntry),
    /// The user went to watch a tutorial; nothing was saved.
    TutorialOpened,
}

fn day_plan() -> Vec<String> {
    let mut out = vec!["Day plan:".to_string()];
    for (day, exercises) in DAY_PLAN {
        out.push(format!("  Day {day}"));
        out.extend(exercises.iter().map(|e| format!("    - {e}")));
    }
    out.push(String::new());
    out
}

/// Walk through the logging prompts and append the resulting entry.
pub async fn handle<S, R, W, O>(
    storage: &S,
    p: &mut Prompter<R, W>,
    catalog: &Catalog,
    opts: LogOptions,
    mut open: O,
) -> Result<LogOutcome>
where
    S: Storage,
    R: BufRead,
    W: Write,
    O: FnMut(&str) -> io::Result<()>,
{
    for line in day_plan() {
        p.say(line)?;
    }

    match storage.last_training_day().await {
        Ok(Some((day, date))) if !day.is_empty() => {
            p.say(format!("Previous training day: {day} ({date})\n"))?
        }
        Ok(_) => {}
        Err(e) => warn!("could not read previous training day: {e}"),
    }

    let day = p.ask("Day (A/B/C): ")?;

    let exercises = catalog.exercises();
    let names: Vec<String> = exercises.iter().map(|e| e.to_string()).collect();
    let fallback = format!("Invalid choice, defaulting to {}", exercises[0]);
    let exercise = exercises[p.choose("Choose Exercise:", &names, &fallback, opts.policy)?];

    let levels = catalog.levels(exercise);
    let options: Vec<String> = levels
        .iter()
        .map(|(level, goal)| format!("{level:<20} (goal: {goal})"))
        .collect();
    let picked = p.choose(
        &format!("Choose Level for {exercise}:"),
        &options,
        "Invalid choice, defaulting to first level",
        opts.policy,
    )?;
    let level = levels[picked].0;

    if let Some(url) = catalog.resolve_tutorial(exercise, level) {
        if p.confirm(&format!("Open tutorial for {exercise} - {level}? (y/N): "))? {
            match open(url) {
                Ok(()) => {
                    p.say("Tutorial opened. Exiting without logging.")?;
                    return Ok(LogOutcome::TutorialOpened);
                }
                Err(e) => p.say(format!(
                    "{} failed to open tutorial: {e}",
                    "warning:".yellow().bold()
                ))?,
            }
        }
    }

    let reps_sets = p.ask("Reps×Sets: ")?;
    let comment = p.ask("Comment (optional): ")?;

    let entry = WorkoutEntry::new(catalog, opts.date, day, exercise, level, reps_sets, comment);
    storage
        .append(&entry)
        .await
        .context("Error writing workout")?;

    p.say(format!("\n{} Logged successfully", "✓".green().bold()))?;
    Ok(LogOutcome::Logged(entry))
}
