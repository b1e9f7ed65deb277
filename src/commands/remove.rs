use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;

use super::history::{numbered, require_date, rule};
use crate::models::WorkoutEntry;
use crate::prompt::Prompter;
use crate::storage::Storage;

#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(WorkoutEntry),
    NoMatches,
    Cancelled,
    InvalidChoice,
}

/// Ask for a date, list its entries and remove the one the user picks.
pub async fn handle<S, R, W>(storage: &S, p: &mut Prompter<R, W>) -> Result<RemoveOutcome>
where
    S: Storage,
    R: BufRead,
    W: Write,
{
    let date = p.ask("Enter date to search (YYYY-MM-DD): ")?;
    require_date(&date)?;

    let entries = storage
        .search_by_date(&date)
        .await
        .context("Error searching workouts")?;

    if entries.is_empty() {
        p.say(format!("No workouts found for {date}"))?;
        return Ok(RemoveOutcome::NoMatches);
    }

    p.say(format!("\n{}", format!("Workouts for {date}:").cyan().bold()))?;
    p.say(rule())?;
    for line in numbered(&entries) {
        p.say(line)?;
    }
    p.say(rule())?;

    let answer = p.ask("\nEnter number to remove (0 to cancel): ")?;
    let choice = match answer.parse::<usize>() {
        Ok(n) if n <= entries.len() => n,
        _ => {
            p.say(format!("{} Invalid choice", "error:".red().bold()))?;
            return Ok(RemoveOutcome::InvalidChoice);
        }
    };

    if choice == 0 {
        p.say("Cancelled")?;
        return Ok(RemoveOutcome::Cancelled);
    }

    storage
        .remove_by_date_index(&date, choice - 1)
        .await
        .context("Error removing entry")?;

    p.say(format!("\n{} Entry removed successfully", "✓".green().bold()))?;
    Ok(RemoveOutcome::Removed(entries[choice - 1].clone()))
}
