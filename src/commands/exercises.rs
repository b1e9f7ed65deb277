use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::catalog::{Catalog, DAY_PLAN};
use crate::types::{OutputFmt, emit};

#[derive(Debug, Serialize)]
pub struct LevelInfo {
    pub step: usize,
    pub level: &'static str,
    pub goal: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutorial: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseInfo {
    pub exercise: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<&'static str>,
    pub levels: Vec<LevelInfo>,
}

fn day_of(exercise: &str) -> Option<&'static str> {
    DAY_PLAN
        .iter()
        .find(|(_, exercises)| exercises.contains(&exercise))
        .map(|(day, _)| *day)
}

pub fn overview(catalog: &Catalog) -> Vec<ExerciseInfo> {
    catalog
        .exercises()
        .into_iter()
        .map(|exercise| ExerciseInfo {
            exercise,
            day: day_of(exercise),
            levels: catalog
                .levels(exercise)
                .iter()
                .enumerate()
                .map(|(i, &(level, goal))| LevelInfo {
                    step: i + 1,
                    level,
                    goal,
                    tutorial: catalog.resolve_tutorial(exercise, level),
                })
                .collect(),
        })
        .collect()
}

pub fn handle(catalog: &Catalog, fmt: OutputFmt) -> Result<()> {
    let list = overview(catalog);

    emit(fmt, &list, || {
        for ex in &list {
            let day = ex.day.map(|d| format!(" (Day {d})")).unwrap_or_default();
            println!("{}{}", ex.exercise.cyan().bold(), day.dimmed());
            for l in &ex.levels {
                let marker = if l.tutorial.is_some() { "▶" } else { " " };
                println!("  {:>2}. {:<18} {:<8} {}", l.step, l.level, l.goal.green(), marker.dimmed());
            }
            println!();
        }
    })
}
