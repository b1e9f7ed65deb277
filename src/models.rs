use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// Field separator of the on-disk log line.
pub const DELIMITER: &str = "|";

/// Number of fields in a log line and of columns in a sheet row.
pub const FIELD_COUNT: usize = 7;

/// Date format used for entry dates and search keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One logged workout unit.
///
/// `goal` is resolved from the catalogue when the entry is built; it is never
/// taken from user input. `row_index` is the raw row position inside the
/// remote sheet and stays `None` for entries read from local files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub date: String,
    pub day: String,
    pub exercise: String,
    pub level: String,
    pub reps_sets: String,
    pub goal: String,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub row_index: Option<i64>,
}

impl WorkoutEntry {
    /// Build a fresh entry, resolving the goal for `(exercise, level)`.
    pub fn new(
        catalog: &Catalog,
        date: impl Into<String>,
        day: impl Into<String>,
        exercise: impl Into<String>,
        level: impl Into<String>,
        reps_sets: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        let exercise = exercise.into();
        let level = level.into();
        let goal = catalog.resolve_goal(&exercise, &level).to_string();

        Self {
            date: date.into(),
            day: day.into(),
            exercise,
            level,
            reps_sets: reps_sets.into(),
            goal,
            comment: comment.into(),
            row_index: None,
        }
    }

    /// `DATE|DAY|EXERCISE|LEVEL|REPSxSETS|GOAL|COMMENT`, newline terminated.
    /// Fields are not escaped.
    pub fn to_line(&self) -> String {
        let mut line = self.fields().join(DELIMITER);
        line.push('\n');
        line
    }

    /// Parse one log line. Lines with fewer than seven fields are not
    /// records and yield `None`; extra fields are ignored.
    pub fn from_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(DELIMITER).collect();
        if parts.len() < FIELD_COUNT {
            return None;
        }

        Some(Self {
            date: parts[0].to_string(),
            day: parts[1].to_string(),
            exercise: parts[2].to_string(),
            level: parts[3].to_string(),
            reps_sets: parts[4].to_string(),
            goal: parts[5].to_string(),
            comment: parts[6].to_string(),
            row_index: None,
        })
    }

    /// Cell values in sheet column order.
    pub fn to_row(&self) -> Vec<String> {
        self.fields().iter().map(|f| f.to_string()).collect()
    }

    /// Build an entry from sheet cells, tagging it with its raw row position.
    /// Missing trailing cells read as empty strings.
    pub fn from_row(row: &[String], row_index: i64) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();

        Self {
            date: cell(0),
            day: cell(1),
            exercise: cell(2),
            level: cell(3),
            reps_sets: cell(4),
            goal: cell(5),
            comment: cell(6),
            row_index: Some(row_index),
        }
    }

    fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.date,
            &self.day,
            &self.exercise,
            &self.level,
            &self.reps_sets,
            &self.goal,
            &self.comment,
        ]
    }
}
