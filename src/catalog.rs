use std::collections::HashMap;

use once_cell::sync::Lazy;
use strsim::jaro_winkler;
use thiserror::Error;

/// Ordered `(level, value)` pairs for one exercise.
pub type LevelTable = &'static [(&'static str, &'static str)];

/// Ordered `(exercise, levels)` pairs.
pub type ExerciseTable = &'static [(&'static str, LevelTable)];

/// Goal written when an (exercise, level) pair is not in the goal table.
pub const NO_GOAL: &str = "-";

/// Every tutorial link must start with this.
pub const TUTORIAL_PREFIX: &str = "https://www.youtube.com/watch?v=";

pub const PLAYLISTS_URL: &str = "https://www.youtube.com/@convictedcondition/playlists";

pub const TEMPLATE_URL: &str =
    "https://drive.google.com/file/d/19zXstmNsSoT6hmseO-nU-h2NNiIK-X2R/view?usp=drive_link";

/// Named resources accepted by `cali open`.
pub const RESOURCES: &[(&str, &str)] = &[("workout-template", TEMPLATE_URL)];

/// Which exercises belong to which training day.
pub const DAY_PLAN: &[(&str, &[&str])] = &[
    ("A", &["Pushups", "Squats"]),
    ("B", &["Pullups", "Leg Raises"]),
    ("C", &["Bridges", "Handstand Push-ups"]),
];

/// Exercise -> Level -> Goal. Exercise order drives the exercise menu and
/// level order drives the level menu.
pub static GOAL_TABLE: ExerciseTable = &[
    (
        "Pushups",
        &[
            ("Wall", "50x3"),
            ("Incline", "40x3"),
            ("Kneeling", "30x3"),
            ("Half", "25x2"),
            ("Full", "20x2"),
            ("Close", "20x2"),
            ("Uneven", "20x2"),
            ("Half One-Arm", "20x2"),
            ("Lever", "20x2"),
            ("One-Arm", "100x1"),
        ],
    ),
    (
        "Squats",
        &[
            ("Shoulderstand", "50x3"),
            ("Jackknife", "40x3"),
            ("Supported", "30x3"),
            ("Half", "50x2"),
            ("Full", "30x2"),
            ("Close", "20x2"),
            ("Uneven", "20x2"),
            ("Half One-Leg", "20x2"),
            ("Assisted One-Leg", "20x2"),
            ("One-Leg", "50x2"),
        ],
    ),
    (
        "Pullups",
        &[
            ("Vertical", "40x3"),
            ("Horizontal", "30x3"),
            ("Jackknife", "20x3"),
            ("Half", "15x2"),
            ("Full", "10x2"),
            ("Close", "10x2"),
            ("Uneven", "9x2"),
            ("Half One-Arm", "8x2"),
            ("Assisted One-Arm", "7x2"),
            ("One-Arm", "6x2"),
        ],
    ),
    (
        "Leg Raises",
        &[
            ("Knee Tuck", "40x3"),
            ("Knee Raise", "35x3"),
            ("Bent Leg", "30x3"),
            ("Frog", "25x3"),
            ("Flat", "20x2"),
            ("Hanging Knee", "15x2"),
            ("Hanging Bent", "15x2"),
            ("Partial", "15x2"),
            ("Hanging", "30x2"),
        ],
    ),
    (
        "Bridges",
        &[
            ("Short", "50x3"),
            ("Straight", "40x3"),
            ("Angled", "30x3"),
            ("Head", "25x2"),
            ("Half", "20x2"),
            ("Full", "15x2"),
            ("Wall Down", "10x2"),
            ("Wall Up", "8x2"),
            ("Closing", "6x2"),
            ("Stand-to-Stand", "10-30x2"),
        ],
    ),
    (
        "Handstand Push-ups",
        &[
            ("Wall Headstand", "2min"),
            ("Crow", "1min"),
            ("Wall", "2min"),
            ("Half", "20x2"),
            ("Full", "15x2"),
            ("Close", "12x2"),
            ("Uneven", "10x2"),
            ("Half One-Arm", "8x2"),
            ("Lever", "6x2"),
            ("One-Arm", "5x2"),
        ],
    ),
];

/// Exercise -> Level -> tutorial link. Keys must exist in [`GOAL_TABLE`].
pub static TUTORIAL_TABLE: ExerciseTable = &[
    (
        "Pushups",
        &[
            ("Wall", "https://www.youtube.com/watch?v=N5C9NUHZ20U"),
            ("Incline", "https://www.youtube.com/watch?v=Gv8y_prZBZY"),
            ("Kneeling", "https://www.youtube.com/watch?v=NyzxeqY6CR8"),
            ("Half", "https://www.youtube.com/watch?v=bGuUODcwnHA"),
            ("Full", "https://www.youtube.com/watch?v=1QJICN6udbs"),
            ("Close", "https://www.youtube.com/watch?v=3-1vRVuWgBc"),
            ("Uneven", "https://www.youtube.com/watch?v=o1abTRdwpUs"),
            ("Half One-Arm", "https://www.youtube.com/watch?v=63077t3I4Zc"),
            ("Lever", "https://www.youtube.com/watch?v=Hwq5zdb-owA"),
            ("One-Arm", "https://www.youtube.com/watch?v=ReKZry7JQEQ"),
        ],
    ),
    (
        "Squats",
        &[
            ("Shoulderstand", "https://www.youtube.com/watch?v=a-JNXY_hnSs"),
            ("Jackknife", "https://www.youtube.com/watch?v=QhyRsrPOkoY"),
            ("Supported", "https://www.youtube.com/watch?v=cLQS5mZmXN0"),
            ("Half", "https://www.youtube.com/watch?v=tIHNkW0nGFg"),
            ("Full", "https://www.youtube.com/watch?v=S3bNmmxkh_k"),
            ("Close", "https://www.youtube.com/watch?v=MiNzsa9MIpI"),
            ("Uneven", "https://www.youtube.com/watch?v=UhslmLWprQg"),
            ("Half One-Leg", "https://www.youtube.com/watch?v=dZON2MCVdfg"),
            ("Assisted One-Leg", "https://www.youtube.com/watch?v=9Mcs9M1HORQ"),
            ("One-Leg", "https://www.youtube.com/watch?v=fNCTWGl1Q8A"),
        ],
    ),
    (
        "Pullups",
        &[
            ("Vertical", "https://www.youtube.com/watch?v=F8kIJMeqCMs"),
            ("Horizontal", "https://www.youtube.com/watch?v=YN0vvoqssfw"),
            ("Jackknife", "https://www.youtube.com/watch?v=58ss6OF4fmQ"),
            ("Half", "https://www.youtube.com/watch?v=vsRRJGHhKnA"),
            ("Full", "https://www.youtube.com/watch?v=9HBukpLkZIM"),
            ("Close", "https://www.youtube.com/watch?v=Om_3c0jozTc"),
            ("Uneven", "https://www.youtube.com/watch?v=fCHcb4MB1FM"),
            ("Half One-Arm", "https://www.youtube.com/watch?v=ve0EIQdRLag"),
            ("Assisted One-Arm", "https://www.youtube.com/watch?v=W8DBEewoDmY"),
            ("One-Arm", "https://www.youtube.com/watch?v=2tHTY6ZKzkc"),
        ],
    ),
    (
        "Leg Raises",
        &[
            ("Knee Tuck", "https://www.youtube.com/watch?v=N8k-SeCkR0s"),
            ("Knee Raise", "https://www.youtube.com/watch?v=98ragSP4gC8"),
            ("Bent Leg", "https://www.youtube.com/watch?v=qq69_MifXAc"),
            ("Frog", "https://www.youtube.com/watch?v=esoUyks3PZM"),
            ("Flat", "https://www.youtube.com/watch?v=hav89ezKkPA"),
            ("Hanging Knee", "https://www.youtube.com/watch?v=t2MU4Q4V3Xk"),
            ("Hanging Bent", "https://www.youtube.com/watch?v=CtFMjDbU0P4"),
            ("Partial", "https://www.youtube.com/watch?v=y4cCwSpScPo"),
            ("Hanging", "https://www.youtube.com/watch?v=7jI6fDNY_yM"),
        ],
    ),
    (
        "Bridges",
        &[
            ("Short", "https://www.youtube.com/watch?v=JQFddjAFWZw"),
            ("Straight", "https://www.youtube.com/watch?v=gkTVDJHHIZ0"),
            ("Angled", "https://www.youtube.com/watch?v=o9yKAjvUQlM"),
            ("Head", "https://www.youtube.com/watch?v=BIq3sAZAekg"),
            ("Half", "https://www.youtube.com/watch?v=JXHnTtE9NSk"),
            ("Full", "https://www.youtube.com/watch?v=qnU9LoO5Cyg"),
            ("Wall Down", "https://www.youtube.com/watch?v=LD1h45ArqcY"),
            ("Wall Up", "https://www.youtube.com/watch?v=sc_hsEM7xnA"),
            ("Closing", "https://www.youtube.com/watch?v=tGv50Whxouk"),
            ("Stand-to-Stand", "https://www.youtube.com/watch?v=wZnixqvk-24"),
        ],
    ),
];

/// The process-wide catalogue built from the static tables.
pub static CATALOG: Lazy<Catalog> = Lazy::new(|| Catalog::new(GOAL_TABLE, TUTORIAL_TABLE));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown exercise key in tutorials: {0:?}")]
    UnknownExercise(String),

    #[error("unknown level key in tutorials: {exercise:?} -> {level:?}")]
    UnknownLevel { exercise: String, level: String },

    #[error("invalid youtube link for {exercise:?} -> {level:?}: {link:?}")]
    InvalidLink {
        exercise: String,
        level: String,
        link: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TutorialArgsError {
    #[error(
        "usage: cali tutorial <exercise> <level> (e.g. cali tutorial \"Handstand Push-ups\" \"Wall Headstand\")"
    )]
    Usage,

    #[error("unknown exercise {input:?}{hint}")]
    UnknownExercise { input: String, hint: String },

    #[error("unknown level {level:?} for {exercise}")]
    UnknownLevel {
        exercise: &'static str,
        level: String,
    },
}

/// Read-only lookup over a goal table and a tutorial table.
pub struct Catalog {
    goals: ExerciseTable,
    tutorials: ExerciseTable,
    goal_index: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    tutorial_index: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

fn index(table: ExerciseTable) -> HashMap<&'static str, HashMap<&'static str, &'static str>> {
    table
        .iter()
        .map(|(exercise, levels)| (*exercise, levels.iter().copied().collect()))
        .collect()
}

impl Catalog {
    pub fn new(goals: ExerciseTable, tutorials: ExerciseTable) -> Self {
        Self {
            goals,
            tutorials,
            goal_index: index(goals),
            tutorial_index: index(tutorials),
        }
    }

    /// Exercises in menu order.
    pub fn exercises(&self) -> Vec<&'static str> {
        self.goals.iter().map(|(name, _)| *name).collect()
    }

    /// `(level, goal)` pairs for `exercise` in progression order; empty for
    /// an unknown exercise.
    pub fn levels(&self, exercise: &str) -> LevelTable {
        self.goals
            .iter()
            .find(|(name, _)| *name == exercise)
            .map(|(_, levels)| *levels)
            .unwrap_or(&[])
    }

    pub fn resolve_goal(&self, exercise: &str, level: &str) -> &'static str {
        self.goal_index
            .get(exercise)
            .and_then(|levels| levels.get(level))
            .copied()
            .unwrap_or(NO_GOAL)
    }

    pub fn resolve_tutorial(&self, exercise: &str, level: &str) -> Option<&'static str> {
        self.tutorial_index
            .get(exercise)
            .and_then(|levels| levels.get(level))
            .copied()
    }

    /// Checks that every tutorial points at a known (exercise, level) pair
    /// and that every link carries [`TUTORIAL_PREFIX`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (exercise, levels) in self.tutorials {
            let Some(goal_levels) = self.goal_index.get(exercise) else {
                return Err(CatalogError::UnknownExercise(exercise.to_string()));
            };

            for (level, link) in levels.iter() {
                if !goal_levels.contains_key(level) {
                    return Err(CatalogError::UnknownLevel {
                        exercise: exercise.to_string(),
                        level: level.to_string(),
                    });
                }
                if !link.trim().starts_with(TUTORIAL_PREFIX) {
                    return Err(CatalogError::InvalidLink {
                        exercise: exercise.to_string(),
                        level: level.to_string(),
                        link: link.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Case-insensitive match against the canonical exercise names.
    pub fn normalize_exercise(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        self.goals
            .iter()
            .map(|(name, _)| *name)
            .find(|name| name.eq_ignore_ascii_case(input))
    }

    pub fn normalize_level(&self, exercise: &str, input: &str) -> Option<&'static str> {
        let input = input.trim();
        self.levels(exercise)
            .iter()
            .map(|(name, _)| *name)
            .find(|name| name.eq_ignore_ascii_case(input))
    }

    /// Return the closest exercise name for `input` if it is similar enough
    /// and clearly ahead of the runner-up.
    pub fn suggest_exercise(&self, input: &str) -> Option<&'static str> {
        let inp = input.trim().to_ascii_lowercase();
        if inp.is_empty() {
            return None;
        }

        let mut scores: Vec<(&'static str, f64)> = self
            .goals
            .iter()
            .map(|(name, _)| (*name, jaro_winkler(&inp, &name.to_ascii_lowercase())))
            .collect();

        scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        let (best, best_score) = *scores.first()?;
        let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

        const MIN_SCORE: f64 = 0.80;
        const GAP: f64 = 0.02;

        if best_score >= MIN_SCORE && best_score - second_score >= GAP {
            Some(best)
        } else {
            None
        }
    }

    /// Split free-form words into an exercise and a level. Both can contain
    /// spaces, so the longest exercise phrase is tried first by moving the
    /// split point from the right.
    pub fn split_exercise_level<S: AsRef<str>>(
        &self,
        args: &[S],
    ) -> Result<(&'static str, &'static str), TutorialArgsError> {
        if args.len() < 2 {
            return Err(TutorialArgsError::Usage);
        }

        let words: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        for split in (1..words.len()).rev() {
            let exercise_candidate = words[..split].join(" ");
            let level_candidate = words[split..].join(" ");

            let Some(exercise) = self.normalize_exercise(&exercise_candidate) else {
                continue;
            };

            return match self.normalize_level(exercise, &level_candidate) {
                Some(level) => Ok((exercise, level)),
                None => Err(TutorialArgsError::UnknownLevel {
                    exercise,
                    level: level_candidate,
                }),
            };
        }

        let input = words.join(" ");
        let hint = self
            .suggest_exercise(&input)
            .or_else(|| self.suggest_exercise(words[0]))
            .map(|s| format!(" -- did you mean `{s}`?"))
            .unwrap_or_default();
        Err(TutorialArgsError::UnknownExercise { input, hint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_goal_pair_resolves_to_its_value() {
        for (exercise, levels) in GOAL_TABLE.iter() {
            for (level, goal) in levels.iter() {
                assert_eq!(CATALOG.resolve_goal(exercise, level), *goal);
            }
        }
    }

    #[test]
    fn unknown_pairs_resolve_to_dash() {
        assert_eq!(CATALOG.resolve_goal("Pushups", "Planche"), NO_GOAL);
        assert_eq!(CATALOG.resolve_goal("Dips", "Full"), NO_GOAL);
        assert_eq!(CATALOG.resolve_goal("pushups", "half"), NO_GOAL);
    }

    #[test]
    fn table_shape() {
        assert_eq!(
            CATALOG.exercises(),
            vec![
                "Pushups",
                "Squats",
                "Pullups",
                "Leg Raises",
                "Bridges",
                "Handstand Push-ups"
            ]
        );
        for exercise in CATALOG.exercises() {
            let expected = if exercise == "Leg Raises" { 9 } else { 10 };
            assert_eq!(CATALOG.levels(exercise).len(), expected, "{exercise}");
        }
        assert!(CATALOG.levels("Dips").is_empty());
        assert_eq!(CATALOG.levels("Bridges")[9], ("Stand-to-Stand", "10-30x2"));
    }

    #[test]
    fn builtin_tutorials_are_valid() {
        assert_eq!(CATALOG.validate(), Ok(()));
        assert_eq!(
            CATALOG.resolve_tutorial("Squats", "Half"),
            Some("https://www.youtube.com/watch?v=tIHNkW0nGFg")
        );
        assert_eq!(CATALOG.resolve_tutorial("Handstand Push-ups", "Crow"), None);
    }

    static GOALS: ExerciseTable = &[("Pushups", &[("Wall", "50x3"), ("Half", "25x2")])];

    #[test]
    fn tutorial_with_unknown_exercise_fails_validation() {
        static TUTORIALS: ExerciseTable =
            &[("Dips", &[("Wall", "https://www.youtube.com/watch?v=x")])];
        let catalog = Catalog::new(GOALS, TUTORIALS);
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::UnknownExercise("Dips".into()))
        );
    }

    #[test]
    fn tutorial_with_unknown_level_fails_validation() {
        static TUTORIALS: ExerciseTable =
            &[("Pushups", &[("Planche", "https://www.youtube.com/watch?v=x")])];
        let catalog = Catalog::new(GOALS, TUTORIALS);
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::UnknownLevel {
                exercise: "Pushups".into(),
                level: "Planche".into(),
            })
        );
    }

    #[test]
    fn tutorial_with_bad_link_fails_validation() {
        static TUTORIALS: ExerciseTable = &[("Pushups", &[("Half", "https://vimeo.com/123")])];
        let catalog = Catalog::new(GOALS, TUTORIALS);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidLink { .. })
        ));
    }

    #[test]
    fn partial_tutorial_table_is_fine() {
        static TUTORIALS: ExerciseTable =
            &[("Pushups", &[("Half", "  https://www.youtube.com/watch?v=abc")])];
        assert_eq!(Catalog::new(GOALS, TUTORIALS).validate(), Ok(()));
        assert_eq!(Catalog::new(GOALS, &[]).validate(), Ok(()));
    }

    #[test]
    fn normalization_ignores_case_and_padding() {
        assert_eq!(CATALOG.normalize_exercise(" leg raises "), Some("Leg Raises"));
        assert_eq!(CATALOG.normalize_exercise("leg"), None);
        assert_eq!(
            CATALOG.normalize_level("Squats", "half one-leg"),
            Some("Half One-Leg")
        );
        assert_eq!(CATALOG.normalize_level("Squats", "Hanging"), None);
    }

    #[test]
    fn split_handles_multi_word_phrases() {
        assert_eq!(
            CATALOG.split_exercise_level(&["Handstand", "Push-ups", "Wall", "Headstand"]),
            Ok(("Handstand Push-ups", "Wall Headstand"))
        );
        assert_eq!(
            CATALOG.split_exercise_level(&["pushups", "half", "one-arm"]),
            Ok(("Pushups", "Half One-Arm"))
        );
        assert_eq!(
            CATALOG.split_exercise_level(&["Handstand Push-ups", "Wall Headstand"]),
            Ok(("Handstand Push-ups", "Wall Headstand"))
        );
    }

    #[test]
    fn split_reports_what_went_wrong() {
        assert_eq!(
            CATALOG.split_exercise_level(&["Pushups"]),
            Err(TutorialArgsError::Usage)
        );
        assert_eq!(
            CATALOG.split_exercise_level(&["Pushups", "Planche"]),
            Err(TutorialArgsError::UnknownLevel {
                exercise: "Pushups",
                level: "Planche".into(),
            })
        );
        assert!(matches!(
            CATALOG.split_exercise_level(&["Dips", "Full"]),
            Err(TutorialArgsError::UnknownExercise { .. })
        ));
    }

    #[test]
    fn suggestion_for_typo() {
        assert_eq!(CATALOG.suggest_exercise("Pulups"), Some("Pullups"));
        assert_eq!(CATALOG.suggest_exercise("zzz"), None);
        assert_eq!(CATALOG.suggest_exercise("  "), None);
    }
}
