//! Routine catalog: routines, their training days and prescribed exercises.
//!
//! A built-in catalog ships with the crate. A `routines.toml` in the data
//! directory replaces it entirely.

use crate::{Error, ExerciseDefinition, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Routine file name inside the data directory
pub const ROUTINES_FILE: &str = "routines.toml";

/// One training day of a routine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineDay {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseDefinition>,
}

/// A training routine made of days
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub days: Vec<RoutineDay>,
}

impl Routine {
    pub fn day(&self, day_id: &str) -> Option<&RoutineDay> {
        self.days.iter().find(|d| d.id == day_id)
    }
}

/// All routines available to start a workout from
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RoutineCatalog {
    #[serde(default, rename = "routine")]
    pub routines: Vec<Routine>,
}

/// Cached default catalog - built once and reused
static DEFAULT_CATALOG: Lazy<RoutineCatalog> = Lazy::new(build_default_catalog);

/// Reference to the cached built-in catalog
pub fn get_default_catalog() -> &'static RoutineCatalog {
    &DEFAULT_CATALOG
}

fn exercise(
    id: &str,
    name: &str,
    sets: u32,
    rep_range: &str,
    rest: &str,
    muscles: &[&str],
    equipment: &[&str],
) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.into(),
        name: name.into(),
        sets,
        rep_range: rep_range.into(),
        rest: rest.into(),
        muscles: muscles.iter().map(|m| m.to_string()).collect(),
        equipment: equipment.iter().map(|e| e.to_string()).collect(),
    }
}

/// Builds the built-in catalog.
///
/// Prefer [`get_default_catalog`] outside of tests.
pub fn build_default_catalog() -> RoutineCatalog {
    let upper = RoutineDay {
        id: "upper".into(),
        title: "Upper".into(),
        exercises: vec![
            exercise(
                "bench_press",
                "Bench Press",
                3,
                "6-8",
                "2-3 min",
                &["chest", "triceps"],
                &["barbell"],
            ),
            exercise(
                "barbell_row",
                "Barbell Row",
                3,
                "8-10",
                "2 min",
                &["back", "biceps"],
                &["barbell"],
            ),
            exercise(
                "overhead_press",
                "Overhead Press",
                3,
                "6-8",
                "2 min",
                &["shoulders"],
                &["barbell"],
            ),
            exercise("pullup", "Pull-up", 3, "AMRAP", "90s", &["back", "biceps"], &["pullup_bar"]),
        ],
    };

    let lower = RoutineDay {
        id: "lower".into(),
        title: "Lower".into(),
        exercises: vec![
            exercise(
                "back_squat",
                "Back Squat",
                3,
                "5-6",
                "3 min",
                &["quads", "glutes"],
                &["barbell"],
            ),
            exercise(
                "romanian_deadlift",
                "Romanian Deadlift",
                3,
                "8-10",
                "2 min",
                &["hamstrings", "glutes"],
                &["barbell"],
            ),
            exercise("leg_press", "Leg Press", 3, "10-12", "90s", &["quads"], &["machine"]),
            exercise(
                "calf_raise",
                "Standing Calf Raise",
                4,
                "12-15",
                "60s",
                &["calves"],
                &["machine"],
            ),
        ],
    };

    let full_body = RoutineDay {
        id: "full".into(),
        title: "Full Body".into(),
        exercises: vec![
            exercise(
                "goblet_squat",
                "Goblet Squat",
                3,
                "10-12",
                "90s",
                &["quads", "glutes"],
                &["dumbbell"],
            ),
            exercise("pushup", "Push-up", 0, "AMRAP", "60s", &["chest", "triceps"], &[]),
            exercise(
                "dumbbell_row",
                "One-arm Dumbbell Row",
                3,
                "10-12",
                "60s",
                &["back"],
                &["dumbbell"],
            ),
            exercise("plank", "Plank", 0, "30-60s", "60s", &["core"], &[]),
        ],
    };

    RoutineCatalog {
        routines: vec![
            Routine {
                id: "upper_lower".into(),
                title: "Upper / Lower".into(),
                days: vec![upper, lower],
            },
            Routine {
                id: "full_body".into(),
                title: "Full Body".into(),
                days: vec![full_body],
            },
        ],
    }
}

impl RoutineCatalog {
    /// Load a catalog from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: RoutineCatalog = toml::from_str(&contents)?;
        tracing::info!(
            "Loaded {} routines from {:?}",
            catalog.routines.len(),
            path
        );
        Ok(catalog)
    }

    /// Load `routines.toml` from `data_dir`, or the built-in catalog if absent
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(ROUTINES_FILE);
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No routine file at {:?}, using built-in routines", path);
            Ok(get_default_catalog().clone())
        }
    }

    pub fn routine(&self, routine_id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == routine_id)
    }

    /// Look up a routine and one of its days
    pub fn find_day(&self, routine_id: &str, day_id: &str) -> Result<(&Routine, &RoutineDay)> {
        let routine = self
            .routine(routine_id)
            .ok_or_else(|| Error::Catalog(format!("Unknown routine: {}", routine_id)))?;
        let day = routine.day(day_id).ok_or_else(|| {
            Error::Catalog(format!("Routine {} has no day {}", routine_id, day_id))
        })?;
        Ok((routine, day))
    }

    /// Find an exercise definition anywhere in the catalog
    pub fn exercise(&self, exercise_id: &str) -> Option<&ExerciseDefinition> {
        self.routines
            .iter()
            .flat_map(|r| &r.days)
            .flat_map(|d| &d.exercises)
            .find(|e| e.id == exercise_id)
    }

    /// Validate catalog integrity, returning every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut routine_ids = HashSet::new();

        for routine in &self.routines {
            if !routine_ids.insert(routine.id.as_str()) {
                errors.push(format!("Duplicate routine id: {}", routine.id));
            }
            if routine.title.trim().is_empty() {
                errors.push(format!("Routine {} has an empty title", routine.id));
            }

            let mut day_ids = HashSet::new();
            for day in &routine.days {
                if !day_ids.insert(day.id.as_str()) {
                    errors.push(format!("Duplicate day id {} in routine {}", day.id, routine.id));
                }

                let mut exercise_ids = HashSet::new();
                for exercise in &day.exercises {
                    if !exercise_ids.insert(exercise.id.as_str()) {
                        errors.push(format!(
                            "Duplicate exercise {} in {}/{}",
                            exercise.id, routine.id, day.id
                        ));
                    }
                    if exercise.name.trim().is_empty() {
                        errors.push(format!(
                            "Exercise {} in {}/{} has an empty name",
                            exercise.id, routine.id, day.id
                        ));
                    }
                }
            }
        }

        errors
    }
}
