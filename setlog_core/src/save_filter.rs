//! Decides which parts of a live session are worth writing to the log.
//!
//! A set is kept when it was marked complete, or when it carries a positive
//! weight or rep count. RIR on its own is not enough.

use crate::{ActiveExercise, SavedSet, SavedWorkoutEntry, SetEntry};

/// Whether a set has enough data to be persisted
pub fn is_worth_saving(set: &SetEntry) -> bool {
    set.completed || set.reps.parse_or_zero() > 0.0 || set.weight.parse_or_zero() > 0.0
}

fn to_saved(set: &SetEntry) -> SavedSet {
    SavedSet {
        weight: set.weight.parse_or_zero(),
        reps: set.reps.parse_or_zero(),
        rir: set.rir.parse_or_zero(),
    }
}

/// Convert the session's exercises into log entries.
///
/// Exercises and sets keep their input order. Exercises left without any
/// set are omitted.
pub fn exercises_to_save(exercises: &[ActiveExercise]) -> Vec<SavedWorkoutEntry> {
    exercises
        .iter()
        .filter_map(|exercise| {
            let sets: Vec<SavedSet> = exercise
                .sets
                .iter()
                .filter(|s| is_worth_saving(s))
                .map(to_saved)
                .collect();

            if sets.is_empty() {
                tracing::trace!("Nothing to save for {}", exercise.id());
                return None;
            }

            Some(SavedWorkoutEntry {
                exercise_id: exercise.definition.id.clone(),
                exercise_name: exercise.definition.name.clone(),
                sets,
            })
        })
        .collect()
}
