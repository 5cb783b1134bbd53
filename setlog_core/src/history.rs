//! Exercise history reconciliation.
//!
//! History for one exercise comes from two places: per-exercise logs, which
//! are authoritative, and older whole-workout logs that embed an entry per
//! exercise. The same workout can show up in both, so records closer than
//! a dedup window are collapsed, keeping the per-exercise copy.

use crate::{EditableNumber, ExerciseLog, LoggedSet, RoutineLog, SetEntry};
use chrono::{Duration, Local, NaiveDate};

/// Default window inside which two records count as one workout
pub fn default_dedup_window() -> Duration {
    Duration::seconds(60)
}

/// Build a transient per-exercise record from a whole-workout log.
///
/// Returns `None` when the workout has no sets for the exercise. Every set
/// is marked complete since a saved workout was finished.
fn extract_from_routine_log(log: &RoutineLog, exercise_id: &str) -> Option<ExerciseLog> {
    let entry = log.entry_for(exercise_id)?;
    if entry.sets.is_empty() {
        return None;
    }

    Some(ExerciseLog {
        id: format!("{}_{}", log.id, exercise_id),
        exercise_id: exercise_id.to_string(),
        exercise_name: entry.exercise_name.clone(),
        date: log.date,
        sets: entry
            .sets
            .iter()
            .map(|s| LoggedSet {
                weight: s.weight,
                reps: s.reps,
                rir: s.rir,
                completed: true,
            })
            .collect(),
    })
}

/// Merge both log sources into one history for `exercise_id`.
///
/// Result is sorted newest first.
pub fn merge_exercise_history(
    exercise_id: &str,
    direct: &[ExerciseLog],
    legacy: &[RoutineLog],
    window: Duration,
) -> Vec<ExerciseLog> {
    let mut merged: Vec<ExerciseLog> = direct
        .iter()
        .filter(|log| log.exercise_id == exercise_id)
        .cloned()
        .collect();
    let direct_count = merged.len();

    for record in legacy
        .iter()
        .filter_map(|log| extract_from_routine_log(log, exercise_id))
    {
        let duplicate = merged
            .iter()
            .any(|existing| (existing.date - record.date).abs() < window);

        if duplicate {
            tracing::debug!("Dropping {} as a duplicate of an existing record", record.id);
        } else {
            merged.push(record);
        }
    }

    merged.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::debug!(
        "History for {}: {} direct, {} from workout logs",
        exercise_id,
        direct_count,
        merged.len() - direct_count
    );

    merged
}

/// Whether any record falls on `day` in local time
pub fn has_log_on(history: &[ExerciseLog], day: NaiveDate) -> bool {
    history
        .iter()
        .any(|log| log.date.with_timezone(&Local).date_naive() == day)
}

pub fn has_log_today(history: &[ExerciseLog]) -> bool {
    has_log_on(history, Local::now().date_naive())
}

/// Draft sets for a new session, carrying weights over from `last`.
///
/// The draft has `prescribed` sets (or `default_count` when the prescription
/// is 0). Reps and RIR start blank; missing historical sets become blank sets.
pub fn prefill_sets(last: &ExerciseLog, prescribed: u32, default_count: u32) -> Vec<SetEntry> {
    let count = if prescribed > 0 {
        prescribed
    } else {
        default_count
    };

    (0..count as usize)
        .map(|i| {
            let mut set = SetEntry::blank();
            if let Some(previous) = last.sets.get(i) {
                set.weight = EditableNumber::from_number(previous.weight);
            }
            set
        })
        .collect()
}

/// Merged history of one exercise
#[derive(Clone, Debug)]
pub struct ExerciseHistory {
    entries: Vec<ExerciseLog>,
}

impl ExerciseHistory {
    pub fn build(
        exercise_id: &str,
        direct: &[ExerciseLog],
        legacy: &[RoutineLog],
        window: Duration,
    ) -> Self {
        Self {
            entries: merge_exercise_history(exercise_id, direct, legacy, window),
        }
    }

    /// Records, newest first
    pub fn entries(&self) -> &[ExerciseLog] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&ExerciseLog> {
        self.entries.first()
    }

    pub fn logged_on(&self, day: NaiveDate) -> bool {
        has_log_on(&self.entries, day)
    }

    pub fn logged_today(&self) -> bool {
        has_log_today(&self.entries)
    }

    /// Pre-filled sets for a session on `today`.
    ///
    /// `None` when the exercise was already logged that day or there is no
    /// earlier session to copy from.
    pub fn prefill_for(
        &self,
        prescribed: u32,
        default_count: u32,
        today: NaiveDate,
    ) -> Option<Vec<SetEntry>> {
        if self.logged_on(today) {
            return None;
        }
        self.latest()
            .map(|last| prefill_sets(last, prescribed, default_count))
    }
}
