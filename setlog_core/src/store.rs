//! The workout session store.
//!
//! Holds the single in-progress workout and applies set mutations to it.
//! Every mutation writes the new state through to a [`SessionStorage`];
//! a failed write is logged and the in-memory state stays authoritative.
//!
//! Operations referring to an exercise or set that no longer exists are
//! silent no-ops, so a stale reference from the front end never faults.

use crate::log_store::LogSink;
use crate::save_filter::exercises_to_save;
use crate::storage::SessionStorage;
use crate::{
    ActiveExercise, ActiveSession, ExerciseDefinition, Result, RoutineLog, SessionState, SetEntry,
    SetId, SetUpdate, WorkoutSelection, DEFAULT_SET_COUNT,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Result of [`WorkoutSessionStore::commit`]
#[derive(Clone, Debug, PartialEq)]
pub enum CommitOutcome {
    /// The log was written and the session closed
    Saved(RoutineLog),
    /// No set met the save bar; the session is left untouched
    NothingToSave,
    /// There was no session to commit
    NoSession,
}

/// Owner of the in-progress session
pub struct WorkoutSessionStore<S: SessionStorage> {
    state: SessionState,
    storage: S,
    default_set_count: u32,
}

impl<S: SessionStorage> WorkoutSessionStore<S> {
    /// Open the store, rehydrating any session persisted in `storage`
    pub fn open(storage: S) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::NotStarted,
            Err(e) => {
                tracing::warn!("Failed to load persisted session: {}. Starting fresh.", e);
                SessionState::NotStarted
            }
        };

        if state.is_in_progress() {
            tracing::info!("Resuming workout in progress");
        }

        Self {
            state,
            storage,
            default_set_count: DEFAULT_SET_COUNT,
        }
    }

    /// Set count used for prescriptions without one
    pub fn with_default_set_count(mut self, count: u32) -> Self {
        self.default_set_count = count.max(1);
        self
    }

    pub fn default_set_count(&self) -> u32 {
        self.default_set_count
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.state.as_active()
    }

    pub fn is_in_progress(&self) -> bool {
        self.state.is_in_progress()
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&ActiveExercise> {
        self.session().and_then(|s| s.exercise(exercise_id))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        let result = match self.state {
            SessionState::NotStarted => self.storage.clear(),
            SessionState::InProgress(_) => self.storage.save(&self.state),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to persist session state: {}", e);
        }
    }

    /// Run `f` on the named exercise, persisting only if it reports a change
    fn mutate_exercise<F>(&mut self, exercise_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut ActiveExercise) -> bool,
    {
        let Some(session) = self.state.as_active_mut() else {
            tracing::debug!("Ignoring change to {}: no workout in progress", exercise_id);
            return false;
        };
        let Some(exercise) = session.exercise_mut(exercise_id) else {
            tracing::debug!("Ignoring change to unknown exercise {}", exercise_id);
            return false;
        };

        let changed = f(exercise);
        if changed {
            self.persist();
        }
        changed
    }

    fn mutate_set<F>(&mut self, exercise_id: &str, set_id: SetId, f: F) -> bool
    where
        F: FnOnce(&mut SetEntry),
    {
        self.mutate_exercise(exercise_id, |exercise| match exercise.set_mut(set_id) {
            Some(set) => {
                f(set);
                true
            }
            None => {
                tracing::debug!("Ignoring change to unknown set {} of {}", set_id, exercise_id);
                false
            }
        })
    }

    /// Start a workout now, replacing any session in progress
    pub fn start_workout(&mut self, selection: WorkoutSelection, exercises: &[ExerciseDefinition]) {
        self.start_workout_at(selection, exercises, Utc::now());
    }

    pub fn start_workout_at(
        &mut self,
        selection: WorkoutSelection,
        exercises: &[ExerciseDefinition],
        now: DateTime<Utc>,
    ) {
        if self.is_in_progress() {
            tracing::info!("Discarding unsaved workout to start a new one");
        }

        let exercises: Vec<ActiveExercise> = exercises
            .iter()
            .map(|def| ActiveExercise::from_definition(def, self.default_set_count))
            .collect();
        let active_exercise_id = exercises.first().map(|e| e.id().to_string());

        tracing::info!(
            "Started workout {:?}/{:?} with {} exercises",
            selection.routine_id,
            selection.day_id,
            exercises.len()
        );

        self.state = SessionState::InProgress(ActiveSession {
            start_time: now,
            routine_id: selection.routine_id,
            routine_title: selection.routine_title,
            day_id: selection.day_id,
            day_title: selection.day_title,
            exercises,
            active_exercise_id,
        });
        self.persist();
    }

    /// Merge `update` into one set
    pub fn update_set(&mut self, exercise_id: &str, set_id: SetId, update: &SetUpdate) {
        self.mutate_set(exercise_id, set_id, |set| set.apply(update));
    }

    pub fn toggle_set_complete(&mut self, exercise_id: &str, set_id: SetId) {
        self.mutate_set(exercise_id, set_id, |set| set.completed = !set.completed);
    }

    /// Append a set that starts from the last set's weight and reps.
    ///
    /// Returns the new set's id, or `None` if the exercise is unknown.
    pub fn add_set(&mut self, exercise_id: &str) -> Option<SetId> {
        let mut added = None;
        self.mutate_exercise(exercise_id, |exercise| {
            let mut set = SetEntry::blank();
            if let Some(last) = exercise.sets.last() {
                set.weight = last.weight.clone();
                set.reps = last.reps.clone();
            }
            added = Some(set.id);
            exercise.sets.push(set);
            true
        });
        added
    }

    /// Remove exactly one set. No minimum set count is enforced here.
    pub fn remove_set(&mut self, exercise_id: &str, set_id: SetId) {
        self.mutate_exercise(exercise_id, |exercise| {
            match exercise.sets.iter().position(|s| s.id == set_id) {
                Some(index) => {
                    exercise.sets.remove(index);
                    true
                }
                None => {
                    tracing::debug!(
                        "Ignoring removal of unknown set {} of {}",
                        set_id,
                        exercise_id
                    );
                    false
                }
            }
        });
    }

    /// Replace an exercise's sets with a pre-filled draft
    pub fn prefill_sets(&mut self, exercise_id: &str, sets: Vec<SetEntry>) {
        self.mutate_exercise(exercise_id, |exercise| {
            exercise.sets = sets;
            true
        });
    }

    /// Move focus to another exercise of the session
    pub fn set_active_exercise(&mut self, exercise_id: &str) {
        let changed = match self.state.as_active_mut() {
            Some(session) if session.exercise(exercise_id).is_some() => {
                session.active_exercise_id = Some(exercise_id.to_string());
                true
            }
            _ => false,
        };

        if changed {
            self.persist();
        }
    }

    /// Close the session after it was saved. Harmless when none is running.
    pub fn finish_workout(&mut self) {
        if self.is_in_progress() {
            tracing::info!("Workout finished");
        }
        self.reset();
    }

    /// Discard the session without saving
    pub fn cancel_workout(&mut self) {
        if self.is_in_progress() {
            tracing::info!("Workout cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SessionState::NotStarted;
        self.persist();
    }

    /// Save the session through `sink` and finish it.
    ///
    /// Nothing is written, and the session stays open, when the save filter
    /// keeps no sets. A failing sink leaves the session open as well.
    pub fn commit<L: LogSink>(
        &mut self,
        sink: &mut L,
        now: DateTime<Utc>,
    ) -> Result<CommitOutcome> {
        let session = match self.state.as_active() {
            Some(session) => session,
            None => return Ok(CommitOutcome::NoSession),
        };

        let entries = exercises_to_save(&session.exercises);
        if entries.is_empty() {
            tracing::info!("Nothing to save in current workout");
            return Ok(CommitOutcome::NothingToSave);
        }

        let WorkoutSelection {
            routine_id,
            routine_title,
            day_id,
            day_title,
        } = session.selection();
        let log = RoutineLog {
            id: Uuid::new_v4().to_string(),
            date: now,
            routine_id,
            routine_title,
            day_id,
            day_title,
            entries,
        };

        sink.append(&log)?;
        tracing::info!(
            "Saved workout log {} with {} exercises",
            log.id,
            log.entries.len()
        );

        self.finish_workout();
        Ok(CommitOutcome::Saved(log))
    }
}
