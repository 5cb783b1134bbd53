//! Core domain types for the setlog workout session engine.
//!
//! This module defines:
//! - Editable set values (raw text until save time)
//! - Prescribed exercises and their live, in-session counterparts
//! - The session state machine
//! - Output shapes written to the workout log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of sets used when a prescription omits a set count
pub const DEFAULT_SET_COUNT: u32 = 3;

// ============================================================================
// Editable Values
// ============================================================================

/// A numeric field exactly as the user typed it.
///
/// Weight, reps and RIR stay as text while a set is being edited so that
/// partial input like `"82."` survives. Numbers are only read out at the
/// save boundary via [`EditableNumber::parse_or_zero`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditableNumber(String);

impl EditableNumber {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Render a stored number back into editable text (`80.0` becomes `"80"`)
    pub fn from_number(value: f64) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parse the text as a finite number, `None` when blank or unparsable
    pub fn parse_or_none(&self) -> Option<f64> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn parse_or_zero(&self) -> f64 {
        self.parse_or_none().unwrap_or(0.0)
    }
}

impl From<&str> for EditableNumber {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for EditableNumber {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for EditableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Sets
// ============================================================================

/// Opaque identifier of a set, unique within its exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(Uuid);

impl SetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One set as shown and edited during a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    pub id: SetId,
    pub weight: EditableNumber,
    pub reps: EditableNumber,
    pub rir: EditableNumber,
    pub completed: bool,
}

impl SetEntry {
    /// A fresh set with every field blank
    pub fn blank() -> Self {
        Self {
            id: SetId::new(),
            weight: EditableNumber::default(),
            reps: EditableNumber::default(),
            rir: EditableNumber::default(),
            completed: false,
        }
    }

    pub fn apply(&mut self, update: &SetUpdate) {
        if let Some(ref weight) = update.weight {
            self.weight = weight.clone();
        }
        if let Some(ref reps) = update.reps {
            self.reps = reps.clone();
        }
        if let Some(ref rir) = update.rir {
            self.rir = rir.clone();
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
    }
}

/// Partial set update; `None` fields are left untouched
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetUpdate {
    pub weight: Option<EditableNumber>,
    pub reps: Option<EditableNumber>,
    pub rir: Option<EditableNumber>,
    pub completed: Option<bool>,
}

impl SetUpdate {
    pub fn weight(mut self, weight: impl Into<EditableNumber>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    pub fn reps(mut self, reps: impl Into<EditableNumber>) -> Self {
        self.reps = Some(reps.into());
        self
    }

    pub fn rir(mut self, rir: impl Into<EditableNumber>) -> Self {
        self.rir = Some(rir.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.reps.is_none()
            && self.rir.is_none()
            && self.completed.is_none()
    }
}

// ============================================================================
// Exercises
// ============================================================================

/// A prescribed exercise as it appears in a routine day
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    /// Prescribed set count, 0 when the routine leaves it open
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub rep_range: String,
    #[serde(default)]
    pub rest: String,
    #[serde(default)]
    pub muscles: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl ExerciseDefinition {
    /// Sets to lay out for this exercise, falling back to `default_count`
    pub fn set_count_or(&self, default_count: u32) -> u32 {
        if self.sets > 0 {
            self.sets
        } else {
            default_count
        }
    }
}

/// An exercise inside an in-progress session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveExercise {
    pub definition: ExerciseDefinition,
    pub sets: Vec<SetEntry>,
    /// Set count prescribed when the session started
    pub original_sets: u32,
}

impl ActiveExercise {
    pub fn from_definition(definition: &ExerciseDefinition, default_count: u32) -> Self {
        let count = definition.set_count_or(default_count);
        Self {
            definition: definition.clone(),
            sets: (0..count).map(|_| SetEntry::blank()).collect(),
            original_sets: definition.sets,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn set(&self, set_id: SetId) -> Option<&SetEntry> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn set_mut(&mut self, set_id: SetId) -> Option<&mut SetEntry> {
        self.sets.iter_mut().find(|s| s.id == set_id)
    }

    pub fn completed_count(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Routine and day a session was started from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkoutSelection {
    pub routine_id: Option<String>,
    pub routine_title: Option<String>,
    pub day_id: Option<String>,
    pub day_title: Option<String>,
}

/// The workout currently being performed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub start_time: DateTime<Utc>,
    pub routine_id: Option<String>,
    pub routine_title: Option<String>,
    pub day_id: Option<String>,
    pub day_title: Option<String>,
    pub exercises: Vec<ActiveExercise>,
    pub active_exercise_id: Option<String>,
}

impl ActiveSession {
    pub fn exercise(&self, exercise_id: &str) -> Option<&ActiveExercise> {
        self.exercises.iter().find(|e| e.id() == exercise_id)
    }

    pub fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut ActiveExercise> {
        self.exercises.iter_mut().find(|e| e.id() == exercise_id)
    }

    pub fn selection(&self) -> WorkoutSelection {
        WorkoutSelection {
            routine_id: self.routine_id.clone(),
            routine_title: self.routine_title.clone(),
            day_id: self.day_id.clone(),
            day_title: self.day_title.clone(),
        }
    }
}

/// Whether a workout is in progress.
///
/// At most one session exists at a time; starting a new one replaces it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress(ActiveSession),
}

impl SessionState {
    pub fn as_active(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::InProgress(session) => Some(session),
            SessionState::NotStarted => None,
        }
    }

    pub fn as_active_mut(&mut self) -> Option<&mut ActiveSession> {
        match self {
            SessionState::InProgress(session) => Some(session),
            SessionState::NotStarted => None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, SessionState::InProgress(_))
    }
}

// ============================================================================
// Saved Output and Log Records
// ============================================================================

/// A set as written to the workout log
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSet {
    pub weight: f64,
    pub reps: f64,
    pub rir: f64,
}

/// All saved sets of one exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedWorkoutEntry {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: Vec<SavedSet>,
}

/// Whole-workout log record, one entry per exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutineLog {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub routine_id: Option<String>,
    #[serde(default)]
    pub routine_title: Option<String>,
    #[serde(default)]
    pub day_id: Option<String>,
    #[serde(default)]
    pub day_title: Option<String>,
    #[serde(default)]
    pub entries: Vec<SavedWorkoutEntry>,
}

impl RoutineLog {
    pub fn entry_for(&self, exercise_id: &str) -> Option<&SavedWorkoutEntry> {
        self.entries.iter().find(|e| e.exercise_id == exercise_id)
    }
}

/// A set inside a per-exercise log
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: f64,
    #[serde(default)]
    pub rir: f64,
    #[serde(default)]
    pub completed: bool,
}

/// Per-exercise log record, also the shape of reconciled history entries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: String,
    pub exercise_id: String,
    #[serde(default)]
    pub exercise_name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub sets: Vec<LoggedSet>,
}
