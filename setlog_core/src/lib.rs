#![forbid(unsafe_code)]

//! Core of setlog: the active-workout session engine.
//!
//! This crate provides:
//! - Domain types (sets, exercises, session state, log records)
//! - The workout session store and its write-through persistence
//! - The save filter deciding what reaches the workout log
//! - History reconciliation across per-exercise and whole-workout logs
//! - Routine catalog, JSONL log files and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod storage;
pub mod log_store;
pub mod save_filter;
pub mod store;
pub mod history;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{get_default_catalog, Routine, RoutineCatalog, RoutineDay};
pub use config::Config;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use log_store::{read_exercise_logs, read_routine_logs, JsonlLogStore, LogSink};
pub use save_filter::exercises_to_save;
pub use store::{CommitOutcome, WorkoutSessionStore};
pub use history::{merge_exercise_history, ExerciseHistory};
pub use csv_export::export_routine_logs;
