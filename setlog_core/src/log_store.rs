//! JSON Lines workout log files.
//!
//! Finished workouts are appended to a JSONL file with file locking. Two
//! log shapes are read back for history: whole-workout [`RoutineLog`]s and
//! per-exercise [`ExerciseLog`]s.

use crate::{ExerciseLog, Result, RoutineLog};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Whole-workout log file inside the data directory
pub const ROUTINE_LOG_FILE: &str = "logs/routine_logs.jsonl";

/// Per-exercise log file inside the data directory
pub const EXERCISE_LOG_FILE: &str = "logs/exercise_logs.jsonl";

/// Destination for finished workouts
pub trait LogSink {
    fn append(&mut self, log: &RoutineLog) -> Result<()>;
}

/// JSONL-backed log file with exclusive locking on append
pub struct JsonlLogStore {
    path: PathBuf,
}

impl JsonlLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line<T: Serialize>(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;
        Ok(())
    }

    /// Append a per-exercise log record
    pub fn append_exercise_log(&mut self, log: &ExerciseLog) -> Result<()> {
        self.append_line(log)?;
        tracing::debug!("Appended exercise log {} to {:?}", log.id, self.path);
        Ok(())
    }
}

impl LogSink for JsonlLogStore {
    fn append(&mut self, log: &RoutineLog) -> Result<()> {
        self.append_line(log)?;
        tracing::debug!("Appended routine log {} to {:?}", log.id, self.path);
        Ok(())
    }
}

fn read_jsonl<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, bytes) in reader.split(b'\n').enumerate() {
        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(
                    "Skipping non-UTF-8 {} at {:?} line {}: {}",
                    kind,
                    path,
                    line_num + 1,
                    e
                );
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                // Skip the bad line, keep the rest of the history
                tracing::warn!(
                    "Failed to parse {} at {:?} line {}: {}",
                    kind,
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} {}s from {:?}", records.len(), kind, path);
    Ok(records)
}

/// Read all whole-workout logs from a JSONL file
pub fn read_routine_logs(path: &Path) -> Result<Vec<RoutineLog>> {
    read_jsonl(path, "routine log")
}

/// Read all per-exercise logs from a JSONL file
pub fn read_exercise_logs(path: &Path) -> Result<Vec<ExerciseLog>> {
    read_jsonl(path, "exercise log")
}
