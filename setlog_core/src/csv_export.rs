//! CSV export of the workout log.
//!
//! One row per saved set. The file is written to a temp file and renamed
//! into place, so a failed export never leaves a half-written CSV behind.

use crate::{Error, Result, RoutineLog};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    log_id: &'a str,
    date: String,
    routine_id: Option<&'a str>,
    day_id: Option<&'a str>,
    exercise_id: &'a str,
    exercise_name: &'a str,
    set_number: usize,
    weight: f64,
    reps: f64,
    rir: f64,
}

/// Write every set of `logs` to `path`, replacing any existing file.
///
/// Logs are written oldest first. Returns the number of rows written.
pub fn export_routine_logs(logs: &[RoutineLog], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut ordered: Vec<&RoutineLog> = logs.iter().collect();
    ordered.sort_by_key(|log| log.date);

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut rows = 0;
    for log in ordered {
        let date = log.date.to_rfc3339();
        for entry in &log.entries {
            for (index, set) in entry.sets.iter().enumerate() {
                writer.serialize(CsvRow {
                    log_id: &log.id,
                    date: date.clone(),
                    routine_id: log.routine_id.as_deref(),
                    day_id: log.day_id.as_deref(),
                    exercise_id: &entry.exercise_id,
                    exercise_name: &entry.exercise_name,
                    set_number: index + 1,
                    weight: set.weight,
                    reps: set.reps,
                    rir: set.rir,
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets to {:?}", rows, path);
    Ok(rows)
}
