//! Persistence of the in-progress session.
//!
//! The whole [`SessionState`] lives under one well-known key. On disk that
//! key is a single JSON file, written atomically with file locking; the
//! file is removed when the session finishes or is cancelled.

use crate::{Error, Result, SessionState};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the persisted session inside the data directory
pub const SESSION_STATE_FILE: &str = "active_session.json";

/// Bumped whenever the persisted session shape changes
pub const SESSION_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

/// Storage backend for the session store's write-through copy
pub trait SessionStorage {
    /// Read the persisted session, `None` if nothing usable is stored
    fn load(&self) -> Result<Option<SessionState>>;

    fn save(&mut self, state: &SessionState) -> Result<()>;

    /// Remove the persisted session entirely
    fn clear(&mut self) -> Result<()>;
}

fn encode(state: &SessionState) -> Result<String> {
    let envelope = Envelope {
        version: SESSION_FORMAT_VERSION,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a persisted session, discarding unknown versions
fn decode(contents: &str, origin: &str) -> Option<SessionState> {
    let envelope = match serde_json::from_str::<Envelope<serde_json::Value>>(contents) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Failed to parse session in {}: {}. Discarding.", origin, e);
            return None;
        }
    };

    if envelope.version != SESSION_FORMAT_VERSION {
        tracing::warn!(
            "Session in {} has format version {} (expected {}). Discarding.",
            origin,
            envelope.version,
            SESSION_FORMAT_VERSION
        );
        return None;
    }

    match serde_json::from_value::<SessionState>(envelope.state) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!("Invalid session state in {}: {}. Discarding.", origin, e);
            None
        }
    }
}

// ============================================================================
// File Storage
// ============================================================================

/// Session storage backed by a JSON file
#[derive(Clone, Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the standard location inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    /// Load with a shared lock.
    ///
    /// Unreadable or corrupted files are logged and treated as absent.
    fn load(&self) -> Result<Option<SessionState>> {
        let path = &self.path;
        if !path.exists() {
            tracing::debug!("No persisted session at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open session file {:?}: {}. Ignoring.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock session file {:?}: {}. Ignoring.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read session file {:?}: {}. Ignoring.", path, e);
            return Ok(None);
        }

        file.unlock()?;

        let state = decode(&contents, &path.display().to_string());
        if state.is_some() {
            tracing::debug!("Rehydrated session from {:?}", path);
        }
        Ok(state)
    }

    /// Atomically replace the session file (temp file, fsync, rename)
    fn save(&mut self, state: &SessionState) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::State(format!("session path {:?} has no parent", self.path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(encode(state)?.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session to {:?}", self.path);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Removed session file {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-Memory Storage
// ============================================================================

/// Session storage kept in process memory.
///
/// Holds the encoded form so that loads go through the same
/// decode path as the file backend.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStorage {
    contents: Option<String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is currently stored under the key
    pub fn contains_session(&self) -> bool {
        self.contents.is_some()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<SessionState>> {
        Ok(self
            .contents
            .as_deref()
            .and_then(|contents| decode(contents, "memory")))
    }

    fn save(&mut self, state: &SessionState) -> Result<()> {
        self.contents = Some(encode(state)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.contents = None;
        Ok(())
    }
}
