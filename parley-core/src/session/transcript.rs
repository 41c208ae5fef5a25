//! Transcript storage for saved sessions

use super::store::Session;
use crate::utils::ensure_dir;
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tracing::debug;

const TRANSCRIPT_PREFIX: &str = "conversation_";
const TRANSCRIPT_EXT: &str = "json";

/// Reads and writes session transcripts
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    /// Default directory for auto-named transcripts
    dir: PathBuf,
}

impl TranscriptStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first auto-named save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get the storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for an auto-named transcript taken at `at`.
    ///
    /// Names have one-second resolution; two saves within the same second
    /// map to the same file.
    pub fn auto_path<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.dir.join(format!(
            "{}{}.{}",
            TRANSCRIPT_PREFIX,
            at.format("%Y%m%d_%H%M%S"),
            TRANSCRIPT_EXT
        ))
    }

    /// Save a session. Without an explicit path the transcript is written to
    /// the storage directory under a timestamped name.
    pub fn save(&self, session: &Session, path: Option<&Path>) -> crate::Result<PathBuf> {
        let path = match path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                path.to_path_buf()
            }
            None => {
                ensure_dir(&self.dir)?;
                self.auto_path(&Local::now())
            }
        };

        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, content)?;
        debug!(path = %path.display(), turns = session.len(), "Saved transcript");
        Ok(path)
    }

    /// Load a session from disk.
    ///
    /// A relative path that does not exist as given is also looked up inside
    /// the storage directory, so names printed by `list` can be used directly.
    pub fn load(&self, path: &Path) -> crate::Result<Session> {
        let resolved = self
            .resolve(path)
            .ok_or_else(|| crate::Error::NotFound(path.to_path_buf()))?;

        let content = std::fs::read(&resolved)?;
        let session: Session = serde_json::from_slice(&content).map_err(|e| {
            crate::Error::MalformedTranscript {
                path: resolved.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(path = %resolved.display(), turns = session.len(), "Loaded transcript");
        Ok(session)
    }

    /// List saved transcripts in the storage directory, newest first
    pub fn list(&self) -> crate::Result<Vec<TranscriptInfo>> {
        let mut transcripts = Vec::new();

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(transcripts),
            Err(e) => return Err(e.into()),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TRANSCRIPT_EXT)
            {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Local>::from);
            transcripts.push(TranscriptInfo {
                name: name.to_string(),
                path: path.clone(),
                modified,
            });
        }

        transcripts.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.name.cmp(&a.name)));
        Ok(transcripts)
    }

    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        if path.is_relative() {
            let candidate = self.dir.join(path);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }
}

/// Information about a saved transcript
#[derive(Debug, Clone)]
pub struct TranscriptInfo {
    /// File name
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Last modification time
    pub modified: Option<DateTime<Local>>,
}
