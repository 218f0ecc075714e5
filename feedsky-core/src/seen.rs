//! Record of entries already posted.
//!
//! By default the record lives only for one process. With a state path configured it is
//! loaded from and written back to a small JSON file, which makes repeated runs against
//! the same feed skip entries they already posted.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::StateError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    posted: BTreeSet<String>,
}

/// Fingerprints of posted entry ids, optionally backed by a file.
#[derive(Debug, Default)]
pub struct SeenEntries {
    fingerprints: BTreeSet<String>,
    path: Option<PathBuf>,
}

impl SeenEntries {
    /// A record discarded at process exit.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the record at `path`. A missing file is an empty record.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let fingerprints = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<StateFile>(&content)?.posted,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file yet, starting empty");
                BTreeSet::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), posted = fingerprints.len(), "Loaded posted-entry state");
        Ok(Self {
            fingerprints,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn contains(&self, entry_id: &str) -> bool {
        self.fingerprints.contains(&fingerprint(entry_id))
    }

    pub fn mark(&mut self, entry_id: &str) {
        self.fingerprints.insert(fingerprint(entry_id));
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Write the record back to its file. No-op for an in-memory record.
    ///
    /// The file is replaced atomically via a temp file in the same directory.
    pub fn persist(&self) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let state = StateFile {
            posted: self.fingerprints.clone(),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &state)?;
        tmp.write_all(b"\n")?;
        tmp.persist(path)?;
        debug!(path = %path.display(), posted = self.fingerprints.len(), "Persisted posted-entry state");
        Ok(())
    }
}

/// SHA-256 hex digest of an entry id.
pub fn fingerprint(entry_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry_id.as_bytes());
    format!("{:x}", hasher.finalize())
}
