//! Persistent journal of performed moves.
//!
//! The journal is an ordered list of [`MoveRecord`]s kept in memory and mirrored
//! to a JSON file. Every mutation writes the whole list to a temporary file in
//! the same directory and renames it over the journal, so a crash never leaves a
//! half-written history behind. Undo is implemented in [`crate::undo`].

use crate::error::{OrganizeError, OrganizeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// One completed file relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Where the file was before it was moved.
    #[serde(alias = "src")]
    pub source: PathBuf,
    /// Where the file was moved to.
    #[serde(alias = "dest")]
    pub destination: PathBuf,
}

impl MoveRecord {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Ordered, durable record of moves. The last record is the next one undone.
#[derive(Debug)]
pub struct MoveJournal {
    path: PathBuf,
    pub(crate) records: Vec<MoveRecord>,
}

impl MoveJournal {
    /// Loads the journal stored at `path`.
    ///
    /// A missing or empty file yields an empty journal. Content that is not a
    /// JSON list of moves is reported as [`OrganizeError::StorageCorrupt`]
    /// instead of being discarded.
    pub fn load(path: impl Into<PathBuf>) -> OrganizeResult<Self> {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(journal = %path.display(), "No journal file, starting empty");
                return Ok(Self {
                    path,
                    records: Vec::new(),
                });
            }
            Err(e) => return Err(OrganizeError::StorageRead { path, source: e }),
        };

        let records = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content).map_err(|e| OrganizeError::StorageCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?
        };

        Ok(Self { path, records })
    }

    /// Appends a record and persists the journal.
    ///
    /// If the journal cannot be written the record is dropped again, so memory
    /// and disk stay identical.
    pub fn append(&mut self, record: MoveRecord) -> OrganizeResult<()> {
        self.records.push(record);
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded moves, oldest first.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// The move the next undo would reverse.
    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the full record list to disk, replacing the previous file atomically.
    pub(crate) fn persist(&self) -> OrganizeResult<()> {
        let write_error = |source: io::Error| OrganizeError::StorageWrite {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_error)?;

        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(write_error)?;
        temp.write_all(json.as_bytes()).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(&self.path).map_err(|e| write_error(e.error))?;

        debug!(journal = %self.path.display(), records = self.records.len(), "Journal saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn journal_in(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("journal.json")
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let journal = MoveJournal::load(journal_in(&temp_dir)).expect("Failed to load journal");

        assert!(journal.is_empty());
        assert!(!journal.path().exists());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = journal_in(&temp_dir);
        fs::write(&path, "  \n").expect("Failed to write journal");

        let journal = MoveJournal::load(&path).expect("Failed to load journal");
        assert!(journal.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = journal_in(&temp_dir);
        fs::write(&path, "{ not json").expect("Failed to write journal");

        let result = MoveJournal::load(&path);
        assert!(matches!(result, Err(OrganizeError::StorageCorrupt { .. })));
    }

    #[test]
    fn test_load_wrong_structure_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = journal_in(&temp_dir);
        fs::write(&path, r#"{"source": "/a", "destination": "/b"}"#)
            .expect("Failed to write journal");

        let result = MoveJournal::load(&path);
        assert!(matches!(result, Err(OrganizeError::StorageCorrupt { .. })));
    }

    #[test]
    fn test_load_accepts_short_field_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = journal_in(&temp_dir);
        fs::write(&path, r#"[{"src": "/in/a.txt", "dest": "/in/TXT/a.txt"}]"#)
            .expect("Failed to write journal");

        let journal = MoveJournal::load(&path).expect("Failed to load journal");
        assert_eq!(
            journal.records(),
            &[MoveRecord::new("/in/a.txt", "/in/TXT/a.txt")]
        );
    }

    #[test]
    fn test_append_is_persisted_in_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = journal_in(&temp_dir);

        let mut journal = MoveJournal::load(&path).expect("Failed to load journal");
        journal
            .append(MoveRecord::new("/d/a.txt", "/d/TXT/a.txt"))
            .expect("Failed to append");
        journal
            .append(MoveRecord::new("/d/b.pdf", "/d/PDF/b.pdf"))
            .expect("Failed to append");

        let reloaded = MoveJournal::load(&path).expect("Failed to reload journal");
        assert_eq!(reloaded.records(), journal.records());
        assert_eq!(
            reloaded.last(),
            Some(&MoveRecord::new("/d/b.pdf", "/d/PDF/b.pdf"))
        );
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("state").join("nested").join("journal.json");

        let mut journal = MoveJournal::load(&path).expect("Failed to load journal");
        journal
            .append(MoveRecord::new("/d/a", "/d/NO_EXTENSION/a"))
            .expect("Failed to append");

        assert!(path.is_file());
    }

    #[test]
    fn test_failed_append_rolls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A regular file where the parent directory should be makes every write fail.
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").expect("Failed to write blocker");

        let mut journal = MoveJournal {
            path: blocker.join("journal.json"),
            records: Vec::new(),
        };
        let result = journal.append(MoveRecord::new("/d/a.txt", "/d/TXT/a.txt"));

        assert!(matches!(result, Err(OrganizeError::StorageWrite { .. })));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = journal_in(&temp_dir);

        let mut journal = MoveJournal::load(&path).expect("Failed to load journal");
        for i in 0..3 {
            journal
                .append(MoveRecord::new(format!("/d/{i}.txt"), format!("/d/TXT/{i}.txt")))
                .expect("Failed to append");
        }

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Failed to read dir")
            .flatten()
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
