/// Undo functionality for reverting file organization operations.
///
/// Moves are reversed one at a time, newest first. A record only leaves the
/// journal once its file is back at the original location, so a failed undo
/// can simply be retried after the underlying problem is fixed.
use crate::error::OrganizeError;
use crate::journal::{MoveJournal, MoveRecord};
use crate::paths::move_file;
use tracing::{info, warn};

/// Result of a single undo step.
#[derive(Debug)]
pub enum UndoOutcome {
    /// The file was moved back and the record removed from the journal.
    Undone(MoveRecord),
    /// The journal was empty.
    NothingToUndo,
    /// The file could not be moved back. The record is still in the journal.
    Failed {
        record: MoveRecord,
        error: OrganizeError,
    },
}

impl UndoOutcome {
    pub fn is_undone(&self) -> bool {
        matches!(self, Self::Undone(_))
    }
}

/// Represents the result of undoing a whole run of moves.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Records restored, in the order they were undone.
    pub restored: Vec<MoveRecord>,
    /// The undo that stopped the walk, if any.
    pub failure: Option<(MoveRecord, OrganizeError)>,
}

impl UndoReport {
    /// Returns true if every recorded move was reverted.
    pub fn is_complete_success(&self) -> bool {
        self.failure.is_none()
    }
}

impl MoveJournal {
    /// Reverses the most recent move.
    ///
    /// The file at `destination` is moved back to `source`. An existing entry at
    /// `source` is never overwritten; that case counts as a failed undo.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extsort::{MoveJournal, UndoOutcome};
    ///
    /// let mut journal = MoveJournal::load("/tmp/journal.json").unwrap();
    /// match journal.undo_last() {
    ///     UndoOutcome::Undone(record) => println!("Restored {}", record.source.display()),
    ///     UndoOutcome::NothingToUndo => println!("Nothing to undo"),
    ///     UndoOutcome::Failed { error, .. } => eprintln!("Undo failed: {error}"),
    /// }
    /// ```
    pub fn undo_last(&mut self) -> UndoOutcome {
        let Some(record) = self.records.last().cloned() else {
            return UndoOutcome::NothingToUndo;
        };

        if let Err(e) = move_file(&record.destination, &record.source) {
            let error = OrganizeError::Move {
                from: record.destination.clone(),
                to: record.source.clone(),
                source: e,
            };
            return UndoOutcome::Failed { record, error };
        }

        self.records.pop();
        if let Err(error) = self.persist() {
            // Put the file back where the journal still says it is.
            if let Err(e) = move_file(&record.source, &record.destination) {
                warn!(
                    path = %record.source.display(),
                    "Could not return file after journal write failure: {e}"
                );
            }
            self.records.push(record.clone());
            return UndoOutcome::Failed { record, error };
        }

        info!(
            src = %record.destination.display(),
            dest = %record.source.display(),
            "Undo move"
        );
        UndoOutcome::Undone(record)
    }

    /// Undoes every recorded move, newest first, stopping at the first failure.
    pub fn undo_all(&mut self) -> UndoReport {
        let mut report = UndoReport::default();
        loop {
            match self.undo_last() {
                UndoOutcome::Undone(record) => report.restored.push(record),
                UndoOutcome::NothingToUndo => break,
                UndoOutcome::Failed { record, error } => {
                    report.failure = Some((record, error));
                    break;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Moves `name` from `base` into `base/<category>` and journals it.
    fn record_move(journal: &mut MoveJournal, base: &Path, name: &str, category: &str) {
        let source = base.join(name);
        let category_dir = base.join(category);
        fs::create_dir_all(&category_dir).expect("Failed to create category directory");
        let destination = category_dir.join(name);
        fs::rename(&source, &destination).expect("Failed to move file");
        journal
            .append(MoveRecord::new(source, destination))
            .expect("Failed to append record");
    }

    fn setup() -> (TempDir, TempDir, MoveJournal) {
        let work = TempDir::new().expect("Failed to create temp directory");
        let state = TempDir::new().expect("Failed to create temp directory");
        let journal =
            MoveJournal::load(state.path().join("journal.json")).expect("Failed to load journal");
        (work, state, journal)
    }

    #[test]
    fn test_undo_empty_journal() {
        let (_work, state, mut journal) = setup();

        assert!(matches!(journal.undo_last(), UndoOutcome::NothingToUndo));
        assert!(!state.path().join("journal.json").exists());
    }

    #[test]
    fn test_undo_single_file() {
        let (work, _state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("test.txt"), "test content").expect("Failed to write test file");
        record_move(&mut journal, base, "test.txt", "TXT");

        let outcome = journal.undo_last();

        assert!(outcome.is_undone());
        assert!(base.join("test.txt").exists());
        assert!(!base.join("TXT").join("test.txt").exists());
        assert!(journal.is_empty());
    }

    #[test]
    fn test_undo_is_last_in_first_out() {
        let (work, _state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("image.png"), "image data").expect("Failed to write file1");
        fs::write(base.join("document.pdf"), "pdf data").expect("Failed to write file2");
        record_move(&mut journal, base, "image.png", "PNG");
        record_move(&mut journal, base, "document.pdf", "PDF");

        match journal.undo_last() {
            UndoOutcome::Undone(record) => assert_eq!(record.source, base.join("document.pdf")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(base.join("document.pdf").exists());
        assert!(base.join("PNG").join("image.png").exists());

        match journal.undo_last() {
            UndoOutcome::Undone(record) => assert_eq!(record.source, base.join("image.png")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(journal.undo_last(), UndoOutcome::NothingToUndo));
    }

    #[test]
    fn test_undo_with_missing_file_keeps_record() {
        let (work, state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("gone.txt"), "data").expect("Failed to write file");
        record_move(&mut journal, base, "gone.txt", "TXT");
        fs::remove_file(base.join("TXT").join("gone.txt")).expect("Failed to delete file");

        let outcome = journal.undo_last();

        assert!(matches!(
            outcome,
            UndoOutcome::Failed {
                error: OrganizeError::Move { .. },
                ..
            }
        ));
        assert_eq!(journal.len(), 1);
        let reloaded =
            MoveJournal::load(state.path().join("journal.json")).expect("Failed to reload");
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_failed_undo_is_left_to_the_caller_to_log() {
        let (work, _state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("gone.txt"), "data").expect("Failed to write file");
        record_move(&mut journal, base, "gone.txt", "TXT");
        fs::remove_file(base.join("TXT").join("gone.txt")).expect("Failed to delete file");

        let (outcome, logs) = crate::log_capture::capture_logs(|| journal.undo_last());

        assert!(!outcome.is_undone());
        assert!(!logs.contains("ERROR"), "unexpected error line in {logs}");
    }

    #[test]
    fn test_undo_retry_after_fix() {
        let (work, _state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("note.md"), "data").expect("Failed to write file");
        record_move(&mut journal, base, "note.md", "MD");
        let moved = base.join("MD").join("note.md");
        let parked = base.join("parked.md");
        fs::rename(&moved, &parked).expect("Failed to park file");

        assert!(!journal.undo_last().is_undone());

        fs::rename(&parked, &moved).expect("Failed to restore file");
        assert!(journal.undo_last().is_undone());
        assert!(base.join("note.md").exists());
    }

    #[test]
    fn test_undo_does_not_overwrite_original_location() {
        let (work, _state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("test.txt"), "original content").expect("Failed to write file");
        record_move(&mut journal, base, "test.txt", "TXT");
        fs::write(base.join("test.txt"), "new content").expect("Failed to create conflict");

        let outcome = journal.undo_last();

        assert!(!outcome.is_undone());
        assert_eq!(
            fs::read_to_string(base.join("test.txt")).expect("Failed to read"),
            "new content"
        );
        assert_eq!(
            fs::read_to_string(base.join("TXT").join("test.txt")).expect("Failed to read"),
            "original content"
        );
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_undo_all_restores_everything() {
        let (work, state, mut journal) = setup();
        let base = work.path();
        for name in ["a.txt", "b.txt", "c.jpg"] {
            fs::write(base.join(name), name).expect("Failed to write file");
        }
        record_move(&mut journal, base, "a.txt", "TXT");
        record_move(&mut journal, base, "b.txt", "TXT");
        record_move(&mut journal, base, "c.jpg", "JPG");

        let report = journal.undo_all();

        assert!(report.is_complete_success());
        assert_eq!(report.restored.len(), 3);
        for name in ["a.txt", "b.txt", "c.jpg"] {
            assert!(base.join(name).exists());
        }
        let reloaded =
            MoveJournal::load(state.path().join("journal.json")).expect("Failed to reload");
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_undo_all_stops_at_failure() {
        let (work, _state, mut journal) = setup();
        let base = work.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write file");
        fs::write(base.join("b.txt"), "b").expect("Failed to write file");
        record_move(&mut journal, base, "a.txt", "TXT");
        record_move(&mut journal, base, "b.txt", "TXT");
        fs::remove_file(base.join("TXT").join("a.txt")).expect("Failed to delete file");

        let report = journal.undo_all();

        assert!(!report.is_complete_success());
        assert_eq!(report.restored.len(), 1);
        assert_eq!(journal.len(), 1);
        assert_eq!(
            journal.last().map(|r| r.source.clone()),
            Some(base.join("a.txt"))
        );
    }
}
