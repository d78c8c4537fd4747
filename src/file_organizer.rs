/// File organization system for moving files into category directories.
///
/// This module sorts the regular files directly inside a directory into
/// per-extension subdirectories. Every move is appended to a [`MoveJournal`]
/// right after it happens, so an interrupted pass can still be undone.
use crate::config::CompiledFilters;
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_category::Category;
use crate::journal::{MoveJournal, MoveRecord};
use crate::paths::{free_destination, move_file};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A move computed by a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

/// Summary of a completed organize pass.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Moves performed, in order.
    pub moves: Vec<MoveRecord>,
    /// Number of files moved into each category directory.
    pub categories: BTreeMap<String, usize>,
}

impl OrganizeReport {
    pub fn total(&self) -> usize {
        self.moves.len()
    }
}

/// Progress notifications emitted during [`FileOrganizer::organize_with`].
#[derive(Debug)]
pub enum OrganizeEvent<'a> {
    /// The directory was scanned; this many files will be moved.
    Scanned(usize),
    /// A file was moved and journaled.
    Moved(&'a MoveRecord),
}

/// Organizes files by moving them into extension subdirectories.
///
/// Only the immediate entries of the target directory are considered.
/// Directories (including category directories from earlier passes) are left
/// alone, so running it twice does not re-sort anything. A symlink counts as a
/// file when its target is a regular file; the link itself is moved.
#[derive(Debug, Default)]
pub struct FileOrganizer {
    filters: CompiledFilters,
    protected: Vec<PathBuf>,
}

impl FileOrganizer {
    pub fn new(filters: CompiledFilters) -> Self {
        Self {
            filters,
            protected: Vec::new(),
        }
    }

    /// Never move `path`, even if it sits in the directory being organized.
    ///
    /// Used for the diagnostic log and, in dry runs, the journal.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected.push(path.into());
        self
    }

    /// Moves every regular file in `dir` into `dir/<EXT>/` and journals each move.
    ///
    /// The pass stops at the first error. Moves done before the error remain in
    /// the journal and can be undone.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extsort::{FileOrganizer, MoveJournal};
    /// use std::path::Path;
    ///
    /// let mut journal = MoveJournal::load("/tmp/journal.json").unwrap();
    /// match FileOrganizer::default().organize(Path::new("/home/me/Downloads"), &mut journal) {
    ///     Ok(report) => println!("Moved {} files", report.total()),
    ///     Err(e) => eprintln!("Organization failed: {e}"),
    /// }
    /// ```
    pub fn organize(
        &self,
        dir: &Path,
        journal: &mut MoveJournal,
    ) -> OrganizeResult<OrganizeReport> {
        self.organize_with(dir, journal, |_| {})
    }

    /// Computes where each file would go without touching the filesystem.
    pub fn plan(&self, dir: &Path) -> OrganizeResult<Vec<PlannedMove>> {
        let (base, files) = self.snapshot(dir, None)?;
        Ok(files
            .into_iter()
            .map(|source| {
                let category = Category::of(&source);
                let destination = Self::destination_for(&base, &source, &category);
                PlannedMove {
                    source,
                    destination,
                    category,
                }
            })
            .collect())
    }

    /// Same as [`organize`](Self::organize), reporting progress through `on_event`.
    ///
    /// Errors are returned, not logged; the caller decides where they go.
    pub fn organize_with<F>(
        &self,
        dir: &Path,
        journal: &mut MoveJournal,
        mut on_event: F,
    ) -> OrganizeResult<OrganizeReport>
    where
        F: FnMut(OrganizeEvent<'_>),
    {
        let (base, files) = self.snapshot(dir, Some(journal.path()))?;
        info!(dir = %base.display(), files = files.len(), "Organizing directory");
        on_event(OrganizeEvent::Scanned(files.len()));

        let mut report = OrganizeReport::default();
        for source in files {
            let category = Category::of(&source);
            let record = Self::move_to_category(&base, &source, &category)?;

            if let Err(e) = journal.append(record.clone()) {
                // An unjournaled move could never be undone; put the file back.
                if let Err(restore) = move_file(&record.destination, &record.source) {
                    warn!(
                        path = %record.destination.display(),
                        "Could not return unjournaled file: {restore}"
                    );
                }
                return Err(e);
            }

            info!(
                src = %record.source.display(),
                dest = %record.destination.display(),
                "Moved"
            );
            on_event(OrganizeEvent::Moved(&record));
            *report
                .categories
                .entry(category.dir_name().to_string())
                .or_insert(0) += 1;
            report.moves.push(record);
        }

        info!(dir = %base.display(), moved = report.total(), "Organization complete");
        Ok(report)
    }

    /// Reads the directory once and returns its canonical path and the files to move,
    /// sorted by name.
    fn snapshot(
        &self,
        dir: &Path,
        journal: Option<&Path>,
    ) -> OrganizeResult<(PathBuf, Vec<PathBuf>)> {
        let enumeration_error = |source: std::io::Error| OrganizeError::Enumeration {
            path: dir.to_path_buf(),
            source,
        };

        let base = dunce::canonicalize(dir).map_err(enumeration_error)?;
        let entries = fs::read_dir(&base).map_err(enumeration_error)?;

        let protected: HashSet<PathBuf> = self
            .protected
            .iter()
            .map(PathBuf::as_path)
            .chain(journal)
            .filter_map(|p| dunce::canonicalize(p).ok())
            .collect();

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(enumeration_error)?;
            let path = entry.path();
            // Follows symlinks: a link to a regular file is moved as-is, while
            // dangling links and links to directories stay put.
            match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    debug!(path = %path.display(), "Skipping unreadable entry: {e}");
                    continue;
                }
            }

            if protected.contains(&path) {
                debug!(path = %path.display(), "Skipping protected file");
                continue;
            }
            if !self.filters.should_include(&path) {
                debug!(path = %path.display(), "Skipping filtered file");
                continue;
            }
            files.push(path);
        }
        files.sort();

        Ok((base, files))
    }

    fn destination_for(base: &Path, source: &Path, category: &Category) -> PathBuf {
        let category_dir = base.join(category.dir_name());
        match source.file_name() {
            Some(name) => free_destination(&category_dir.join(name)),
            None => category_dir,
        }
    }

    /// Moves one file into its category directory, creating the directory if needed.
    fn move_to_category(
        base: &Path,
        source: &Path,
        category: &Category,
    ) -> OrganizeResult<MoveRecord> {
        let category_dir = base.join(category.dir_name());
        fs::create_dir_all(&category_dir).map_err(|e| OrganizeError::DirectoryCreation {
            path: category_dir.clone(),
            source: e,
        })?;

        let destination = Self::destination_for(base, source, category);
        move_file(source, &destination).map_err(|e| OrganizeError::Move {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        Ok(MoveRecord::new(source, destination))
    }
}
