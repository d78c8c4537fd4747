//! Error types for organizing and undoing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while organizing a directory or replaying the journal.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target directory could not be listed.
    #[error("Cannot read directory {}: {source}", path.display())]
    Enumeration { path: PathBuf, source: io::Error },

    /// A category directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation { path: PathBuf, source: io::Error },

    /// A file could not be moved.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// The journal file exists but does not hold a list of moves.
    #[error("Journal {} is corrupt: {reason}", path.display())]
    StorageCorrupt { path: PathBuf, reason: String },

    /// The journal file exists but could not be read.
    #[error("Failed to read journal {}: {source}", path.display())]
    StorageRead { path: PathBuf, source: io::Error },

    /// The journal could not be written.
    #[error("Failed to write journal {}: {source}", path.display())]
    StorageWrite { path: PathBuf, source: io::Error },
}

/// Result type for organize and journal operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
