//! extsort - sort a directory's files into per-extension subdirectories
//!
//! This library moves every regular file directly inside a directory into a
//! subdirectory named after its upper-cased extension, records each move in a
//! persistent journal, and can reverse those moves one at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod journal;
pub mod logging;
#[cfg(test)]
mod log_capture;
pub mod output;
mod paths;
pub mod undo;

pub use config::{AppConfig, CompiledFilters, ConfigError};
pub use error::{OrganizeError, OrganizeResult};
pub use file_category::{Category, NO_EXTENSION};
pub use file_organizer::{FileOrganizer, OrganizeEvent, OrganizeReport, PlannedMove};
pub use journal::{MoveJournal, MoveRecord};
pub use undo::{UndoOutcome, UndoReport};

pub use cli::{Args, OrganizeCommand, run_cli};
