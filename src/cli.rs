//! Command-line interface module for extsort.
//!
//! This module handles all CLI-related functionality:
//! - argument parsing (clap)
//! - configuration resolution with command-line overrides
//! - organize, dry-run, undo and history commands and their output

use crate::config::{AppConfig, ConfigError};
use crate::file_organizer::{FileOrganizer, OrganizeEvent};
use crate::journal::MoveJournal;
use crate::output::OutputFormatter;
use crate::undo::UndoOutcome;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sort the files of a directory into per-extension subdirectories, with undo.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: OrganizeCommand,

    /// Configuration file (default: ./.extsortrc.toml, then the user config directory)
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Journal file used to record and undo moves
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub journal: Option<PathBuf>,

    /// Diagnostic log file
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Also print diagnostic log lines to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Subcommand, Debug, Clone)]
pub enum OrganizeCommand {
    /// Move each file in DIR into a subdirectory named after its extension
    Organize {
        /// Directory to organize
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,

        /// Only show what would be moved
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Move the most recently organized file back
    Undo {
        /// Undo every recorded move, newest first
        #[arg(short, long)]
        all: bool,
    },
    /// List recorded moves, newest first
    History,
}

impl Args {
    /// Loads the configuration and applies command-line overrides.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(journal) = &self.journal {
            config.journal.path = Some(journal.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.log.file = Some(log_file.clone());
        }
        Ok(config)
    }
}

/// Runs a command against the journal configured in `config`.
///
/// # Examples
///
/// ```no_run
/// use extsort::cli::{run_cli, OrganizeCommand};
/// use extsort::config::AppConfig;
///
/// let command = OrganizeCommand::Organize { dir: "/path/to/directory".into(), dry_run: true };
/// if let Err(e) = run_cli(&command, &AppConfig::default()) {
///     eprintln!("Error: {e:#}");
/// }
/// ```
pub fn run_cli(command: &OrganizeCommand, config: &AppConfig) -> Result<()> {
    let journal_path = config.journal_path();
    let mut journal = MoveJournal::load(&journal_path)?;

    match command {
        OrganizeCommand::Organize { dir, dry_run: true } => organize_dry_run(dir, config),
        OrganizeCommand::Organize { dir, dry_run: false } => {
            organize_directory(dir, config, &mut journal)
        }
        OrganizeCommand::Undo { all: false } => undo_last(&mut journal),
        OrganizeCommand::Undo { all: true } => undo_all(&mut journal),
        OrganizeCommand::History => {
            show_history(&journal);
            Ok(())
        }
    }
}

fn organizer(config: &AppConfig) -> Result<FileOrganizer> {
    let filters = config
        .filters
        .compile()
        .context("Error compiling filters")?;
    Ok(FileOrganizer::new(filters).protect(config.log_path()))
}

/// Organizes `dir` and records every move in the journal.
fn organize_directory(dir: &Path, config: &AppConfig, journal: &mut MoveJournal) -> Result<()> {
    OutputFormatter::info(&format!("Organizing contents of: {}", dir.display()));

    let organizer = organizer(config)?;
    let before = journal.len();
    let pb = OutputFormatter::create_progress_bar(0);

    let result = organizer.organize_with(dir, journal, |event| match event {
        OrganizeEvent::Scanned(total) => pb.set_length(total as u64),
        OrganizeEvent::Moved(record) => {
            pb.set_message(
                record
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            pb.inc(1);
        }
    });
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            let moved = journal.len().saturating_sub(before);
            if moved > 0 {
                OutputFormatter::warning(&format!(
                    "{moved} file(s) were moved before the error; run 'extsort undo' to revert them."
                ));
            }
            return Err(e).context("Organization aborted");
        }
    };

    if report.moves.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::header("Moved files:");
    let base = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    for record in &report.moves {
        OutputFormatter::move_line(&base, &record.source, &record.destination);
    }
    OutputFormatter::summary_table(&report.categories, report.total());

    OutputFormatter::success("Organization complete!");
    OutputFormatter::plain("Use 'extsort undo' to revert the last move, or 'extsort undo --all'.");
    Ok(())
}

/// Shows where each file would go, without moving anything.
fn organize_dry_run(dir: &Path, config: &AppConfig) -> Result<()> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", dir.display()));

    let organizer = organizer(config)?.protect(config.journal_path());
    let plan = organizer.plan(dir)?;

    if plan.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::header("Files would be organized as follows:");
    let base = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in &plan {
        OutputFormatter::move_line(&base, &planned.source, &planned.destination);
        *counts
            .entry(planned.category.dir_name().to_string())
            .or_insert(0) += 1;
    }
    OutputFormatter::summary_table(&counts, plan.len());

    OutputFormatter::dry_run_notice("No files were modified.");
    Ok(())
}

fn undo_last(journal: &mut MoveJournal) -> Result<()> {
    match journal.undo_last() {
        UndoOutcome::Undone(record) => {
            OutputFormatter::success(&format!(
                "Restored {} (from {})",
                record.source.display(),
                record.destination.display()
            ));
            if !journal.is_empty() {
                OutputFormatter::plain(&format!("{} move(s) left to undo.", journal.len()));
            }
            Ok(())
        }
        UndoOutcome::NothingToUndo => {
            info!("Nothing to undo");
            OutputFormatter::warning("Nothing to undo.");
            Ok(())
        }
        UndoOutcome::Failed { error, .. } => {
            OutputFormatter::plain("The move is still recorded; fix the problem and run undo again.");
            Err(error).context("Undo failed")
        }
    }
}

fn undo_all(journal: &mut MoveJournal) -> Result<()> {
    if journal.is_empty() {
        OutputFormatter::warning("Nothing to undo.");
        return Ok(());
    }

    let report = journal.undo_all();
    for record in &report.restored {
        OutputFormatter::success(&format!("Restored {}", record.source.display()));
    }

    match report.failure {
        None => {
            OutputFormatter::success(&format!(
                "Undo complete! Restored {} file(s).",
                report.restored.len()
            ));
            Ok(())
        }
        Some((record, error)) => {
            OutputFormatter::warning(&format!(
                "{} move(s) remain in the journal, starting with {}.",
                journal.len(),
                record.destination.display()
            ));
            Err(error).context("Undo stopped")
        }
    }
}

fn show_history(journal: &MoveJournal) {
    OutputFormatter::info(&format!("Journal: {}", journal.path().display()));
    if journal.is_empty() {
        OutputFormatter::plain("No recorded moves.");
        return;
    }

    OutputFormatter::header("Recorded moves (newest first):");
    for (index, record) in journal.records().iter().enumerate().rev() {
        OutputFormatter::plain(&format!(
            "{:>4}. {} → {}",
            index + 1,
            record.source.display(),
            record.destination.display()
        ));
    }
}
