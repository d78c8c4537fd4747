//! Diagnostic log setup.
//!
//! Every move, undo and error is written as a timestamped line to an
//! append-only log file through a non-blocking `tracing-appender` writer.
//! With `verbose`, the same events are also echoed to stderr.

use crate::config::LogLevel;
use chrono::Local;
use std::fmt as stdfmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Local timestamp (YYYY-MM-DD HH:MM:SS).
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Installs the global subscriber.
///
/// Returns the appender guard, which must be held until exit so buffered lines
/// are flushed. If the log file cannot be opened a warning is printed and only
/// the stderr layer (when `verbose`) is installed.
pub fn init_tracing(level: LogLevel, log_file: &Path, verbose: bool) -> Option<WorkerGuard> {
    let stderr_layer = verbose.then(|| {
        tsfmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(LocalTime)
            .with_target(false)
            .compact()
    });

    let (file_layer, guard) = match open_append(log_file) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tsfmt::layer()
                .with_writer(writer)
                .with_timer(LocalTime)
                .with_target(false)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "Could not open log file {}: {}; continuing without it.",
                log_file.display(),
                e
            );
            (None, None)
        }
    };

    let init = registry()
        .with(EnvFilter::new(level.as_str()))
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
    if let Err(e) = init {
        eprintln!("Logging already initialized: {e}");
    }

    guard
}

fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
