use clap::Parser;
use extsort::cli::{Args, run_cli};
use extsort::logging::init_tracing;
use extsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing(config.log.level, &config.log_path(), args.verbose);

    match run_cli(&args.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            OutputFormatter::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
