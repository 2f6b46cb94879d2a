//! Main entry point for the takein CLI.
//!
//! Parses the two positional arguments, runs one export pass, and maps
//! the outcome to an exit code. This is the only place a failure becomes
//! a process exit; everything below returns `ExportError`.

use clap::Parser;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

use takein::{Cli, ExportOutcome, run_export};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides the default info level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run_export(&cli.src_dir, &cli.dest_root).await {
        Ok(ExportOutcome::NothingToDo) => {}
        Ok(ExportOutcome::Completed(summary)) => {
            println!(
                "Complete: {} files, {} bytes in {:.1} seconds",
                summary.files,
                summary.bytes,
                summary.elapsed.as_secs_f64()
            );
        }
        Err(e) => {
            error!(error = %e, "export failed");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
