//! modelfetch command-line entry point
//!
//! No flags, no configuration: running the binary downloads the bundled
//! model set into `./downloads`, skipping files that are already there.

use std::process::ExitCode;

use modelfetch_core::{orchestrator, BarReporter, Fetcher, MODEL_SOURCES};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    println!("Model download process ({} files)", MODEL_SOURCES.len());

    let fetcher = match Fetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Failed to set up fetcher: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut reporter = BarReporter::new();
    match orchestrator::run(&fetcher, &mut reporter).await {
        Ok(summary) => {
            println!(
                "All download attempts complete: {} downloaded, {} skipped, {} failed",
                summary.succeeded, summary.skipped, summary.failed
            );
            // Always-zero exit would hide total failure from scripts, so
            // any failed entry makes the run exit non-zero.
            if summary.all_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Download run aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
