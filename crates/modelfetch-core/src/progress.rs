//! Progress reporting contract and terminal implementation
//!
//! The fetcher drives a reporter through `start` / `advance` / `finish`.
//! Reporters are display-only: they must not block or alter the fetcher's
//! control flow, and byte counts only ever move forward.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::fetcher::DownloadOutcome;

/// Sink for per-download progress events
pub trait ProgressReporter {
    /// A download is starting. `total_bytes` is the declared content length,
    /// or `None` when the server did not declare one (indeterminate).
    fn start(&mut self, name: &str, total_bytes: Option<u64>);

    /// `bytes` more bytes were written to the destination file.
    fn advance(&mut self, bytes: u64);

    /// The download reached a terminal outcome. Every attempt ends with
    /// exactly one `finish`; it arrives without a preceding `start` when
    /// the task was skipped or failed before any body byte.
    fn finish(&mut self, outcome: &DownloadOutcome);
}

/// Reporter that ignores every event
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&mut self, _name: &str, _total_bytes: Option<u64>) {}
    fn advance(&mut self, _bytes: u64) {}
    fn finish(&mut self, _outcome: &DownloadOutcome) {}
}

/// Terminal progress bar reporter
///
/// Known-length downloads get a bar with percentage, transfer speed and
/// ETA; unknown-length downloads get a plain spinner with a running byte
/// count. Finished bars stay on screen.
pub struct BarReporter {
    bar: Option<ProgressBar>,
}

impl BarReporter {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.blue} {msg:>24} [{bar:40.cyan/blue}] {percent:>3}% • {bytes_per_sec} • {eta}",
        )
        .expect("valid progress template")
        .progress_chars("=> ")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.blue} {msg:>24} {bytes} • {bytes_per_sec}")
            .expect("valid progress template")
    }
}

impl Default for BarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarReporter {
    fn start(&mut self, name: &str, total_bytes: Option<u64>) {
        let bar = match total_bytes {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(Self::bar_style());
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(Self::spinner_style());
                bar
            }
        };
        bar.set_message(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    fn finish(&mut self, outcome: &DownloadOutcome) {
        let Some(bar) = self.bar.take() else {
            return;
        };
        match outcome {
            DownloadOutcome::Succeeded => bar.finish(),
            // Leave the bar at its last position so the abort point is visible.
            DownloadOutcome::Failed(_) => bar.abandon(),
            DownloadOutcome::Skipped => bar.finish_and_clear(),
        }
    }
}
