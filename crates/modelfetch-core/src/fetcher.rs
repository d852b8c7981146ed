//! Streaming download of a single URL to the output directory

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::progress::ProgressReporter;

/// Bounds connection setup and dead stalls, not total transfer time;
/// a slow but active stream is never cut off.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_OUTPUT_DIR: &str = "./downloads";

/// Why a download failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Server answered with a non-2xx status
    HttpStatus(u16),
    /// Transport-level fault during request or body streaming
    Network(String),
}

/// Terminal result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// Destination file already existed; nothing was requested or written
    Skipped,
    /// Body streamed to the destination file in full
    Succeeded,
    /// Attempt failed; the run continues with the next entry
    Failed(FailureKind),
}

impl DownloadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DownloadOutcome::Failed(_))
    }
}

/// Fold a transport fault into a failure, keeping a timeout indication
/// in the description when the client gave up waiting.
fn network_failure(e: &reqwest::Error) -> FailureKind {
    if e.is_timeout() {
        FailureKind::Network(format!("timed out: {e}"))
    } else {
        FailureKind::Network(e.to_string())
    }
}

/// Downloads one URL at a time into a fixed output directory
pub struct Fetcher {
    client: Client,
    output_dir: PathBuf,
}

impl Fetcher {
    /// Create a fetcher targeting the default `./downloads` directory
    pub fn new() -> Result<Self, FetchError> {
        Self::with_output_dir(PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Create a fetcher with a custom output directory
    pub fn with_output_dir(output_dir: PathBuf) -> Result<Self, FetchError> {
        Self::with_timeouts(output_dir, CONNECT_TIMEOUT, READ_TIMEOUT)
    }

    /// Create a fetcher with custom timeouts, so tests can use short ones
    pub(crate) fn with_timeouts(
        output_dir: PathBuf,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .user_agent(concat!("modelfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if absent
    ///
    /// Must run before the first download; a filesystem fault here is
    /// fatal to the whole run.
    pub async fn ensure_output_dir(&self) -> Result<(), FetchError> {
        if !self.output_dir.exists() {
            info!("Creating download directory at {}", self.output_dir.display());
            fs::create_dir_all(&self.output_dir).await?;
        }
        Ok(())
    }

    /// Destination path for a URL: `<output_dir>/<final path segment>`
    ///
    /// The segment is taken verbatim; the bundled registry only carries
    /// plain filenames, so no sanitization is applied. Note that a URL
    /// ending in `/` has an empty final segment, collapsing the
    /// destination to the output directory itself, which the existence
    /// check then reports as already present.
    pub fn destination(&self, url: &str) -> PathBuf {
        let basename = match url.rsplit_once('/') {
            Some((_, name)) => name,
            None => url,
        };
        self.output_dir.join(basename)
    }

    /// Execute one download attempt
    ///
    /// HTTP-status and transport faults are folded into the returned
    /// [`DownloadOutcome`]; only local filesystem errors escape as
    /// [`FetchError`] and abort the run. A partially written file from an
    /// interrupted stream is left on disk, matching the pre-existing-file
    /// skip rule above (the next run will treat it as complete).
    pub async fn fetch<R: ProgressReporter>(
        &self,
        url: &str,
        reporter: &mut R,
    ) -> Result<DownloadOutcome, FetchError> {
        let dest = self.destination(url);
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());

        // Existence alone short-circuits; partial or stale files are
        // treated as complete.
        if dest.exists() {
            info!("{} already exists, skipping", name);
            let outcome = DownloadOutcome::Skipped;
            reporter.finish(&outcome);
            return Ok(outcome);
        }

        info!("Downloading {} from {}", name, url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request for {} failed: {}", name, e);
                let outcome = DownloadOutcome::Failed(network_failure(&e));
                reporter.finish(&outcome);
                return Ok(outcome);
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Status is known before any body byte, so no file is created.
            warn!("Server returned {} for {}", status, name);
            let outcome = DownloadOutcome::Failed(FailureKind::HttpStatus(status.as_u16()));
            reporter.finish(&outcome);
            return Ok(outcome);
        }

        let total = response.content_length();
        reporter.start(&name, total);

        let mut file = fs::File::create(&dest).await?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Stream for {} aborted after {} bytes: {}", name, downloaded, e);
                    file.flush().await?;
                    let outcome = DownloadOutcome::Failed(network_failure(&e));
                    reporter.finish(&outcome);
                    return Ok(outcome);
                }
            };

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            reporter.advance(chunk.len() as u64);
        }

        file.flush().await?;

        info!("Downloaded {} ({} bytes)", name, downloaded);
        let outcome = DownloadOutcome::Succeeded;
        reporter.finish(&outcome);
        Ok(outcome)
    }
}
