//! Sequential run over the bundled registry

use serde::Serialize;
use tracing::info;

use crate::error::FetchError;
use crate::fetcher::{DownloadOutcome, Fetcher};
use crate::progress::ProgressReporter;
use crate::registry::{ModelSource, MODEL_SOURCES};

/// Tally of a completed run, with the per-URL outcomes in list order
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<(String, DownloadOutcome)>,
}

impl RunSummary {
    fn record(&mut self, url: String, outcome: DownloadOutcome) {
        match &outcome {
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::Succeeded => self.succeeded += 1,
            DownloadOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push((url, outcome));
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }
}

/// Download every model in the bundled registry, in list order
pub async fn run<R: ProgressReporter>(
    fetcher: &Fetcher,
    reporter: &mut R,
) -> Result<RunSummary, FetchError> {
    run_sources(fetcher, reporter, &MODEL_SOURCES).await
}

/// Download every source in `sources`, in order
///
/// The whole list is decoded up front, so a bad token aborts before any
/// network or filesystem activity. After that, one attempt per URL; a
/// failed attempt is tallied and the run moves on.
pub async fn run_sources<R: ProgressReporter>(
    fetcher: &Fetcher,
    reporter: &mut R,
    sources: &[ModelSource],
) -> Result<RunSummary, FetchError> {
    let urls = sources
        .iter()
        .map(|s| s.url())
        .collect::<Result<Vec<_>, _>>()?;

    info!("Starting download run over {} entries", urls.len());
    fetcher.ensure_output_dir().await?;

    let mut summary = RunSummary::default();
    for url in urls {
        let outcome = fetcher.fetch(&url, reporter).await?;
        summary.record(url, outcome);
    }

    info!(
        "Run complete: {} succeeded, {} skipped, {} failed",
        summary.succeeded, summary.skipped, summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopReporter;
    use crate::registry::encode_url;
    use std::net::SocketAddr;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(response: Vec<u8>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            }
        });

        addr
    }

    fn ok_response(body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    fn source(id: &str, url: &str) -> ModelSource {
        ModelSource {
            id: id.to_string(),
            name: id.to_string(),
            token: encode_url(url),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_run_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        let fetcher = Fetcher::with_output_dir(dir.path().join("downloads")).unwrap();

        let bad = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
        )
        .await;
        let good = serve_once(ok_response(&[7u8; 64])).await;

        let sources = [
            source("bad", &format!("http://{bad}/bad.bin")),
            source("good", &format!("http://{good}/good.bin")),
        ];

        let mut reporter = NoopReporter;
        let summary = run_sources(&fetcher, &mut reporter, &sources)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total(), 2);
        assert!(!summary.all_ok());
        assert!(dir.path().join("downloads/good.bin").exists());
        assert!(!dir.path().join("downloads/bad.bin").exists());
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let dir = TempDir::new().unwrap();
        let fetcher = Fetcher::with_output_dir(dir.path().join("downloads")).unwrap();

        let addr = serve_once(ok_response(&[3u8; 32])).await;
        let sources = [source("a", &format!("http://{addr}/a.bin"))];

        let mut reporter = NoopReporter;
        let first = run_sources(&fetcher, &mut reporter, &sources)
            .await
            .unwrap();
        assert_eq!(first.succeeded, 1);

        let before = std::fs::read(dir.path().join("downloads/a.bin")).unwrap();

        // The server only answers once; a second run must not need it.
        let second = run_sources(&fetcher, &mut reporter, &sources)
            .await
            .unwrap();
        assert_eq!(second.skipped, 1);
        assert_eq!(second.succeeded, 0);
        assert!(second.all_ok());

        let after = std::fs::read(dir.path().join("downloads/a.bin")).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_bad_token_aborts_before_any_download() {
        let dir = TempDir::new().unwrap();
        let fetcher = Fetcher::with_output_dir(dir.path().join("downloads")).unwrap();

        let addr = serve_once(ok_response(&[1u8; 16])).await;
        let mut broken = source("broken", "unused");
        broken.token = "not valid base64!!!".to_string();
        let sources = [
            source("a", &format!("http://{addr}/a.bin")),
            broken,
        ];

        let mut reporter = NoopReporter;
        let err = run_sources(&fetcher, &mut reporter, &sources)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Registry(_)));
        // Decode failed before the init step, so nothing was created.
        assert!(!dir.path().join("downloads").exists());
    }

    #[tokio::test]
    async fn test_empty_source_list_yields_empty_summary() {
        let dir = TempDir::new().unwrap();
        let fetcher = Fetcher::with_output_dir(dir.path().join("downloads")).unwrap();

        let mut reporter = NoopReporter;
        let summary = run_sources(&fetcher, &mut reporter, &[]).await.unwrap();

        assert_eq!(summary.total(), 0);
        assert!(summary.all_ok());
        assert!(fetcher.output_dir().is_dir());
    }
}
