//! Error types for registry decoding and downloads

use thiserror::Error;

/// Registry decoding errors
///
/// Any of these is fatal: a registry that cannot be decoded means the
/// download list itself is broken, so the run never starts.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registry entry is not valid base64
    #[error("registry entry is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Decoded bytes are not a valid UTF-8 URL string
    #[error("decoded registry entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Fatal download-run errors
///
/// Per-URL HTTP and transport faults are not listed here; those are
/// recorded as a failed [`DownloadOutcome`](crate::fetcher::DownloadOutcome)
/// and the run moves on to the next entry.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Local filesystem fault (output directory, destination file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Registry failed to decode
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
