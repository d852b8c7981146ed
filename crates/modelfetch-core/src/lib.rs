//! Model download engine for modelfetch
//!
//! Decodes the bundled registry of obfuscated model URLs and streams each
//! file into a local download directory, reporting progress along the way.

pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod progress;
pub mod registry;

pub use error::{FetchError, RegistryError};
pub use fetcher::{DownloadOutcome, FailureKind, Fetcher};
pub use orchestrator::RunSummary;
pub use progress::{BarReporter, NoopReporter, ProgressReporter};
pub use registry::{ModelSource, MODEL_SOURCES};
