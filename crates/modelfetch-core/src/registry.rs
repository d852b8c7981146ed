//! Bundled model registry
//!
//! The download list ships inside the binary as base64-encoded URL tokens.
//! The encoding is cosmetic obfuscation, not a secret; `encode_url` is the
//! inverse used when adding entries.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::RegistryError;

/// One entry in the bundled download list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSource {
    /// Model identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// base64-encoded download URL
    pub token: String,
    /// Description
    pub description: String,
}

impl ModelSource {
    /// Decode this entry's token into its download URL
    pub fn url(&self) -> Result<String, RegistryError> {
        decode_token(&self.token)
    }
}

/// The fixed, ordered set of models to download
pub static MODEL_SOURCES: LazyLock<Vec<ModelSource>> = LazyLock::new(|| {
    vec![
        ModelSource {
            id: "simswap-512".to_string(),
            name: "SimSwap 512 (unofficial)".to_string(),
            token: "aHR0cHM6Ly9odWdnaW5nZmFjZS5jby9QYXRpbC9pbnN3YXBwZXIvcmVzb2x2ZS9tYWluL3NpbXN3YXBfNTEyX3Vub2ZmaWNpYWwub25ueA==".to_string(),
            description: "512px face swap model (ONNX)".to_string(),
        },
        ModelSource {
            id: "inswapper-128".to_string(),
            name: "InSwapper 128".to_string(),
            token: "aHR0cHM6Ly9odWdnaW5nZmFjZS5jby90aGViaWdsYXNrb3dza2kvaW5zd2FwcGVyXzEyOC5vbm54L3Jlc29sdmUvbWFpbi9pbnN3YXBwZXJfMTI4Lm9ubng=".to_string(),
            description: "128px face swap model (ONNX)".to_string(),
        },
    ]
});

/// Decode a registry token back into its URL string
///
/// Fails loudly on malformed input; a bad token aborts the whole run
/// before any download starts.
pub fn decode_token(token: &str) -> Result<String, RegistryError> {
    let bytes = STANDARD.decode(token)?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode a URL into the registry token form
pub fn encode_url(url: &str) -> String {
    STANDARD.encode(url.as_bytes())
}

/// Decode the full registry, in list order
pub fn decoded_urls() -> Result<Vec<String>, RegistryError> {
    MODEL_SOURCES.iter().map(|s| s.url()).collect()
}
