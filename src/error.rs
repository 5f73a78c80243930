//! use rsacert::error::CertGenError;

use std::path::PathBuf;

use thiserror::Error;

/// Represents errors that can occur while generating a certificate.
///
/// Each variant names the stage of the pipeline that failed, so callers can
/// tell a bad key file from a bad digest selector without parsing log output.
#[derive(Debug, Error)]
pub enum CertGenError {
    /// A file could not be opened, read, or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an answer from the prompt input failed.
    #[error("Failed to read subject field: {0}")]
    Prompt(#[source] std::io::Error),

    /// A buffer could not be reserved on the heap.
    #[error("Failed to allocate {0} bytes")]
    Allocation(usize),

    /// The private key is malformed or of an unsupported type.
    #[error("Failed to decode private key: {0}")]
    KeyDecode(String),

    /// The digest selector is not one of the supported SHA variants.
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),

    /// Error during DER or PEM encoding.
    #[error("Failed to encode data: {0}")]
    Encoding(String),

    /// Error while producing the RSA signature.
    #[error("Failed to sign certificate: {0}")]
    Signing(String),

    /// An encoded certificate does not fit the configured buffer ceiling.
    #[error("Buffer too small: need {needed} bytes, capacity is {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CertGenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CertGenError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<der::Error> for CertGenError {
    /// Converts a `der::Error` into a `CertGenError`.
    fn from(err: der::Error) -> Self {
        CertGenError::Encoding(err.to_string())
    }
}

impl From<rsa::Error> for CertGenError {
    fn from(err: rsa::Error) -> Self {
        CertGenError::Signing(err.to_string())
    }
}

impl From<toml::de::Error> for CertGenError {
    fn from(err: toml::de::Error) -> Self {
        CertGenError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CertGenError>;
