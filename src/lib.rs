//! # rsacert - Self-Signed RSA Certificates in Pure Rust
//!
//! rsacert turns an existing RSA private key into a self-signed X.509 v3
//! certificate. Key parsing, ASN.1 encoding, hashing and signing are done with
//! the rustcrypto libraries; this crate sequences them and handles the file
//! and terminal I/O around them.
//!
//! ## Supported Keys
//!
//! - PKCS#1 (`RSA PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) RSA keys
//! - PEM or DER, detected automatically
//!
//! ## Supported Signature Algorithms
//!
//! RSASSA-PKCS1-v1_5 with SHA-1, SHA-224, SHA-256, SHA-384 or SHA-512. Any other
//! digest selector is rejected with [`error::CertGenError::UnsupportedDigest`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rsacert::{
//!     cert::{SignatureAlgorithm, params::DistinguishedName},
//!     generate::{GenerateRequest, make_self_signed_rsa_certificate},
//!     output::OutputPaths,
//!     prompt::SubjectFields,
//! };
//!
//! # fn main() -> Result<(), rsacert::error::CertGenError> {
//! let subject = SubjectFields {
//!     subject: DistinguishedName::builder()
//!         .country("US")
//!         .organization("Example Corp")
//!         .common_name("www.example.com")
//!         .build(),
//!     days_valid: 365,
//! };
//!
//! let request = GenerateRequest::builder()
//!     .key_path("server.key")
//!     .output(OutputPaths::pem_only("server.pem"))
//!     .signature_algorithm("sha384".parse::<SignatureAlgorithm>()?)
//!     .subject(subject)
//!     .build();
//!
//! let generated = make_self_signed_rsa_certificate(&request)?;
//! println!("{}", generated.pem);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key file loading, decoding and signing
//! - [`cert`]: Certificate creation and DER/PEM encoding
//! - [`issuer`]: Certificate issuing
//! - [`tbs_certificate`]: Low-level certificate structure
//! - [`prompt`]: Interactive subject collection
//! - [`output`]: Writing the finished certificate
//! - [`generate`]: The end-to-end pipeline
//! - [`config`]: Optional TOML configuration
//! - [`error`]: Error types

pub mod cert;
pub mod config;
pub mod error;
pub mod generate;
pub mod issuer;
pub mod key;
pub mod output;
pub mod pem_utils;
pub mod prompt;
pub mod tbs_certificate;
