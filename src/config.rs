use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cert::DEFAULT_BUFFER_CAPACITY;
use crate::cert::params::DistinguishedName;
use crate::error::{CertGenError, Result};
use crate::prompt::{MAX_FIELD_LEN, SubjectFields};

/// Settings read from an optional TOML file.
///
/// ```toml
/// digest = "sha384"
/// buffer_capacity = 8192
/// der_out = "cert.der"
///
/// [subject]
/// country = "US"
/// common_name = "www.example.com"
/// days_valid = 365
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertGenConfig {
    /// Digest paired with RSA: sha1, sha224, sha256, sha384 or sha512
    #[serde(default = "default_digest")]
    pub digest: String,

    #[serde(default = "default_max_field_len")]
    pub max_field_len: usize,

    /// Ceiling for the encoded DER and PEM certificate
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default)]
    pub der_out: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// When present, the subject is taken from here instead of prompting
    #[serde(default)]
    pub subject: Option<SubjectConfig>,
}

/// Subject fields given up front, for non-interactive runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubjectConfig {
    pub country: String,
    pub state: String,
    pub locality: String,
    pub organization: String,
    pub organization_unit: String,
    pub common_name: String,
    pub email: String,
    pub days_valid: i64,
}

fn default_digest() -> String {
    "sha256".to_string()
}

fn default_max_field_len() -> usize {
    MAX_FIELD_LEN
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CertGenConfig {
    fn default() -> Self {
        Self {
            digest: default_digest(),
            max_field_len: default_max_field_len(),
            buffer_capacity: default_buffer_capacity(),
            der_out: None,
            log_level: default_log_level(),
            subject: None,
        }
    }
}

impl CertGenConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CertGenError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CertGenConfig = toml::from_str(content)?;
        if config.max_field_len == 0 {
            return Err(CertGenError::Config(
                "max_field_len must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

impl From<SubjectConfig> for SubjectFields {
    fn from(value: SubjectConfig) -> Self {
        SubjectFields {
            subject: DistinguishedName {
                country: value.country,
                state: value.state,
                locality: value.locality,
                organization: value.organization,
                organization_unit: value.organization_unit,
                common_name: value.common_name,
                email: value.email,
            },
            days_valid: value.days_valid,
        }
    }
}
