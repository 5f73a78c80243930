//! The end-to-end pipeline: load and decode the key, build and sign the
//! certificate, write it out.

use std::path::{Path, PathBuf};

use bon::Builder;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::cert::params::{CertificateParams, Validity};
use crate::cert::{Certificate, DEFAULT_BUFFER_CAPACITY, SignatureAlgorithm};
use crate::error::Result;
use crate::key::{self, RsaKeyPair};
use crate::output::{self, OutputPaths};
use crate::prompt::{MAX_FIELD_LEN, SubjectFields};

/// Everything needed to produce one self-signed certificate.
///
/// The subject is supplied up front; prompting, if any, happens before this
/// request is built.
#[derive(Clone, Debug, Builder)]
pub struct GenerateRequest {
    #[builder(into)]
    pub key_path: PathBuf,
    pub output: OutputPaths,
    #[builder(default)]
    pub signature_algorithm: SignatureAlgorithm,
    pub subject: SubjectFields,
    #[builder(default = MAX_FIELD_LEN)]
    pub max_field_len: usize,
    #[builder(default = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,
    /// Start of the validity window; now when absent.
    pub not_before: Option<OffsetDateTime>,
}

/// The certificate that was written, in both encodings.
#[derive(Debug, Clone)]
pub struct GeneratedCertificate {
    pub certificate: Certificate,
    pub der: Vec<u8>,
    pub pem: String,
}

/// Generates a self-signed RSA certificate and writes it to `request.output`.
///
/// Stages run in order (load, decode, build/sign, write) and the first
/// failure is returned. Nothing is written unless every earlier stage
/// succeeded.
pub fn make_self_signed_rsa_certificate(request: &GenerateRequest) -> Result<GeneratedCertificate> {
    let key = load_signing_key(&request.key_path)?;
    issue_and_write(&key, request)
}

/// Loads and decodes the private key at `path`.
///
/// The raw file contents are dropped as soon as decoding finishes.
pub fn load_signing_key(path: &Path) -> Result<RsaKeyPair> {
    let key = {
        let key_bytes = key::load_key_file(path)?;
        RsaKeyPair::decode(&key_bytes)
    }
    .inspect_err(|e| error!(path = %path.display(), error = %e, "failed to load private key"))?;

    info!(path = %path.display(), bits = key.bits(), "decoded RSA private key");
    Ok(key)
}

/// Builds, signs and writes the certificate for an already decoded key.
pub fn issue_and_write(key: &RsaKeyPair, request: &GenerateRequest) -> Result<GeneratedCertificate> {
    issue(key, request).inspect_err(|e| error!(error = %e, "certificate generation failed"))
}

fn issue(key: &RsaKeyPair, request: &GenerateRequest) -> Result<GeneratedCertificate> {
    let subject = request.subject.clone().truncated(request.max_field_len);
    let not_before = request.not_before.unwrap_or_else(OffsetDateTime::now_utc);
    let validity = Validity::starting_at(not_before, subject.days_valid)?;

    let params = CertificateParams::builder()
        .subject(subject.subject)
        .validity(validity)
        .signature_algorithm(request.signature_algorithm)
        .build();

    let certificate = Certificate::new_self_signed(&params, key)?;
    let der = certificate.to_der_bounded(request.buffer_capacity)?;
    info!(
        algorithm = %request.signature_algorithm,
        bytes = der.len(),
        "Successfully created new certificate"
    );

    info!(
        path = %request.output.pem.display(),
        "Writing newly generated certificate to file"
    );
    let pem = output::write_certificate(&der, &request.output, request.buffer_capacity)?;

    Ok(GeneratedCertificate {
        certificate,
        der,
        pem,
    })
}
