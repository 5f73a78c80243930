#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rsacert::cert::SignatureAlgorithm;
use rsacert::cert::params::DistinguishedName;
use rsacert::generate::GenerateRequest;
use rsacert::output::OutputPaths;
use rsacert::prompt::SubjectFields;
use time::OffsetDateTime;

pub fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn rsa_key_path() -> PathBuf {
    data_path("rsa2048_pkcs1.pem")
}

/// 2023-11-14T22:13:20Z, so repeated runs see the same validity window.
pub fn frozen_not_before() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

pub fn sample_subject() -> SubjectFields {
    SubjectFields {
        subject: DistinguishedName::builder()
            .country("US")
            .state("Montana")
            .locality("Bozeman")
            .organization("Example Widgets")
            .organization_unit("Support")
            .common_name("www.example.com")
            .email("info@example.com")
            .build(),
        days_valid: 365,
    }
}

pub fn request(
    key_path: PathBuf,
    out: PathBuf,
    signature_algorithm: SignatureAlgorithm,
) -> GenerateRequest {
    GenerateRequest::builder()
        .key_path(key_path)
        .output(OutputPaths::pem_only(out))
        .signature_algorithm(signature_algorithm)
        .subject(sample_subject())
        .not_before(frozen_not_before())
        .build()
}
