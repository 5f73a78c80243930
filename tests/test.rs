mod util;

use std::fs;

use rsacert::cert::params::DistinguishedName;
use rsacert::cert::{Certificate, SignatureAlgorithm};
use rsacert::error::CertGenError;
use rsacert::generate::{GenerateRequest, make_self_signed_rsa_certificate};
use rsacert::output::OutputPaths;
use rsacert::prompt::{self, MAX_FIELD_LEN, SubjectFields};

/// Generates a certificate for every supported digest and checks the PEM file
/// and the encoded signature algorithm.
#[test]
fn generate_cert_for_each_digest() {
    let dir = tempfile::tempdir().unwrap();

    for alg in SignatureAlgorithm::ALL {
        let out = dir.path().join(format!("{}.pem", alg.digest_name()));
        let generated =
            make_self_signed_rsa_certificate(&util::request(util::rsa_key_path(), out.clone(), alg))
                .unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("-----BEGIN CERTIFICATE-----"));
        assert_eq!(written, generated.pem);

        let parsed = Certificate::from_der(&generated.der).unwrap();
        assert_eq!(parsed.signature_algorithm().unwrap(), alg);
    }
}

#[test]
fn every_key_encoding_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "rsa2048_pkcs1.pem",
        "rsa2048_pkcs8.pem",
        "rsa2048_pkcs1.der",
        "rsa2048_pkcs8.der",
    ] {
        let out = dir.path().join(format!("{name}.crt"));
        let request = util::request(util::data_path(name), out, SignatureAlgorithm::Sha256WithRSA);
        make_self_signed_rsa_certificate(&request).unwrap();
    }
}

#[test]
fn subject_matches_prompt_answers() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cert.pem");
    let generated = make_self_signed_rsa_certificate(&util::request(
        util::rsa_key_path(),
        out,
        SignatureAlgorithm::Sha256WithRSA,
    ))
    .unwrap();

    assert_eq!(generated.certificate.subject(), util::sample_subject().subject);
    // self-signed: issuer and subject are the same name
    assert_eq!(
        generated.certificate.inner.tbs_certificate.issuer,
        generated.certificate.inner.tbs_certificate.subject
    );
}

#[test]
fn long_subject_fields_are_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let long = "a".repeat(200);
    let answers = format!("US\n\n\n{long}\n\n{long}\n\n30\n");
    let subject = prompt::collect_subject(&mut answers.as_bytes(), &mut Vec::<u8>::new(), MAX_FIELD_LEN)
        .unwrap();

    let request = GenerateRequest::builder()
        .key_path(util::rsa_key_path())
        .output(OutputPaths::pem_only(dir.path().join("cert.pem")))
        .subject(subject)
        .build();
    let generated = make_self_signed_rsa_certificate(&request).unwrap();

    let subject = generated.certificate.subject();
    assert_eq!(subject.organization, "a".repeat(MAX_FIELD_LEN));
    assert_eq!(subject.common_name, "a".repeat(MAX_FIELD_LEN));
    assert_eq!(subject.country, "US");
}

#[test]
fn fields_given_directly_are_truncated_too() {
    let dir = tempfile::tempdir().unwrap();
    let request = GenerateRequest::builder()
        .key_path(util::rsa_key_path())
        .output(OutputPaths::pem_only(dir.path().join("cert.pem")))
        .subject(SubjectFields {
            subject: DistinguishedName::builder().common_name("b".repeat(80)).build(),
            days_valid: 1,
        })
        .max_field_len(10)
        .build();
    let generated = make_self_signed_rsa_certificate(&request).unwrap();
    assert_eq!(generated.certificate.subject().common_name, "b".repeat(10));
}

#[test]
fn validity_matches_requested_days() {
    let dir = tempfile::tempdir().unwrap();
    for (answer, days) in [("90", 90), ("not a number", 0)] {
        let mut subject = util::sample_subject();
        subject.days_valid = prompt::parse_days(answer);

        let request = GenerateRequest::builder()
            .key_path(util::rsa_key_path())
            .output(OutputPaths::pem_only(dir.path().join(format!("{days}.pem"))))
            .subject(subject)
            .not_before(util::frozen_not_before())
            .build();
        let generated = make_self_signed_rsa_certificate(&request).unwrap();

        let validity = &generated.certificate.inner.tbs_certificate.validity;
        let span = validity.not_after.to_unix_duration() - validity.not_before.to_unix_duration();
        assert_eq!(span.as_secs(), days * 86_400);
    }
}

#[test]
fn corrupt_key_fails_before_output_is_touched() {
    let dir = tempfile::tempdir().unwrap();

    let fresh = dir.path().join("fresh.pem");
    let err = make_self_signed_rsa_certificate(&util::request(
        util::data_path("truncated.der"),
        fresh.clone(),
        SignatureAlgorithm::Sha256WithRSA,
    ))
    .unwrap_err();
    assert!(matches!(err, CertGenError::KeyDecode(_)));
    assert!(!fresh.exists());

    let existing = dir.path().join("existing.pem");
    fs::write(&existing, "previous contents").unwrap();
    let err = make_self_signed_rsa_certificate(&util::request(
        util::data_path("ec_p256_pkcs8.pem"),
        existing.clone(),
        SignatureAlgorithm::Sha256WithRSA,
    ))
    .unwrap_err();
    assert!(matches!(err, CertGenError::KeyDecode(_)));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous contents");
}

#[test]
fn missing_key_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cert.pem");
    let err = make_self_signed_rsa_certificate(&util::request(
        dir.path().join("no-such.key"),
        out.clone(),
        SignatureAlgorithm::Sha256WithRSA,
    ))
    .unwrap_err();
    assert!(matches!(err, CertGenError::Io { .. }));
    assert!(!out.exists());
}

#[test]
fn unsupported_digest_never_reaches_the_builder() {
    let err = "md5".parse::<SignatureAlgorithm>().unwrap_err();
    assert!(matches!(err, CertGenError::UnsupportedDigest(ref name) if name == "md5"));
}

#[test]
fn identical_inputs_give_identical_certificates() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.pem");
    let second = dir.path().join("second.pem");

    make_self_signed_rsa_certificate(&util::request(
        util::rsa_key_path(),
        first.clone(),
        SignatureAlgorithm::Sha384WithRSA,
    ))
    .unwrap();
    make_self_signed_rsa_certificate(&util::request(
        util::rsa_key_path(),
        second.clone(),
        SignatureAlgorithm::Sha384WithRSA,
    ))
    .unwrap();

    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn der_output_goes_to_its_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = OutputPaths {
        pem: dir.path().join("cert.pem"),
        der: Some(dir.path().join("cert.der")),
    };
    let request = GenerateRequest::builder()
        .key_path(util::rsa_key_path())
        .output(paths.clone())
        .subject(util::sample_subject())
        .build();
    let generated = make_self_signed_rsa_certificate(&request).unwrap();

    assert_eq!(fs::read(paths.der.unwrap()).unwrap(), generated.der);
    assert!(fs::read_to_string(paths.pem).unwrap().starts_with("-----BEGIN CERTIFICATE-----"));
}

#[test]
fn small_buffer_is_reported_and_nothing_written() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cert.pem");
    let request = GenerateRequest::builder()
        .key_path(util::rsa_key_path())
        .output(OutputPaths::pem_only(out.clone()))
        .subject(util::sample_subject())
        .buffer_capacity(256)
        .build();

    let err = make_self_signed_rsa_certificate(&request).unwrap_err();
    assert!(matches!(err, CertGenError::BufferTooSmall { capacity: 256, .. }));
    assert!(!out.exists());
}

#[test]
fn negative_validity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cert.pem");
    let mut subject = util::sample_subject();
    subject.days_valid = prompt::parse_days("-5");

    let request = GenerateRequest::builder()
        .key_path(util::rsa_key_path())
        .output(OutputPaths::pem_only(out.clone()))
        .subject(subject)
        .build();
    let err = make_self_signed_rsa_certificate(&request).unwrap_err();
    assert!(matches!(err, CertGenError::InvalidInput(_)));
    assert!(!out.exists());
}

#[test]
fn der_path_aliasing_the_pem_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let paths = OutputPaths {
        pem: dir.path().join("cert.pem"),
        der: Some(dir.path().join("sub/../cert.pem")),
    };
    let request = GenerateRequest::builder()
        .key_path(util::rsa_key_path())
        .output(paths.clone())
        .subject(util::sample_subject())
        .build();

    let err = make_self_signed_rsa_certificate(&request).unwrap_err();
    assert!(matches!(err, CertGenError::InvalidInput(_)));
    assert!(!paths.pem.exists());
}
