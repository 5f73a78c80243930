use der::Encode;
use sha2::{Digest, Sha256};
use tracing::debug;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use crate::cert::params::{CertificateParams, DistinguishedName, ExtensionParam, Validity};
use crate::error::{CertGenError, Result};
use crate::key::RsaKeyPair;
use crate::tbs_certificate::TbsCertificate;

/// Length of a derived serial number, in bytes.
const SERIAL_LEN: usize = 16;

/// Represents an entity capable of issuing certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &RsaKeyPair;

    /// Issues a certificate for the issuer's own key from `params`.
    ///
    /// Builds the TBS body, signs its DER encoding with the digest selected by
    /// `params.signature_algorithm`, and assembles the final certificate.
    fn issue(&self, params: &CertificateParams) -> Result<Certificate> {
        let key = self.signing_key();
        let public_key_info = key.as_spki()?;
        let key_id = key.key_id()?;

        let extensions = vec![
            ExtensionParam::from_extension(
                BasicConstraints {
                    is_ca: false,
                    max_path_length: None,
                },
                true,
            )?,
            ExtensionParam::from_extension(
                KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment),
                true,
            )?,
            ExtensionParam::from_extension(SubjectKeyIdentifier(key_id.clone()), false)?,
            ExtensionParam::from_extension(
                AuthorityKeyIdentifier {
                    key_identifier: key_id,
                },
                false,
            )?,
        ];

        let serial_number = match &params.serial_number {
            Some(serial) => serial.clone(),
            None => derive_serial_number(&public_key_info.to_der()?, &params.validity),
        };

        let tbs_cert = TbsCertificate {
            serial_number,
            signature_algorithm: params.signature_algorithm,
            issuer: self.issuer_name(),
            not_before: params.validity.not_before,
            not_after: params.validity.not_after,
            subject: params.subject.clone(),
            subject_public_key_info: public_key_info,
            extensions,
        };

        let tbs_cert_inner = tbs_cert
            .to_tbs_certificate_inner()
            .map_err(|e| CertGenError::Signing(format!("building certificate body: {e}")))?;
        let tbs_der = tbs_cert_inner.to_der()?;
        debug!(bytes = tbs_der.len(), "encoded certificate body");

        let signature = key.sign_data(&tbs_der, params.signature_algorithm)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: params.signature_algorithm.into(),
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Derives a positive serial number from the public key and the validity start.
///
/// The same key issued at the same instant always gets the same serial, so the
/// whole certificate is reproducible.
pub fn derive_serial_number(spki_der: &[u8], validity: &Validity) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(spki_der);
    hasher.update(validity.not_before.unix_timestamp().to_be_bytes());
    let digest = hasher.finalize();

    let mut serial = digest[..SERIAL_LEN].to_vec();
    // top byte in 0x40..=0x7f: positive, and no leading zero octet to strip
    serial[0] = (serial[0] & 0x7f) | 0x40;
    serial
}
