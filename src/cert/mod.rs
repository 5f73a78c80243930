pub mod extensions;
pub mod params;

use std::fmt;
use std::str::FromStr;

use der::{Decode, Encode};
use params::CertificateParams;
use x509_cert::certificate::CertificateInner;

use crate::error::{CertGenError, Result};
use crate::issuer::Issuer;
use crate::key::RsaKeyPair;
use crate::pem_utils;

/// Default ceiling, in bytes, for an encoded certificate (DER or PEM).
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Represents the supported signature algorithms for certificates.
///
/// Every variant pairs a SHA digest with RSASSA-PKCS1-v1_5. Selectors outside
/// this set are rejected by [`SignatureAlgorithm::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// SHA-1 with RSA encryption.
    Sha1WithRSA,
    /// SHA-224 with RSA encryption.
    Sha224WithRSA,
    /// SHA-256 with RSA encryption.
    #[default]
    Sha256WithRSA,
    /// SHA-384 with RSA encryption.
    Sha384WithRSA,
    /// SHA-512 with RSA encryption.
    Sha512WithRSA,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 5] = [
        SignatureAlgorithm::Sha1WithRSA,
        SignatureAlgorithm::Sha224WithRSA,
        SignatureAlgorithm::Sha256WithRSA,
        SignatureAlgorithm::Sha384WithRSA,
        SignatureAlgorithm::Sha512WithRSA,
    ];

    /// Short digest name, as accepted on the command line.
    pub fn digest_name(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1WithRSA => "sha1",
            SignatureAlgorithm::Sha224WithRSA => "sha224",
            SignatureAlgorithm::Sha256WithRSA => "sha256",
            SignatureAlgorithm::Sha384WithRSA => "sha384",
            SignatureAlgorithm::Sha512WithRSA => "sha512",
        }
    }

    pub fn oid(self) -> const_oid::ObjectIdentifier {
        use const_oid::db::rfc5912;
        match self {
            SignatureAlgorithm::Sha1WithRSA => rfc5912::SHA_1_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha224WithRSA => rfc5912::SHA_224_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha256WithRSA => rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha384WithRSA => rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha512WithRSA => rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
        }
    }

    /// Maps a signature algorithm OID back to the enum.
    pub fn from_oid(oid: const_oid::ObjectIdentifier) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.oid() == oid)
            .ok_or_else(|| CertGenError::UnsupportedDigest(oid.to_string()))
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = CertGenError;

    /// Parses a digest selector such as `sha256` or `SHA-384`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        match normalized.as_str() {
            "sha" | "sha1" => Ok(SignatureAlgorithm::Sha1WithRSA),
            "sha224" => Ok(SignatureAlgorithm::Sha224WithRSA),
            "sha256" => Ok(SignatureAlgorithm::Sha256WithRSA),
            "sha384" => Ok(SignatureAlgorithm::Sha384WithRSA),
            "sha512" => Ok(SignatureAlgorithm::Sha512WithRSA),
            _ => Err(CertGenError::UnsupportedDigest(s.to_string())),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}WithRSAEncryption", self.digest_name())
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// PKCS#1 signature algorithms carry an explicit NULL parameter.
    fn from(value: SignatureAlgorithm) -> Self {
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters: Some(der::asn1::Any::null()),
        }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM formats.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Creates a new self-signed certificate.
    ///
    /// # Arguments
    /// * `params` - Subject, validity and signature algorithm of the certificate.
    /// * `key` - The key pair whose public half is certified and whose private half signs.
    pub fn new_self_signed(params: &CertificateParams, key: &RsaKeyPair) -> Result<Self> {
        let self_issuer = SelfIssuer {
            name: params.subject.clone(),
            key,
        };
        self_issuer.issue(params)
    }

    /// Parses a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertGenError::Encoding(e.to_string()))
    }

    /// Encodes the certificate into DER format, refusing to exceed `capacity` bytes.
    pub fn to_der_bounded(&self, capacity: usize) -> Result<Vec<u8>> {
        let needed = usize::try_from(self.inner.encoded_len()?)?;
        if needed > capacity {
            return Err(CertGenError::BufferTooSmall { needed, capacity });
        }
        self.to_der()
    }

    /// Converts DER bytes to PEM, refusing to exceed `capacity` bytes.
    pub fn der_to_pem_bounded(der: &[u8], capacity: usize) -> Result<String> {
        let pem = pem_utils::der_to_pem(der, pem_utils::CERTIFICATE_LABEL);
        if pem.len() > capacity {
            return Err(CertGenError::BufferTooSmall {
                needed: pem.len(),
                capacity,
            });
        }
        Ok(pem)
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::from_oid(self.inner.signature_algorithm.oid)
    }

    pub fn subject(&self) -> params::DistinguishedName {
        params::DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: params::DistinguishedName,
    key: &'a RsaKeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> params::DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &RsaKeyPair {
        self.key
    }
}
