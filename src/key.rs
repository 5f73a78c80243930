use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand_core::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use sha2::{Sha224, Sha256, Sha384, Sha512};
use tracing::debug;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::{CertGenError, Result};
use crate::pem_utils;

const PKCS1_PEM_LABEL: &str = "RSA PRIVATE KEY";
const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";

/// Reads a private key file fully into memory.
///
/// The buffer is reserved up front with the exact file size, so a failed
/// reservation is reported as [`CertGenError::Allocation`] instead of aborting.
pub fn load_key_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| CertGenError::io(path, e))?;
    let size = file.metadata().map_err(|e| CertGenError::io(path, e))?.len();
    let size = usize::try_from(size).map_err(|_| CertGenError::Allocation(usize::MAX))?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| CertGenError::Allocation(size))?;
    file.read_to_end(&mut buf)
        .map_err(|e| CertGenError::io(path, e))?;

    debug!(path = %path.display(), bytes = buf.len(), "read key file");
    Ok(buf)
}

/// An RSA private key together with its public half.
pub struct RsaKeyPair {
    private: Box<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl RsaKeyPair {
    /// Decodes an RSA private key, detecting PEM or DER and PKCS#1 or PKCS#8.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let private = if pem_utils::looks_like_pem(bytes) {
            let (label, der) = pem_utils::pem_to_der(bytes)?;
            match label.as_str() {
                PKCS1_PEM_LABEL => RsaPrivateKey::from_pkcs1_der(&der)
                    .map_err(|e| CertGenError::KeyDecode(e.to_string()))?,
                PKCS8_PEM_LABEL => RsaPrivateKey::from_pkcs8_der(&der)
                    .map_err(|e| CertGenError::KeyDecode(e.to_string()))?,
                other => {
                    return Err(CertGenError::KeyDecode(format!(
                        "unsupported PEM label \"{other}\""
                    )));
                }
            }
        } else {
            Self::decode_der(bytes)?
        };

        Ok(Self::from_private_key(private))
    }

    fn decode_der(der: &[u8]) -> Result<RsaPrivateKey> {
        match RsaPrivateKey::from_pkcs1_der(der) {
            Ok(key) => Ok(key),
            Err(pkcs1_err) => RsaPrivateKey::from_pkcs8_der(der).map_err(|pkcs8_err| {
                CertGenError::KeyDecode(format!(
                    "not a PKCS#1 key ({pkcs1_err}) nor a PKCS#8 RSA key ({pkcs8_err})"
                ))
            }),
        }
    }

    /// Wraps an already decoded private key.
    pub fn from_private_key(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        Self {
            private: Box::new(private),
            public,
        }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.size() * 8
    }

    /// The subject public key info for this key.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        SubjectPublicKeyInfoOwned::from_key(self.public.clone())
            .map_err(|e| CertGenError::Encoding(e.to_string()))
    }

    /// SHA-1 over the subject public key bits, as used for key identifiers.
    pub fn key_id(&self) -> Result<Vec<u8>> {
        let spki = self.as_spki()?;
        Ok(Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec())
    }

    /// Signs `data` with RSASSA-PKCS1-v1_5 using the digest of `algorithm`.
    ///
    /// Blinding uses the OS random generator; PKCS#1 v1.5 signatures are
    /// still deterministic for a given key and message.
    pub fn sign_data(&self, data: &[u8], algorithm: SignatureAlgorithm) -> Result<Vec<u8>> {
        match algorithm {
            SignatureAlgorithm::Sha1WithRSA => sign_with::<Sha1>(&self.private, data),
            SignatureAlgorithm::Sha224WithRSA => sign_with::<Sha224>(&self.private, data),
            SignatureAlgorithm::Sha256WithRSA => sign_with::<Sha256>(&self.private, data),
            SignatureAlgorithm::Sha384WithRSA => sign_with::<Sha384>(&self.private, data),
            SignatureAlgorithm::Sha512WithRSA => sign_with::<Sha512>(&self.private, data),
        }
    }
}

fn sign_with<D>(private: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + const_oid::AssociatedOid,
{
    let signing_key = SigningKey::<D>::new(private.clone());
    let signature = signing_key
        .try_sign_with_rng(&mut OsRng, data)
        .map_err(|e| CertGenError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}
