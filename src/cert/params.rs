use bon::Builder;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc4519::{C, CN, L, O, OU, ST};
use der::Tag;
use der::Tagged;
use der::asn1::{Any, Ia5StringRef, PrintableStringRef, SetOfVec, Utf8StringRef};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::SignatureAlgorithm;
use super::extensions::ToAndFromX509Extension;
use crate::error::{CertGenError, Result};

/// PKCS#9 emailAddress attribute.
pub const EMAIL_ADDRESS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

/// Parameters for building a self-signed X.509 certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject (and issuer).
/// * `validity` - The `notBefore`/`notAfter` window.
/// * `signature_algorithm` - The digest paired with RSA for the signature.
/// * `serial_number` - Explicit serial; derived from the key and validity when absent.
#[derive(Clone, Debug, Builder)]
pub struct CertificateParams {
    pub subject: DistinguishedName,
    pub validity: Validity,
    #[builder(default)]
    pub signature_algorithm: SignatureAlgorithm,
    pub serial_number: Option<Vec<u8>>,
}

/// Distinguished name parameters for building an X.509 certificate.
///
/// Empty fields are left out of the encoded name.
///
/// # Fields
/// * `country` - The country (C).
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
/// * `common_name` - The common name (CN).
/// * `email` - The PKCS#9 email address.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(default, into)]
    pub country: String,
    #[builder(default, into)]
    pub state: String,
    #[builder(default, into)]
    pub locality: String,
    #[builder(default, into)]
    pub organization: String,
    #[builder(default, into)]
    pub organization_unit: String,
    #[builder(default, into)]
    pub common_name: String,
    #[builder(default, into)]
    pub email: String,
}

impl DistinguishedName {
    fn attributes(&self) -> [(ObjectIdentifier, &str); 7] {
        [
            (C, self.country.as_str()),
            (ST, self.state.as_str()),
            (L, self.locality.as_str()),
            (O, self.organization.as_str()),
            (OU, self.organization_unit.as_str()),
            (CN, self.common_name.as_str()),
            (EMAIL_ADDRESS, self.email.as_str()),
        ]
    }

    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// Each non-empty field becomes its own RDN, in the order C, ST, L, O, OU,
    /// CN, emailAddress. Text is taken verbatim.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        let mut rdns = Vec::new();
        for (oid, text) in self.attributes() {
            if text.is_empty() {
                continue;
            }
            let atv = AttributeTypeAndValue {
                oid,
                value: encode_attribute_value(oid, text)?,
            };
            let set = SetOfVec::try_from(vec![atv])?;
            rdns.push(RelativeDistinguishedName(set));
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attributes other than the seven supported ones are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Self {
        let mut dn = DistinguishedName::default();
        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let Some(text) = attribute_text(&attr.value) else {
                    continue;
                };
                let slot = match attr.oid {
                    oid if oid == C => &mut dn.country,
                    oid if oid == ST => &mut dn.state,
                    oid if oid == L => &mut dn.locality,
                    oid if oid == O => &mut dn.organization,
                    oid if oid == OU => &mut dn.organization_unit,
                    oid if oid == CN => &mut dn.common_name,
                    oid if oid == EMAIL_ADDRESS => &mut dn.email,
                    _ => continue,
                };
                *slot = text;
            }
        }
        dn
    }
}

// Country prefers PrintableString, email prefers IA5String; anything those
// string types cannot carry falls back to UTF8String.
fn encode_attribute_value(oid: ObjectIdentifier, text: &str) -> Result<Any> {
    if oid == C {
        if let Ok(printable) = PrintableStringRef::new(text) {
            return Ok(Any::encode_from(&printable)?);
        }
    }
    if oid == EMAIL_ADDRESS {
        if let Ok(ia5) = Ia5StringRef::new(text) {
            return Ok(Any::encode_from(&ia5)?);
        }
    }
    Ok(Any::encode_from(&Utf8StringRef::new(text)?)?)
}

fn attribute_text(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::Utf8String | Tag::PrintableString | Tag::Ia5String => {
            String::from_utf8(value.value().to_vec()).ok()
        }
        _ => None,
    }
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Result<Self> {
        Self::starting_at(OffsetDateTime::now_utc(), days)
    }

    /// Creates a validity period of `days` days beginning at `not_before`.
    ///
    /// A negative day count is rejected; zero gives a window that ends as it begins.
    pub fn starting_at(not_before: OffsetDateTime, days: i64) -> Result<Self> {
        if days < 0 {
            return Err(CertGenError::InvalidInput(format!(
                "validity must be zero or more days, got {days}"
            )));
        }
        let not_after = days
            .checked_mul(86_400)
            .map(Duration::seconds)
            .and_then(|span| not_before.checked_add(span))
            .ok_or_else(|| {
                CertGenError::InvalidInput(format!("validity of {days} days is out of range"))
            })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Whole days between `notBefore` and `notAfter`.
    pub fn days(&self) -> i64 {
        (self.not_after - self.not_before).whole_days()
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}
