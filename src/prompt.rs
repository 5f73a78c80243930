//! Interactive collection of the subject fields and validity period.
//!
//! The collector is generic over its input and prompt streams so it can be
//! driven from a terminal, a pipe, or an in-memory buffer.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::cert::params::DistinguishedName;
use crate::error::{CertGenError, Result};

/// Default maximum length, in bytes, of a single answer.
pub const MAX_FIELD_LEN: usize = 64;

/// Subject distinguished name plus the requested validity in days.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubjectFields {
    pub subject: DistinguishedName,
    pub days_valid: i64,
}

impl SubjectFields {
    /// Cuts every subject field down to `max_len` bytes.
    pub fn truncated(mut self, max_len: usize) -> Self {
        for field in [
            &mut self.subject.country,
            &mut self.subject.state,
            &mut self.subject.locality,
            &mut self.subject.organization,
            &mut self.subject.organization_unit,
            &mut self.subject.common_name,
            &mut self.subject.email,
        ] {
            let keep = truncate_to_boundary(field, max_len).len();
            field.truncate(keep);
        }
        self
    }
}

/// Prompts for the eight subject fields in order and reads one line for each.
///
/// Answers are taken verbatim up to `max_len` bytes. End of input leaves the
/// remaining fields empty and the validity at zero days.
pub fn collect_subject<R, W>(input: &mut R, prompts: &mut W, max_len: usize) -> Result<SubjectFields>
where
    R: BufRead,
    W: Write,
{
    let mut ask = |prompt: &str| read_field(&mut *input, &mut *prompts, prompt, max_len);

    let subject = DistinguishedName {
        country: ask("Enter your country's 2 letter code (ex: United States -> US): ")?,
        state: ask("Enter the name of the province you are located at: ")?,
        locality: ask("Enter the name of the city you are located at: ")?,
        organization: ask("Enter the name of your organization: ")?,
        organization_unit: ask("Enter the name of your unit: ")?,
        common_name: ask("Enter the common name of your domain: ")?,
        email: ask("Enter your email address: ")?,
    };
    let days_valid = parse_days(&ask(
        "Enter the number of days this certificate should be valid: ",
    )?);

    debug!(common_name = %subject.common_name, days_valid, "collected subject");
    Ok(SubjectFields {
        subject,
        days_valid,
    })
}

fn read_field<R, W>(input: &mut R, prompts: &mut W, prompt: &str, max_len: usize) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    prompts
        .write_all(prompt.as_bytes())
        .and_then(|_| prompts.flush())
        .map_err(CertGenError::Prompt)?;

    let mut raw = Vec::new();
    input
        .read_until(b'\n', &mut raw)
        .map_err(CertGenError::Prompt)?;

    let line = String::from_utf8_lossy(&raw);
    let line = line.trim_end_matches(['\n', '\r']);
    Ok(truncate_to_boundary(line, max_len).to_string())
}

/// Longest prefix of `s` that fits in `max_len` bytes without splitting a character.
pub fn truncate_to_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Parses a day count the way C's `atoi` does.
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit, text without leading digits yields 0, and overflow saturates.
pub fn parse_days(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(digit - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }
    if negative { -value } else { value }
}
