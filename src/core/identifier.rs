//! Taxpayer identifier (CPF) validation and formatting, plus the corporate
//! email domain check used by the registration and profile forms.
//!
//! The three free functions are total: malformed input yields `false` or a
//! best-effort string, never an error. The [`Cpf`] and [`CorporateEmail`]
//! newtypes build on them for callers that want a parsed value instead.

use crate::utils::error::{PortalError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Email suffixes accepted for portal accounts.
pub const ALLOWED_EMAIL_DOMAINS: [&str; 2] = ["@metrocasa.com.br", "@vendasmetrocasa.com.br"];

const CPF_LEN: usize = 11;

/// Case-sensitive suffix match against [`ALLOWED_EMAIL_DOMAINS`].
pub fn is_valid_email_domain(email: &str) -> bool {
    ALLOWED_EMAIL_DOMAINS
        .iter()
        .any(|domain| email.ends_with(domain))
}

pub fn is_valid_identifier(raw: &str) -> bool {
    let digits = normalize(raw);
    if digits.len() != CPF_LEN {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Renders the digits of `raw` as `ddd.ddd.ddd-dd`.
///
/// Shorter input yields the formatted prefix (`"1114"` becomes `"111.4"`) so a
/// form field can be re-formatted on every keystroke. Digits past the
/// eleventh are dropped.
pub fn format_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(14);
    for (i, c) in raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CPF_LEN)
        .enumerate()
    {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

fn normalize(raw: &str) -> Vec<u32> {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect()
}

/// Weighted-sum check digit over `digits`; the first weight is `len + 1`.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let remainder = 11 - (sum % 11);
    if remainder >= 10 {
        0
    } else {
        remainder
    }
}

/// A checksum-valid CPF, stored as its eleven digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self> {
        if !is_valid_identifier(raw) {
            return Err(PortalError::validation(format!("Invalid CPF: '{}'", raw)));
        }
        Ok(Self(raw.chars().filter(|c| c.is_ascii_digit()).collect()))
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    pub fn formatted(&self) -> String {
        format_identifier(&self.0)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl FromStr for Cpf {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Cpf {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.formatted())
    }
}

impl<'de> Deserialize<'de> for Cpf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Cpf::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// An email address on one of the organisation's domains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CorporateEmail(String);

impl CorporateEmail {
    pub fn parse(raw: &str) -> Result<Self> {
        let email = raw.trim();
        let local_ok = email
            .split_once('@')
            .map(|(local, _)| !local.is_empty())
            .unwrap_or(false);
        if !local_ok || !is_valid_email_domain(email) {
            return Err(PortalError::validation(format!(
                "Email must belong to {}",
                ALLOWED_EMAIL_DOMAINS.join(" or ")
            )));
        }
        Ok(Self(email.to_string()))
    }
}

impl AsRef<str> for CorporateEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorporateEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
