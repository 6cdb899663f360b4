use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A six-digit postal area code, the unit of delivery-area coverage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pincode(String);

impl Pincode {
    pub const LEN: usize = 6;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pincode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid(format!(
                "pincode must be {} digits, got '{}'",
                Self::LEN,
                s
            )));
        }
        Ok(Pincode(s.to_string()))
    }
}

impl TryFrom<String> for Pincode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pincode> for String {
    fn from(p: Pincode) -> Self {
        p.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a delivery-area list, rejecting an empty set and dropping duplicates
/// while keeping first-seen order.
pub fn parse_delivery_areas<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Pincode>, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::invalid("at least one delivery area is required"));
    }
    let mut out: Vec<Pincode> = Vec::with_capacity(raw.len());
    for r in raw {
        let p: Pincode = r.as_ref().parse()?;
        if !out.contains(&p) {
            out.push(p);
        }
    }
    Ok(out)
}
