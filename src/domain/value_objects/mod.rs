use std::fmt;

use serde::{Deserialize, Serialize};

const COUNTRY_CODE: &str = "254";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Recipient {
    pub fn with_phone(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            name: None,
            email: None,
        }
    }
}

/// A Kenyan number in `+254XXXXXXXXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accepts `2547XXXXXXXX`, `07XXXXXXXX` and `7XXXXXXXX` shapes (and the
    /// `1` prefixed equivalents), ignoring any non-digit noise.
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let subscriber = if digits.len() == 12 && digits.starts_with(COUNTRY_CODE) {
            &digits[3..]
        } else if digits.len() == 10 && digits.starts_with('0') {
            &digits[1..]
        } else if digits.len() == 9 && digits.starts_with(['7', '1']) {
            digits.as_str()
        } else {
            return None;
        };

        Some(Self(format!("+{COUNTRY_CODE}{subscriber}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
