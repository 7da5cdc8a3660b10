//! Validated `#rrggbb` colors used for paint and avatar parts.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static HEX_COLOR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").ok());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("'{0}' is not a #rrggbb color")]
    Malformed(String),
}

/// A lowercase `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse and normalize a hex color.
    ///
    /// # Errors
    ///
    /// Returns `ColorError::Malformed` unless the input is `#` followed by six hex digits.
    pub fn parse(raw: &str) -> Result<Self, ColorError> {
        let trimmed = raw.trim();
        if HEX_COLOR.as_ref().is_some_and(|re| re.is_match(trimmed)) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(ColorError::Malformed(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Built-in constant colors; only call with literals known to be valid.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        Self::parse(raw).unwrap_or_else(|_| Self(String::from("#000000")))
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
