//! Pattern matching implementation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use solvanity_crypto::encoding::invalid_characters;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Pattern contains characters outside the base58 alphabet: {}", format_chars(.0))]
    InvalidCharacters(Vec<char>),
    #[error("Unknown pattern position '{0}' (expected prefix or suffix)")]
    UnknownPosition(String),
}

fn format_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where the pattern must appear in the encoded address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternPosition {
    /// Match at start of address
    #[default]
    Prefix,
    /// Match at end of address
    Suffix,
}

impl FromStr for PatternPosition {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" | "start" => Ok(PatternPosition::Prefix),
            "suffix" | "end" => Ok(PatternPosition::Suffix),
            _ => Err(PatternError::UnknownPosition(s.to_string())),
        }
    }
}

impl fmt::Display for PatternPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternPosition::Prefix => write!(f, "prefix"),
            PatternPosition::Suffix => write!(f, "suffix"),
        }
    }
}

/// A validated vanity pattern.
///
/// Construction rejects empty strings and any symbol outside the base58
/// alphabet, so a `VanityPattern` can always be matched in principle.
/// Matching is case-sensitive: `A` and `a` are different base58 digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VanityPattern {
    characters: String,
    position: PatternPosition,
}

impl VanityPattern {
    /// Validate and build a pattern
    pub fn new(characters: impl Into<String>, position: PatternPosition) -> Result<Self, PatternError> {
        let characters = characters.into();
        if characters.is_empty() {
            return Err(PatternError::Empty);
        }

        let invalid = invalid_characters(&characters);
        if !invalid.is_empty() {
            return Err(PatternError::InvalidCharacters(invalid));
        }

        Ok(Self {
            characters,
            position,
        })
    }

    /// Shorthand for a prefix pattern
    pub fn prefix(characters: impl Into<String>) -> Result<Self, PatternError> {
        Self::new(characters, PatternPosition::Prefix)
    }

    /// Shorthand for a suffix pattern
    pub fn suffix(characters: impl Into<String>) -> Result<Self, PatternError> {
        Self::new(characters, PatternPosition::Suffix)
    }

    pub fn characters(&self) -> &str {
        &self.characters
    }

    pub fn position(&self) -> PatternPosition {
        self.position
    }

    /// Number of characters (all ASCII, so also the byte length)
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Check an encoded address against the pattern
    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        match self.position {
            PatternPosition::Prefix => address.starts_with(&self.characters),
            PatternPosition::Suffix => address.ends_with(&self.characters),
        }
    }
}

impl fmt::Display for VanityPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            PatternPosition::Prefix => write!(f, "{}…", self.characters),
            PatternPosition::Suffix => write!(f, "…{}", self.characters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let pattern = VanityPattern::prefix("ABC").unwrap();
        assert!(pattern.matches("ABCxyz"));
        assert!(!pattern.matches("xyzABC"));
    }

    #[test]
    fn test_suffix_match() {
        let pattern = VanityPattern::suffix("xyz").unwrap();
        assert!(pattern.matches("ABCxyz"));
        assert!(!pattern.matches("xyzABC"));
    }

    #[test]
    fn test_case_sensitive() {
        let lower = VanityPattern::prefix("abc").unwrap();
        assert!(!lower.matches("ABCxyz"));

        let upper_suffix = VanityPattern::suffix("XYZ").unwrap();
        assert!(!upper_suffix.matches("ABCxyz"));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(VanityPattern::prefix(""), Err(PatternError::Empty));
    }

    #[test]
    fn test_rejects_excluded_symbols() {
        assert_eq!(
            VanityPattern::prefix("S0lO"),
            Err(PatternError::InvalidCharacters(vec!['0', 'l', 'O']))
        );
        assert!(VanityPattern::suffix("Il").is_err());
        assert!(VanityPattern::suffix("a b").is_err());
    }

    #[test]
    fn test_error_lists_characters() {
        let err = VanityPattern::prefix("l0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Pattern contains characters outside the base58 alphabet: 'l', '0'"
        );
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("prefix".parse::<PatternPosition>().unwrap(), PatternPosition::Prefix);
        assert_eq!("END".parse::<PatternPosition>().unwrap(), PatternPosition::Suffix);
        assert!("middle".parse::<PatternPosition>().is_err());
    }

    #[test]
    fn test_position_serde() {
        assert_eq!(serde_json::to_string(&PatternPosition::Suffix).unwrap(), "\"suffix\"");
        let parsed: PatternPosition = serde_json::from_str("\"prefix\"").unwrap();
        assert_eq!(parsed, PatternPosition::Prefix);
    }
}
