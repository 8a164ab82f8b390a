use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// The primary key of a stored short URL.
///
/// Short ids contain only ASCII letters and digits. Generated ids are
/// 8 characters long; ids arriving from the outside (path segments, API
/// parameters) are accepted up to [`MAX_LENGTH`] characters so that lookups
/// for unknown slugs simply miss instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShortId(String);

/// Length of ids produced by the random generator.
pub const GENERATED_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 64;

impl ShortId {
    /// Creates a new `ShortId` after validating the input.
    ///
    /// Valid ids are 1-64 characters and contain only `[A-Za-z0-9]`.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Creates a `ShortId` without validation.
    ///
    /// Use this only for ids produced by trusted internal sources
    /// (e.g. generators that are guaranteed to produce valid output).
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        if id.is_empty() || id.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortId(format!(
                "length must be between 1 and {}, got {}",
                MAX_LENGTH,
                id.len()
            )));
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidShortId(format!(
                "must contain only alphanumeric characters: '{}'",
                id
            )));
        }

        Ok(())
    }
}

impl Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShortId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ShortId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        assert!(ShortId::new("a").is_ok());
        assert!(ShortId::new("abc12345").is_ok());
        assert!(ShortId::new("A".repeat(64)).is_ok());
    }

    #[test]
    fn empty_or_too_long() {
        assert!(ShortId::new("").is_err());
        assert!(ShortId::new("a".repeat(65)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortId::new("abc def").is_err());
        assert!(ShortId::new("abc/def").is_err());
        assert!(ShortId::new("my-slug").is_err());
        assert!(ShortId::new("api_health").is_err());
    }

    #[test]
    fn to_url() {
        let id = ShortId::new("abc12345").unwrap();
        assert_eq!(id.to_url("https://kurt.ey"), "https://kurt.ey/abc12345");
        assert_eq!(id.to_url("https://kurt.ey/"), "https://kurt.ey/abc12345");
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let ok: ShortId = serde_json::from_str("\"abc12345\"").unwrap();
        assert_eq!(ok.as_str(), "abc12345");
        assert!(serde_json::from_str::<ShortId>("\"a b\"").is_err());
    }
}
