//! Key naming one cached roster.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cache key for an on-call roster, e.g. `oncall` or `oncall-platform`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheKey(String);

impl CacheKey {
    /// Validate that the key is non-empty and carries no surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Parse a comma-separated key list, trimming each entry and dropping
    /// duplicates while preserving first-seen order.
    ///
    /// # Examples
    /// ```
    /// use library_api::domain::ports::CacheKey;
    ///
    /// let keys = CacheKey::parse_list("oncall, oncall-db ,oncall").expect("valid list");
    /// let names: Vec<&str> = keys.iter().map(CacheKey::as_str).collect();
    /// assert_eq!(names, ["oncall", "oncall-db"]);
    /// ```
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, CacheKeyValidationError> {
        let mut keys: Vec<Self> = Vec::new();
        for part in raw.split(',') {
            let key = Self::new(part.trim())?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CacheKey {
    type Error = CacheKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CacheKey> for String {
    fn from(value: CacheKey) -> Self {
        value.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    #[error("cache key must not be empty")]
    Empty,
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
