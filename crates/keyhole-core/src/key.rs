use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

const MIN_LENGTH: usize = 1;
/// Length of a hex-rendered SHA-256 digest.
pub const MAX_LENGTH: usize = 64;

/// A validated short key identifying a shortened URL.
///
/// Short keys are a prefix of a lowercase hexadecimal SHA-256 digest, so
/// they are 1-64 characters long and contain only `[0-9a-f]`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortKey(SmolStr);

impl ShortKey {
    /// Parses a short key from untrusted input.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyhole_core::ShortKey;
    ///
    /// assert!(ShortKey::parse("ed1d4137").is_ok());
    /// assert!(ShortKey::parse("ED1D4137").is_err());
    /// ```
    pub fn parse(key: impl AsRef<str>) -> Result<Self> {
        let key = key.as_ref();
        Self::validate(key)?;
        Ok(Self(SmolStr::new(key)))
    }

    /// Creates a `ShortKey` without validation.
    ///
    /// Use this only for keys cut from a digest by the generator, or read
    /// back from a store that only ever received validated keys.
    pub fn new_unchecked(key: impl AsRef<str>) -> Self {
        Self(SmolStr::new(key))
    }

    /// Returns the short key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds the public short URL for this key under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    fn validate(key: &str) -> Result<()> {
        if key.len() < MIN_LENGTH || key.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortKey(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                key.len()
            )));
        }

        if !key
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(CoreError::InvalidShortKey(format!(
                "must contain only lowercase hexadecimal characters: '{}'",
                key
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortKey").field(&self.0).finish()
    }
}

impl Display for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ShortKey> for String {
    fn from(key: ShortKey) -> Self {
        key.0.into()
    }
}
