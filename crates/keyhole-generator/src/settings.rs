use crate::error::SettingsError;
use keyhole_core::key::MAX_LENGTH;
use typed_builder::TypedBuilder;

pub const DEFAULT_KEY_LENGTH: usize = 8;
pub const DEFAULT_MAX_RETRIES: u32 = 100;

/// Settings for [`HashKeyGenerator`](crate::HashKeyGenerator).
///
/// ```
/// use keyhole_generator::GeneratorSettings;
///
/// let settings = GeneratorSettings::builder().key_length(10).build();
/// assert_eq!(settings.key_length, 10);
/// assert_eq!(settings.max_retries, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct GeneratorSettings {
    /// Number of hex characters kept from the digest.
    #[builder(default = DEFAULT_KEY_LENGTH)]
    pub key_length: usize,
    /// Number of salted candidates tried before giving up.
    #[builder(default = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.key_length == 0 || self.key_length > MAX_LENGTH {
            return Err(SettingsError::InvalidKeyLength {
                key_length: self.key_length,
                max_key_length: MAX_LENGTH,
            });
        }

        if self.max_retries == 0 {
            return Err(SettingsError::InvalidMaxRetries);
        }

        Ok(())
    }
}
