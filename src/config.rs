use serde::Deserialize;

use crate::errors::{Error, Result};
use crate::voprf::MAX_NONCE_LEN;

/// Issuer configuration.
///
/// ```
/// use voprf_tokens::Config;
/// let config = Config::from_json(r#"{"maxNonceLen": 64}"#).unwrap();
/// assert_eq!(config.max_nonce_len, 64);
/// assert!(config.key_seed.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    /// Hex-encoded 32-byte seed. When set, the issuer key is derived from it
    /// instead of being drawn from the OS random source.
    pub key_seed: Option<String>,
    /// Nonces longer than this many bytes are refused at redemption.
    pub max_nonce_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            key_seed: None,
            max_nonce_len: MAX_NONCE_LEN,
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|_| Error::InvalidInput("malformed configuration"))
    }

    /// Decodes `key_seed`, if any.
    pub(crate) fn seed(&self) -> Result<Option<[u8; 32]>> {
        let encoded = match &self.key_seed {
            Some(encoded) => encoded,
            None => return Ok(None),
        };
        let bytes = hex::decode(encoded).map_err(|_| Error::InvalidInput("key seed is not hex"))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidInput("key seed must be 32 bytes"));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        Ok(Some(seed))
    }
}
