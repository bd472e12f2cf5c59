//! Fernet keys: 32 secret bytes, split into a signing half and an
//! encryption half.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::Engine;
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::codec::{unix_now, Codec};
use crate::encoding::URL_SAFE;
use crate::error::FernetError;
use crate::types::{HALF_KEY_LEN, KEY_LEN};

/// A Fernet key.
///
/// The lower 16 bytes sign, the upper 16 bytes encrypt. Key bytes are zeroed
/// when the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    signing: [u8; HALF_KEY_LEN],
    encryption: [u8; HALF_KEY_LEN],
}

impl Key {
    /// Generate a random key from the operating system's secure source.
    pub fn generate() -> Result<Key, FernetError> {
        let mut raw = Zeroizing::new([0u8; KEY_LEN]);
        SystemRandom::new()
            .fill(&mut raw[..])
            .map_err(|_| FernetError::RandomSource("system random source failed".into()))?;
        Ok(Key::from_bytes(*raw))
    }

    #[must_use]
    pub fn from_bytes(mut raw: [u8; KEY_LEN]) -> Key {
        let mut signing = [0u8; HALF_KEY_LEN];
        let mut encryption = [0u8; HALF_KEY_LEN];
        let (lo, hi) = raw.split_at(HALF_KEY_LEN);
        signing.copy_from_slice(lo);
        encryption.copy_from_slice(hi);
        raw.zeroize();
        Key {
            signing,
            encryption,
        }
    }

    pub fn from_slice(raw: &[u8]) -> Result<Key, FernetError> {
        let raw: [u8; KEY_LEN] = raw.try_into().map_err(|_| FernetError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: raw.len(),
        })?;
        Ok(Key::from_bytes(raw))
    }

    /// Decode a key from its URL-safe base64 text form.
    pub fn decode(text: &str) -> Result<Key, FernetError> {
        let raw = Zeroizing::new(URL_SAFE.decode(text)?);
        Key::from_slice(&raw)
    }

    /// Returns the URL-safe base64 text form, the inverse of [`Key::decode`].
    #[must_use]
    pub fn encode(&self) -> String {
        let raw = self.as_bytes();
        URL_SAFE.encode(&raw[..])
    }

    #[must_use]
    pub fn as_bytes(&self) -> Zeroizing<[u8; KEY_LEN]> {
        let mut raw = Zeroizing::new([0u8; KEY_LEN]);
        let (lo, hi) = raw.split_at_mut(HALF_KEY_LEN);
        lo.copy_from_slice(&self.signing);
        hi.copy_from_slice(&self.encryption);
        raw
    }

    #[must_use]
    pub fn signing_key(&self) -> &[u8; HALF_KEY_LEN] {
        &self.signing
    }

    #[must_use]
    pub fn encryption_key(&self) -> &[u8; HALF_KEY_LEN] {
        &self.encryption
    }

    /// True for the all-zero key, which never signs or verifies anything.
    /// Runs in constant time.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        let zero = [0u8; HALF_KEY_LEN];
        (self.signing.ct_eq(&zero) & self.encryption.ct_eq(&zero)).into()
    }

    /// Encrypt and sign `message` at the current system time.
    pub fn generate_token(&self, message: &[u8]) -> Result<String, FernetError> {
        Codec::default().generate(message, self, unix_now())
    }

    /// Verify `token` against the current system time, accepting it if it
    /// was generated at most `ttl` ago. Returns `None` for any invalid token.
    #[must_use]
    pub fn verify_token(&self, token: impl AsRef<[u8]>, ttl: Duration) -> Option<Vec<u8>> {
        Codec::default().verify(token, ttl, unix_now(), self)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        (self.signing.ct_eq(&other.signing) & self.encryption.ct_eq(&other.encryption)).into()
    }
}

impl Eq for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(<redacted>)")
    }
}

impl FromStr for Key {
    type Err = FernetError;

    fn from_str(s: &str) -> Result<Key, FernetError> {
        Key::decode(s)
    }
}
