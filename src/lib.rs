//! Fernet: authenticated symmetric encryption tokens.
//!
//! A token carries a message encrypted with AES-128-CBC, the time it was
//! made, and an HMAC-SHA256 tag over both. Verification checks the tag, the
//! token's age against a TTL, and then decrypts. Every failure looks the
//! same to the caller.
//!
//! ```
//! use std::time::Duration;
//!
//! let key = fernet::Key::generate()?;
//! let token = key.generate_token(b"hello")?;
//! assert_eq!(key.verify_token(&token, Duration::from_secs(60)).as_deref(), Some(&b"hello"[..]));
//! # Ok::<(), fernet::error::FernetError>(())
//! ```

use std::time::Duration;

pub mod codec;
pub mod encoding;
pub mod error;
pub mod key;
pub mod legacy;
mod padding;
pub mod rotation;
pub mod stream;
pub mod types;

pub use codec::{Codec, CodecConfig};
pub use error::FernetError;
pub use key::Key;
pub use stream::{TokenReader, TokenWriter};

/// Encrypt and sign `message` at `now` (Unix seconds) with the default codec.
pub fn generate(message: &[u8], key: &Key, now: u64) -> Result<String, FernetError> {
    Codec::default().generate(message, key, now)
}

/// Verify `token` at `now` with the default codec.
#[must_use]
pub fn verify(token: impl AsRef<[u8]>, ttl: Duration, now: u64, key: &Key) -> Option<Vec<u8>> {
    Codec::default().verify(token, ttl, now, key)
}

/// Verify `token` against each of `keys` in order with the default codec.
#[must_use]
pub fn verify_with_keys(
    token: impl AsRef<[u8]>,
    ttl: Duration,
    now: u64,
    keys: &[Key],
) -> Option<Vec<u8>> {
    Codec::default().verify_with_keys(token, ttl, now, keys)
}
