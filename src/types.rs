use std::time::Duration;

/// Token format version byte.
pub const VERSION: u8 = 0x80;

/// Raw key length in bytes.
pub const KEY_LEN: usize = 32;

/// Length of each key half (signing, encryption).
pub const HALF_KEY_LEN: usize = KEY_LEN / 2;

/// AES block size, also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// Constant: IV length.
pub const IV_LEN: usize = BLOCK_SIZE;

/// Constant: big-endian Unix timestamp length.
pub const TIMESTAMP_LEN: usize = 8;

/// Constant: HMAC-SHA256 tag length.
pub const TAG_LEN: usize = 32;

/// Offset of the timestamp within a decoded token.
pub const TIMESTAMP_OFFSET: usize = 1;

/// Offset of the IV within a decoded token.
pub const IV_OFFSET: usize = TIMESTAMP_OFFSET + TIMESTAMP_LEN;

/// Offset of the ciphertext within a decoded token.
pub const CIPHERTEXT_OFFSET: usize = IV_OFFSET + IV_LEN;

/// Smallest decodable token: version, timestamp, IV and tag with no ciphertext.
pub const MIN_TOKEN_LEN: usize = CIPHERTEXT_OFFSET + TAG_LEN;

/// How far a token timestamp may run ahead of the verifier's clock.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Field separator used only by the legacy JSON-payload framing.
pub const LEGACY_SEPARATOR: u8 = b'|';

/// Which framing a token uses, chosen by a structural probe of its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `base64(version ‖ timestamp ‖ iv ‖ ciphertext ‖ tag)`.
    Binary,
    /// `base64(ciphertext) | base64(iv) | hex(tag)`, read-only.
    Legacy,
}

impl Framing {
    pub fn probe(token: &[u8]) -> Framing {
        if token.contains(&LEGACY_SEPARATOR) {
            Framing::Legacy
        } else {
            Framing::Binary
        }
    }
}
