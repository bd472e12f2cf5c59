//! Read-only support for the older JSON-payload token layout:
//!
//! ```text
//! base64(ciphertext) | base64(iv) | hex(HMAC-SHA256)
//! ```
//!
//! The plaintext is a JSON object whose `issued_at` field (RFC 3339) takes
//! the place of the binary framing's timestamp. Tokens in this layout are
//! never produced.

use std::time::Duration;

use base64::engine::GeneralPurpose;
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::codec::cbc_decrypt_in_place;
use crate::encoding::{constant_time_eq, hmac_sha256};
use crate::key::Key;
use crate::padding::unpad;
use crate::types::{BLOCK_SIZE, HALF_KEY_LEN, IV_LEN, LEGACY_SEPARATOR, TAG_LEN};

/// The legacy producer keyed from the text form of the key: the first
/// half of the text signs, the next 16 characters encrypt.
const LEGACY_SIGNING_LEN: usize = 22;

#[derive(Deserialize)]
struct IssuedAt {
    issued_at: DateTime<FixedOffset>,
}

/// Verify a legacy token. Returns the JSON plaintext, or `None` on any
/// failure. There is no clock skew allowance on this path.
#[must_use]
#[allow(clippy::indexing_slicing)] // key text is always 44 bytes
pub fn verify(
    token: &[u8],
    ttl: Duration,
    now: u64,
    key: &Key,
    engine: &GeneralPurpose,
) -> Option<Vec<u8>> {
    if key.is_zero() {
        return reject("zero key");
    }
    let text = Zeroizing::new(key.encode().into_bytes());
    let signing_key = &text[..LEGACY_SIGNING_LEN];
    let mut encryption_key = Zeroizing::new([0u8; HALF_KEY_LEN]);
    encryption_key.copy_from_slice(&text[LEGACY_SIGNING_LEN..LEGACY_SIGNING_LEN + HALF_KEY_LEN]);

    let Some(split) = token.iter().rposition(|&b| b == LEGACY_SEPARATOR) else {
        return reject("missing separator");
    };
    let (fields, tag_hex) = (&token[..split], &token[split + 1..]);
    let mut tag = [0u8; TAG_LEN];
    if hex::decode_to_slice(tag_hex, &mut tag).is_err() {
        return reject("malformed tag hex");
    }

    // HMAC key and message are swapped, matching the legacy producer.
    let expected = hmac_sha256(fields, signing_key);
    if !constant_time_eq(&tag, &expected) {
        return reject("tag mismatch");
    }

    let mut parts = fields.split(|&b| b == LEGACY_SEPARATOR);
    let (Some(ciphertext_b64), Some(iv_b64), None) = (parts.next(), parts.next(), parts.next())
    else {
        return reject("wrong field count");
    };
    let (Ok(mut plaintext), Ok(iv)) = (engine.decode(ciphertext_b64), engine.decode(iv_b64)) else {
        return reject("malformed base64");
    };
    let Ok(iv) = <[u8; IV_LEN]>::try_from(iv.as_slice()) else {
        return reject("wrong iv length");
    };
    if plaintext.is_empty() || plaintext.len() % BLOCK_SIZE != 0 {
        return reject("ciphertext not a positive multiple of the block size");
    }
    cbc_decrypt_in_place(&encryption_key, &iv, &mut plaintext);

    let Some(message_len) = unpad(&plaintext).map(<[u8]>::len) else {
        return reject("malformed padding");
    };
    plaintext.truncate(message_len);

    let Ok(claims) = serde_json::from_slice::<IssuedAt>(&plaintext) else {
        return reject("payload is not a JSON object with issued_at");
    };
    let issued_at = claims.issued_at.timestamp();
    let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let now = i64::try_from(now).unwrap_or(i64::MAX);
    if now > issued_at.saturating_add(ttl) {
        return reject("expired");
    }

    trace!(message_len, "verified legacy token");
    Some(plaintext)
}

fn reject(reason: &'static str) -> Option<Vec<u8>> {
    debug!(reason, "legacy token rejected");
    None
}
