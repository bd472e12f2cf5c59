//! Token generation and verification.
//!
//! Binary token layout (before base64):
//!
//! ```text
//! version (1) ‖ timestamp (8, big-endian) ‖ IV (16) ‖ ciphertext (16·n) ‖ HMAC-SHA256 (32)
//! ```
//!
//! The tag covers every byte before it. The ciphertext is AES-128-CBC of
//! the PKCS #7 padded message under the key's encryption half.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::GeneralPurpose;
use base64::Engine;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, trace};

use crate::encoding::{constant_time_eq, hmac_sha256, URL_SAFE};
use crate::error::FernetError;
use crate::key::Key;
use crate::legacy;
use crate::padding::{pad, unpad};
use crate::types::*;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Settings fixed at codec construction.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Text encoding for tokens.
    pub engine: GeneralPurpose,
    /// How far a token timestamp may run ahead of the verifier's clock.
    pub max_clock_skew: Duration,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            engine: URL_SAFE,
            max_clock_skew: MAX_CLOCK_SKEW,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn with_engine(mut self, engine: GeneralPurpose) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = skew;
        self
    }
}

/// Generates and verifies tokens. Holds no key material; safe to share
/// across threads.
#[derive(Debug, Clone)]
pub struct Codec {
    config: CodecConfig,
    rng: SystemRandom,
}

impl Default for Codec {
    fn default() -> Self {
        Codec::new(CodecConfig::default())
    }
}

impl Codec {
    #[must_use]
    pub fn new(config: CodecConfig) -> Codec {
        Codec {
            config,
            rng: SystemRandom::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encrypt and sign `message` under `key`, stamping it with `now`
    /// (Unix seconds). A fresh random IV is drawn for every call.
    pub fn generate(&self, message: &[u8], key: &Key, now: u64) -> Result<String, FernetError> {
        if key.is_zero() {
            return Err(FernetError::ZeroKey);
        }
        let mut iv = [0u8; IV_LEN];
        self.rng
            .fill(&mut iv)
            .map_err(|_| FernetError::RandomSource("failed to draw IV".into()))?;
        self.generate_with_iv(message, key, &iv, now)
    }

    /// Like [`Codec::generate`] with a caller-chosen IV. Reusing an IV under
    /// the same key breaks confidentiality; this exists for reproducible
    /// test vectors.
    pub fn generate_with_iv(
        &self,
        message: &[u8],
        key: &Key,
        iv: &[u8; IV_LEN],
        now: u64,
    ) -> Result<String, FernetError> {
        if key.is_zero() {
            return Err(FernetError::ZeroKey);
        }
        let mut ciphertext = pad(message);
        cbc_encrypt_in_place(key.encryption_key(), iv, &mut ciphertext);

        let mut frame = Vec::with_capacity(CIPHERTEXT_OFFSET + ciphertext.len() + TAG_LEN);
        frame.push(VERSION);
        frame.extend_from_slice(&now.to_be_bytes());
        frame.extend_from_slice(iv);
        frame.extend_from_slice(&ciphertext);
        let tag = hmac_sha256(key.signing_key(), &frame);
        frame.extend_from_slice(&tag);

        trace!(message_len = message.len(), timestamp = now, "generated token");
        Ok(self.config.engine.encode(&frame))
    }

    /// Verify `token` under `key` and return its message.
    ///
    /// Tokens containing `|` are read with the legacy JSON-payload framing;
    /// everything else uses the binary framing. Returns `None` on any
    /// failure, without saying which check failed.
    #[must_use]
    pub fn verify(
        &self,
        token: impl AsRef<[u8]>,
        ttl: Duration,
        now: u64,
        key: &Key,
    ) -> Option<Vec<u8>> {
        let token = token.as_ref();
        match Framing::probe(token) {
            Framing::Binary => self.verify_binary(token, ttl, now, key),
            Framing::Legacy => legacy::verify(token, ttl, now, key, &self.config.engine),
        }
    }

    /// Verify a token in the binary framing only.
    #[must_use]
    #[allow(clippy::indexing_slicing)] // lengths checked against MIN_TOKEN_LEN
    pub fn verify_binary(&self, token: &[u8], ttl: Duration, now: u64, key: &Key) -> Option<Vec<u8>> {
        if key.is_zero() {
            return reject("zero key");
        }
        let Ok(data) = self.config.engine.decode(token) else {
            return reject("malformed base64");
        };
        if data.len() < MIN_TOKEN_LEN {
            return reject("token too short");
        }
        if data[0] != VERSION {
            return reject("unknown version");
        }

        let (signed, tag) = data.split_at(data.len() - TAG_LEN);
        let expected = hmac_sha256(key.signing_key(), signed);
        let tag_ok = constant_time_eq(tag, &expected);

        let mut ts = [0u8; TIMESTAMP_LEN];
        ts.copy_from_slice(&signed[TIMESTAMP_OFFSET..IV_OFFSET]);
        let fresh = self.is_fresh(u64::from_be_bytes(ts), ttl, now);

        // Both checks always run before either result is acted on.
        if !tag_ok {
            return reject("tag mismatch");
        }
        if !fresh {
            return reject("timestamp outside ttl or clock skew window");
        }

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&signed[IV_OFFSET..CIPHERTEXT_OFFSET]);
        let mut plaintext = signed[CIPHERTEXT_OFFSET..].to_vec();
        if plaintext.is_empty() || plaintext.len() % BLOCK_SIZE != 0 {
            return reject("ciphertext not a positive multiple of the block size");
        }
        cbc_decrypt_in_place(key.encryption_key(), &iv, &mut plaintext);

        let Some(message_len) = unpad(&plaintext).map(<[u8]>::len) else {
            return reject("malformed padding");
        };
        plaintext.truncate(message_len);
        trace!(message_len, "verified token");
        Some(plaintext)
    }

    fn is_fresh(&self, timestamp: u64, ttl: Duration, now: u64) -> bool {
        let expired = now > timestamp.saturating_add(ttl.as_secs());
        let from_future = timestamp > now.saturating_add(self.config.max_clock_skew.as_secs());
        !expired & !from_future
    }
}

/// Current Unix time in whole seconds; zero if the clock reads before 1970.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn reject(reason: &'static str) -> Option<Vec<u8>> {
    debug!(reason, "token rejected");
    None
}

/// AES-128-CBC over a buffer already padded to whole blocks.
pub(crate) fn cbc_encrypt_in_place(key: &[u8; 16], iv: &[u8; IV_LEN], buf: &mut [u8]) {
    let mut cipher = Aes128CbcEnc::new(GenericArray::from_slice(key), GenericArray::from_slice(iv));
    for block in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

pub(crate) fn cbc_decrypt_in_place(key: &[u8; 16], iv: &[u8; IV_LEN], buf: &mut [u8]) {
    let mut cipher = Aes128CbcDec::new(GenericArray::from_slice(key), GenericArray::from_slice(iv));
    for block in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}
