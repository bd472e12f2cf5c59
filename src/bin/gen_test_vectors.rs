//! Generates the deterministic token vectors under testdata/.
//! Run with: cargo run --bin gen_test_vectors -- generate > testdata/generate.json

use std::error::Error;
use std::time::Duration;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use base64::Engine;
use clap::{Parser, ValueEnum};
use serde::Serialize;

use fernet::encoding::{hmac_sha256, URL_SAFE};
use fernet::types::{BLOCK_SIZE, CIPHERTEXT_OFFSET, IV_LEN, MIN_TOKEN_LEN, TAG_LEN};
use fernet::{Codec, Key};

#[derive(Clone, Copy, ValueEnum)]
enum Set {
    /// Tokens produced from a fixed key, IV and timestamp.
    Generate,
    /// The same tokens checked one second later with a 60 second TTL,
    /// plus the TTL and clock skew boundaries.
    Verify,
    /// Malformed, tampered, stale or foreign tokens that must not verify.
    Invalid,
}

#[derive(Parser)]
#[command(name = "gen_test_vectors", about = "Print Fernet test vectors as JSON")]
struct Cli {
    #[arg(value_enum)]
    set: Set,
}

#[derive(Serialize)]
struct Vector {
    desc: &'static str,
    secret: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iv: Option<[u8; IV_LEN]>,
    now: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_sec: Option<u64>,
    token: String,
}

const SECRET: &str = "cw_0x689RpI-jtRR7oE8h_eQsKImvJapLeSbXpwF4e4=";
// "first secret key for test vector"
const SECRET2: &str = "Zmlyc3Qgc2VjcmV0IGtleSBmb3IgdGVzdCB2ZWN0b3I=";
const TTL: Duration = Duration::from_secs(60);
// 1985-10-26T01:20:00-07:00
const T: u64 = 499_162_800;

struct Case {
    desc: &'static str,
    secret: &'static str,
    src: &'static str,
    iv: [u8; IV_LEN],
    now: u64,
}

fn counting_iv() -> [u8; IV_LEN] {
    std::array::from_fn(|i| i as u8)
}

fn cases() -> Vec<Case> {
    let iv = counting_iv();
    let iv2: [u8; IV_LEN] = std::array::from_fn(|i| 0xa0 + i as u8);
    vec![
        Case {
            desc: "hello at 1985-10-26T01:20:00-07:00",
            secret: SECRET,
            src: "hello",
            iv,
            now: T,
        },
        Case {
            desc: "hello at 1985-10-26T01:20:00-08:00",
            secret: SECRET,
            src: "hello",
            iv,
            now: 499_166_400,
        },
        Case {
            desc: "empty message",
            secret: SECRET,
            src: "",
            iv,
            now: T,
        },
        Case {
            desc: "block aligned message",
            secret: SECRET2,
            src: "0123456789abcdef",
            iv: iv2,
            now: 1_700_000_000,
        },
        Case {
            desc: "multi block message",
            secret: SECRET2,
            src: "the quick brown fox jumps over the lazy dog",
            iv: iv2,
            now: 1_700_000_000,
        },
    ]
}

fn generate_vectors(codec: &Codec) -> Result<Vec<Vector>, Box<dyn Error>> {
    let mut vectors = Vec::new();
    for case in cases() {
        let key = Key::decode(case.secret)?;
        vectors.push(Vector {
            desc: case.desc,
            secret: case.secret,
            src: Some(case.src),
            iv: Some(case.iv),
            now: case.now,
            ttl_sec: None,
            token: codec.generate_with_iv(case.src.as_bytes(), &key, &case.iv, case.now)?,
        });
    }
    Ok(vectors)
}

fn verify_vectors(codec: &Codec) -> Result<Vec<Vector>, Box<dyn Error>> {
    let mut vectors: Vec<Vector> = generate_vectors(codec)?
        .into_iter()
        .map(|v| Vector {
            iv: None,
            now: v.now + 1,
            ttl_sec: Some(TTL.as_secs()),
            ..v
        })
        .collect();

    let key = Key::decode(SECRET)?;
    let hello = codec.generate_with_iv(b"hello", &key, &counting_iv(), T)?;
    for (desc, now) in [
        ("token at the edge of its ttl", T + TTL.as_secs()),
        ("timestamp within clock skew", T - 60),
    ] {
        vectors.push(Vector {
            desc,
            secret: SECRET,
            src: Some("hello"),
            iv: None,
            now,
            ttl_sec: Some(TTL.as_secs()),
            token: hello.clone(),
        });
    }

    for v in &vectors {
        let key = Key::decode(v.secret)?;
        if codec.verify(&v.token, TTL, v.now, &key).is_none() {
            return Err(format!("vector '{}' does not verify", v.desc).into());
        }
    }
    Ok(vectors)
}

/// Join `header` and `body`, append the HMAC tag and encode the result.
fn sign_frame(key: &Key, header: &[u8], body: &[u8]) -> String {
    let mut frame = [header, body].concat();
    let tag = hmac_sha256(key.signing_key(), &frame);
    frame.extend_from_slice(&tag);
    URL_SAFE.encode(&frame)
}

/// Encrypt one block as it is, with no padding added.
fn encrypt_raw_block(key: &Key, iv: &[u8; IV_LEN], block: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    let mut out = block.to_vec();
    let mut cipher = cbc::Encryptor::<aes::Aes128>::new(
        GenericArray::from_slice(key.encryption_key()),
        GenericArray::from_slice(iv),
    );
    cipher.encrypt_block_mut(GenericArray::from_mut_slice(&mut out));
    out
}

/// `hello` followed by eleven copies of `fill`.
fn hello_block(fill: u8) -> [u8; BLOCK_SIZE] {
    let mut block = [fill; BLOCK_SIZE];
    for (b, &h) in block.iter_mut().zip(b"hello") {
        *b = h;
    }
    block
}

fn invalid_vectors(codec: &Codec) -> Result<Vec<Vector>, Box<dyn Error>> {
    let key = Key::decode(SECRET)?;
    let iv = counting_iv();
    let good = codec.generate_with_iv(b"hello", &key, &iv, T)?;
    let raw = URL_SAFE.decode(&good)?;
    let (signed, _) = raw.split_at(raw.len() - TAG_LEN);
    let (header, ciphertext) = signed.split_at(CIPHERTEXT_OFFSET);

    let mut bad_mac = raw.clone();
    if let Some(last) = bad_mac.last_mut() {
        *last ^= 1;
    }
    let (truncated, _) = raw.split_at(MIN_TOKEN_LEN - 1);
    let (_, good_tail) = good.split_at(8);
    let (short_ciphertext, _) = ciphertext.split_at(BLOCK_SIZE - 1);
    let mut other_version = header.to_vec();
    if let Some(version) = other_version.first_mut() {
        *version = 0x81;
    }

    let framed = |body: &[u8]| sign_frame(&key, header, body);
    let tokens = [
        ("incorrect mac", SECRET, T + 1, URL_SAFE.encode(&bad_mac)),
        ("too short", SECRET, T + 1, URL_SAFE.encode(truncated)),
        ("invalid base64", SECRET, T + 1, format!("%%%%%%%%{good_tail}")),
        (
            "payload size not multiple of block size",
            SECRET,
            T + 1,
            framed(short_ciphertext),
        ),
        ("missing ciphertext", SECRET, T + 1, framed(b"")),
        (
            "zero padding byte",
            SECRET,
            T + 1,
            framed(&encrypt_raw_block(&key, &iv, &hello_block(0))),
        ),
        (
            "padding byte out of range",
            SECRET,
            T + 1,
            framed(&encrypt_raw_block(&key, &iv, &hello_block(17))),
        ),
        (
            "wrong version",
            SECRET,
            T + 1,
            sign_frame(&key, &other_version, ciphertext),
        ),
        ("far-future timestamp", SECRET, T - 61, good.clone()),
        ("expired ttl", SECRET, T + 61, good.clone()),
        ("wrong key", SECRET2, T + 1, good.clone()),
    ];

    let mut vectors = Vec::new();
    for (desc, secret, now, token) in tokens {
        let key = Key::decode(secret)?;
        if codec.verify(&token, TTL, now, &key).is_some() {
            return Err(format!("vector '{desc}' unexpectedly verifies").into());
        }
        vectors.push(Vector {
            desc,
            secret,
            src: None,
            iv: None,
            now,
            ttl_sec: Some(TTL.as_secs()),
            token,
        });
    }
    Ok(vectors)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let codec = Codec::default();
    let vectors = match cli.set {
        Set::Generate => generate_vectors(&codec)?,
        Set::Verify => verify_vectors(&codec)?,
        Set::Invalid => invalid_vectors(&codec)?,
    };
    println!("{}", serde_json::to_string_pretty(&vectors)?);
    Ok(())
}
