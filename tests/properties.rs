#![allow(clippy::unwrap_used, clippy::indexing_slicing)]
//! Property tests over random keys, messages and times.

use std::time::Duration;

use base64::Engine;
use proptest::prelude::*;

use fernet::encoding::URL_SAFE;
use fernet::{Codec, Key};

fn arb_key() -> impl Strategy<Value = Key> {
    any::<[u8; 32]>()
        .prop_filter("non-zero key", |raw| raw.iter().any(|&b| b != 0))
        .prop_map(Key::from_bytes)
}

proptest! {
    #[test]
    fn prop_roundtrip(
        key in arb_key(),
        message in proptest::collection::vec(any::<u8>(), 0..256),
        now in 0u64..4_000_000_000,
        ttl in 0u64..1_000_000,
    ) {
        let codec = Codec::default();
        let token = codec.generate(&message, &key, now).unwrap();
        let got = codec.verify(&token, Duration::from_secs(ttl), now, &key);
        prop_assert_eq!(got, Some(message));
    }

    #[test]
    fn prop_single_bit_flip_rejected(
        key in arb_key(),
        message in proptest::collection::vec(any::<u8>(), 0..64),
        bit in any::<usize>(),
    ) {
        let codec = Codec::default();
        let now = 1_700_000_000;
        let token = codec.generate(&message, &key, now).unwrap();
        let mut raw = URL_SAFE.decode(&token).unwrap();
        let bit = bit % (raw.len() * 8);
        raw[bit / 8] ^= 1 << (bit % 8);
        let tampered = URL_SAFE.encode(&raw);
        prop_assert_eq!(codec.verify(&tampered, Duration::from_secs(60), now, &key), None);
    }

    #[test]
    fn prop_expiry(
        key in arb_key(),
        now in 0u64..4_000_000_000,
        ttl in 0u64..1_000_000,
    ) {
        let codec = Codec::default();
        let token = codec.generate(b"expiring", &key, now).unwrap();
        let ttl_d = Duration::from_secs(ttl);
        prop_assert!(codec.verify(&token, ttl_d, now + ttl, &key).is_some());
        prop_assert!(codec.verify(&token, ttl_d, now + ttl + 1, &key).is_none());
    }

    #[test]
    fn prop_clock_skew_rejected(
        key in arb_key(),
        ahead in 61u64..1_000_000,
    ) {
        let codec = Codec::default();
        let verifier_now = 1_700_000_000;
        let token = codec.generate(b"future", &key, verifier_now + ahead).unwrap();
        prop_assert!(codec.verify(&token, Duration::from_secs(u64::MAX), verifier_now, &key).is_none());
    }

    #[test]
    fn prop_key_text_roundtrip(key in arb_key()) {
        prop_assert_eq!(Key::decode(&key.encode()).unwrap(), key);
    }
}
