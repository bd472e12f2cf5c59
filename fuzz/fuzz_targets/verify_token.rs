#![no_main]
use std::time::Duration;

use fernet::{Codec, Key};
use libfuzzer_sys::fuzz_target;

const SECRET: &str = "cw_0x689RpI-jtRR7oE8h_eQsKImvJapLeSbXpwF4e4=";

fuzz_target!(|data: &[u8]| {
    let Ok(key) = Key::decode(SECRET) else {
        return;
    };
    // Arbitrary input must never panic, in either framing.
    let codec = Codec::default();
    let _ = codec.verify(data, Duration::from_secs(u64::MAX), 499_162_800, &key);
    let _ = codec.verify_binary(data, Duration::from_secs(60), 499_162_800, &key);
});
