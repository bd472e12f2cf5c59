#![allow(clippy::expect_used)]

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use fernet::{Codec, Key};

const NOW: u64 = 1_700_000_000;
const TTL: Duration = Duration::from_secs(60);
const LEGACY_SECRET: &str = "JrdICDH6x3M7duQeM8dJEMK4Y5TkBIsYDw1lPy35RiY=";
const LEGACY_TOKEN: &str = "GuAoWrTdBSD3tOAqsTwsqScn7Bx5qi-Yf4R2r1tZ-1MZfU3WxQheTzjwueWMkLCkMbndpcaCULDTmqK4TUgvSa9og_8qSSlyCan3gZrThB1OCJnFxFyf6AgZSic4nGLASedMY8lxTdaOrfe3gdhZGg==|ALJUvh2vqAAOePxO2DN3HA==|2b0eae68d66718f09c62c5fe6803ed25e59a07d7c3080c3e7599337ee17c0d9f";

fn bench_generate(c: &mut Criterion) {
    let codec = Codec::default();
    let key = Key::generate().expect("keygen");

    c.bench_function("generate_hello", |b| {
        b.iter(|| codec.generate(b"hello", &key, NOW).expect("generate"));
    });
    let large = vec![0x5a; 64 * 1024];
    c.bench_function("generate_64k", |b| {
        b.iter(|| codec.generate(&large, &key, NOW).expect("generate"));
    });
}

fn bench_verify(c: &mut Criterion) {
    let codec = Codec::default();
    let key = Key::generate().expect("keygen");
    let token = codec.generate(b"hello", &key, NOW).expect("generate");
    let other = Key::generate().expect("keygen");

    c.bench_function("verify_ok", |b| {
        b.iter(|| codec.verify(&token, TTL, NOW, &key).expect("verify"));
    });
    c.bench_function("verify_bad_key", |b| {
        b.iter(|| codec.verify(&token, TTL, NOW, &other));
    });
    c.bench_function("verify_rotation_last_of_4", |b| {
        let keys: Vec<Key> = (0..3)
            .map(|_| Key::generate().expect("keygen"))
            .chain(std::iter::once(key.clone()))
            .collect();
        b.iter(|| codec.verify_with_keys(&token, TTL, NOW, &keys).expect("verify"));
    });
}

fn bench_legacy(c: &mut Criterion) {
    let codec = Codec::default();
    let key = Key::decode(LEGACY_SECRET).expect("key");

    c.bench_function("verify_legacy_ok", |b| {
        b.iter(|| codec.verify(LEGACY_TOKEN, TTL, 0, &key).expect("verify"));
    });
}

criterion_group!(benches, bench_generate, bench_verify, bench_legacy);
criterion_main!(benches);
