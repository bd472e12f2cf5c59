#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Exit codes and output of the command-line tools.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use fernet::Key;

const KEY_VAR: &str = "FERNET_CLI_TEST_KEY";

fn sign(args: &[&str], key: Option<&str>, input: &[u8]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fernet-sign"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .env_remove(KEY_VAR)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(key) = key {
        cmd.env(KEY_VAR, key);
    }
    let mut child = cmd.spawn().expect("failed to start fernet-sign");
    // a usage error may exit before reading stdin
    let _ = child.stdin.take().unwrap().write_all(input);
    child.wait_with_output().unwrap()
}

#[test]
fn test_keygen_prints_one_key() {
    let out = Command::new(env!("CARGO_BIN_EXE_fernet-keygen"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let text = stdout.strip_suffix('\n').unwrap();
    assert_eq!(text.len(), 44);
    let key = Key::decode(text).unwrap();
    assert!(!key.is_zero());
}

#[test]
fn test_sign_prints_token_and_newline() {
    let key = Key::generate().unwrap();
    let out = sign(&[KEY_VAR], Some(&key.encode()), b"hello from stdin");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let token = stdout.strip_suffix('\n').unwrap();
    assert!(!token.contains('\n'));
    assert_eq!(
        key.verify_token(token, Duration::from_secs(60)).unwrap(),
        b"hello from stdin"
    );
}

#[test]
fn test_sign_empty_input() {
    let key = Key::generate().unwrap();
    let out = sign(&[KEY_VAR], Some(&key.encode()), b"");
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let token = stdout.trim_end_matches('\n');
    assert_eq!(key.verify_token(token, Duration::from_secs(60)).unwrap(), b"");
}

#[test]
fn test_sign_wrong_argument_count_is_usage_error() {
    for args in [&[][..], &[KEY_VAR, "extra"][..]] {
        let out = sign(args, None, b"");
        assert_eq!(out.status.code(), Some(2), "args: {args:?}");
        assert!(out.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("Usage"), "stderr: {stderr}");
    }
}

#[test]
fn test_sign_undecodable_key_exits_1() {
    for key in [None, Some("not a key"), Some("c2hvcnQ=")] {
        let out = sign(&[KEY_VAR], key, b"hello");
        assert_eq!(out.status.code(), Some(1), "key: {key:?}");
        assert!(out.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.starts_with("fernet: "), "stderr: {stderr}");
    }
}

#[test]
fn test_sign_zero_key_exits_1() {
    let zero = Key::from_bytes([0u8; 32]).encode();
    let out = sign(&[KEY_VAR], Some(&zero), b"hello");
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_vector_generator_reproduces_testdata() {
    for set in ["generate", "verify", "invalid"] {
        let out = Command::new(env!("CARGO_BIN_EXE_gen_test_vectors"))
            .arg(set)
            .env_remove("RUST_LOG")
            .output()
            .unwrap();
        assert!(out.status.success(), "{set}: {}", String::from_utf8_lossy(&out.stderr));
        let path = format!("{}/testdata/{set}.json", env!("CARGO_MANIFEST_DIR"));
        let stored = std::fs::read_to_string(path).unwrap();
        let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
        let printed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(printed, stored, "{set} vectors drifted");
    }
}
