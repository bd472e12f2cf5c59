#![no_main]
use fernet::Key;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // A decodable key must re-decode to itself from its canonical text.
    if let Ok(key) = Key::decode(text) {
        let encoded = key.encode();
        assert_eq!(encoded.len(), 44);
        assert!(Key::decode(&encoded).is_ok_and(|again| again == key));
    }
});
