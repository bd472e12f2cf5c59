//! PKCS #7 block padding (RFC 5652 §6.3) to the AES block size.

use crate::types::BLOCK_SIZE;

// Every pad length must fit in the pad byte itself.
const _: () = assert!(BLOCK_SIZE > 0 && BLOCK_SIZE <= u8::MAX as usize);

/// Pad `message` to a multiple of [`BLOCK_SIZE`].
///
/// Always appends between 1 and `BLOCK_SIZE` bytes, each holding the pad
/// length, so an already aligned message gains a whole block.
#[must_use]
pub(crate) fn pad(message: &[u8]) -> Vec<u8> {
    let fill = BLOCK_SIZE - message.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(message.len() + fill);
    out.extend_from_slice(message);
    out.resize(message.len() + fill, fill as u8);
    out
}

/// Strip PKCS #7 padding from `padded`, the inverse of [`pad`].
///
/// Returns `None` when the padding is malformed: an empty input, a final
/// byte of zero or above `BLOCK_SIZE`, or trailing bytes that disagree.
#[must_use]
pub(crate) fn unpad(padded: &[u8]) -> Option<&[u8]> {
    let &last = padded.last()?;
    let fill = usize::from(last);
    if fill == 0 || fill > BLOCK_SIZE || fill > padded.len() {
        return None;
    }
    let (message, tail) = padded.split_at(padded.len() - fill);
    if tail.iter().any(|&b| b != last) {
        return None;
    }
    Some(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pad_short_message() {
        let p = pad(b"hello");
        assert_eq!(p.len(), 16);
        assert_eq!(&p[..5], b"hello");
        assert!(p[5..].iter().all(|&b| b == 11));
    }

    #[test]
    fn test_pad_aligned_message_adds_full_block() {
        let p = pad(&[7u8; 16]);
        assert_eq!(p.len(), 32);
        assert!(p[16..].iter().all(|&b| b == 16));
    }

    #[test]
    fn test_pad_empty_message() {
        assert_eq!(pad(b""), vec![16u8; 16]);
    }

    #[test]
    fn test_unpad_rejects_malformed() {
        assert_eq!(unpad(b""), None);
        let mut zero = vec![b'a'; 15];
        zero.push(0);
        assert_eq!(unpad(&zero), None);
        assert_eq!(unpad(&[17u8; 32]), None);
        assert_eq!(unpad(&[3u8, 3]), None);
        let mut mixed = vec![b'a'; 13];
        mixed.extend_from_slice(&[2, 3, 3]);
        assert_eq!(unpad(&mixed), None);
    }

    #[test]
    fn test_pad_byte_always_nonzero() {
        for len in 0..=3 * BLOCK_SIZE {
            let message = vec![0xffu8; len];
            let padded = pad(&message);
            let last = *padded.last().unwrap();
            assert!((1..=BLOCK_SIZE as u8).contains(&last), "len {len}");
            assert_eq!(unpad(&padded), Some(message.as_slice()));
        }
    }

    #[test]
    fn test_unpad_full_block() {
        assert_eq!(unpad(&[16u8; 16]), Some(&b""[..]));
    }

    proptest! {
        #[test]
        fn prop_unpad_inverts_pad(message in proptest::collection::vec(any::<u8>(), 0..100)) {
            let padded = pad(&message);
            let added = padded.len() - message.len();
            prop_assert!((1..=16).contains(&added));
            prop_assert_eq!(padded.len() % 16, 0);
            prop_assert_eq!(unpad(&padded), Some(message.as_slice()));
        }
    }
}
