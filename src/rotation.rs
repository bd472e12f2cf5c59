//! Verification against an ordered set of keys, for key rotation.

use std::time::Duration;

use tracing::debug;

use crate::codec::Codec;
use crate::key::Key;

impl Codec {
    /// Try each key in order and return the message from the first one that
    /// verifies `token`. Put the newest key first so current tokens match
    /// on the first attempt.
    #[must_use]
    pub fn verify_with_keys(
        &self,
        token: impl AsRef<[u8]>,
        ttl: Duration,
        now: u64,
        keys: &[Key],
    ) -> Option<Vec<u8>> {
        let token = token.as_ref();
        keys.iter().enumerate().find_map(|(index, key)| {
            let message = self.verify(token, ttl, now, key)?;
            debug!(index, "token verified by key");
            Some(message)
        })
    }
}
