//! Buffering adapters between byte streams and tokens.
//!
//! A token authenticates the whole message, so neither adapter emits
//! anything until it has seen all of its input.

use std::io::{self, Cursor, Read, Write};
use std::time::Duration;

use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::codec::{unix_now, Codec};
use crate::error::FernetError;
use crate::key::Key;

/// Collects everything written to it and, on [`TokenWriter::finish`],
/// writes a single token for the collected bytes to the inner writer.
/// Dropping it unfinished writes nothing and wipes the buffered bytes.
pub struct TokenWriter<W: Write> {
    inner: W,
    key: Key,
    codec: Codec,
    buf: Zeroizing<Vec<u8>>,
    finished: bool,
}

impl<W: Write> TokenWriter<W> {
    pub fn new(inner: W, key: Key) -> Self {
        TokenWriter::with_codec(inner, key, Codec::default())
    }

    pub fn with_codec(inner: W, key: Key, codec: Codec) -> Self {
        TokenWriter {
            inner,
            key,
            codec,
            buf: Zeroizing::new(Vec::new()),
            finished: false,
        }
    }

    /// Generate the token for everything written so far and send it
    /// downstream. Fails if the token was already written; call
    /// [`TokenWriter::reset`] to start a new one.
    pub fn finish(&mut self) -> Result<(), FernetError> {
        if self.finished {
            return Err(already_finished().into());
        }
        let token = self.codec.generate(&self.buf, &self.key, unix_now())?;
        self.inner.write_all(token.as_bytes())?;
        self.inner.flush()?;
        self.buf.zeroize();
        self.finished = true;
        debug!(token_len = token.len(), "token written");
        Ok(())
    }

    /// Discard buffered bytes and allow another token to be written.
    pub fn reset(&mut self) {
        self.buf.zeroize();
        self.finished = false;
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(mut self) -> W {
        self.buf.zeroize();
        let TokenWriter { inner, .. } = self;
        inner
    }
}

impl<W: Write> Write for TokenWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.finished {
            return Err(already_finished());
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    /// Nothing reaches the inner writer before `finish`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn already_finished() -> io::Error {
    io::Error::other("token already written")
}

enum ReadState {
    /// Still collecting the token; holds what has been read so far.
    Pending(Vec<u8>),
    Ready(Cursor<Vec<u8>>),
    Invalid,
    /// The source failed; later reads report the same kind of error.
    Failed(io::ErrorKind),
}

/// Reads a whole token from the inner reader, verifies it against a key
/// set, and then yields the message.
///
/// The first error from the inner reader is returned as-is, the partial
/// token is discarded, and every later read fails with the same
/// [`io::ErrorKind`] until reset. An invalid token fails every read with
/// [`io::ErrorKind::InvalidData`] until reset.
pub struct TokenReader<R: Read> {
    source: R,
    keys: Vec<Key>,
    ttl: Duration,
    codec: Codec,
    state: ReadState,
}

impl<R: Read> TokenReader<R> {
    pub fn new(source: R, keys: Vec<Key>, ttl: Duration) -> Self {
        TokenReader::with_codec(source, keys, ttl, Codec::default())
    }

    pub fn with_codec(source: R, keys: Vec<Key>, ttl: Duration, codec: Codec) -> Self {
        TokenReader {
            source,
            keys,
            ttl,
            codec,
            state: ReadState::Pending(Vec::new()),
        }
    }

    /// Replace the source and start over with a new token.
    pub fn reset(&mut self, source: R) {
        self.source = source;
        self.clear_state();
    }

    pub fn into_inner(mut self) -> R {
        self.clear_state();
        let TokenReader { source, .. } = self;
        source
    }

    fn clear_state(&mut self) {
        if let ReadState::Ready(cursor) = &mut self.state {
            cursor.get_mut().zeroize();
        }
        self.state = ReadState::Pending(Vec::new());
    }

    #[allow(clippy::indexing_slicing)] // end <= token.len()
    fn fill(&mut self) -> io::Result<()> {
        let ReadState::Pending(token) = &mut self.state else {
            return Ok(());
        };
        if let Err(e) = self.source.read_to_end(token) {
            token.zeroize();
            debug!(kind = %e.kind(), "token source failed");
            self.state = ReadState::Failed(e.kind());
            return Err(e);
        }
        let end = token
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        let message = self
            .codec
            .verify_with_keys(&token[..end], self.ttl, unix_now(), &self.keys);
        self.state = match message {
            Some(message) => ReadState::Ready(Cursor::new(message)),
            None => ReadState::Invalid,
        };
        Ok(())
    }
}

impl<R: Read> Read for TokenReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.fill()?;
        match &mut self.state {
            ReadState::Ready(cursor) => cursor.read(out),
            ReadState::Invalid => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                FernetError::InvalidToken,
            )),
            ReadState::Failed(kind) => Err(io::Error::new(*kind, "token source failed")),
            ReadState::Pending(_) => Ok(0),
        }
    }
}
