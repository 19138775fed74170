// Growable text buffer used while scanning command lines of unbounded length.
use crate::core::error::Error;

/// Capacity increment for a fresh `LineBuffer`, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// A `String` that grows in whole chunks with fallible reservation.
///
/// The first chunk is reserved up front and does not count as growth. Before
/// any push that would exceed the current capacity, one more chunk is
/// reserved, so writes never land past the reserved region and reallocation
/// happens once per chunk instead of once per character.
#[derive(Debug)]
pub struct LineBuffer {
    text: String,
    chunk: usize,
    growths: usize,
}

impl LineBuffer {
    pub fn with_chunk(chunk: usize) -> Result<Self, Error> {
        let chunk = chunk.max(1);
        let mut text = String::new();
        text.try_reserve_exact(chunk)?;
        Ok(Self {
            text,
            chunk,
            growths: 0,
        })
    }

    pub fn push(&mut self, ch: char) -> Result<(), Error> {
        let width = ch.len_utf8();
        if self.text.len() + width > self.text.capacity() {
            self.text.try_reserve_exact(self.chunk.max(width))?;
            self.growths += 1;
            tracing::trace!(
                len = self.text.len(),
                capacity = self.text.capacity(),
                "line buffer grew"
            );
        }
        self.text.push(ch);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    /// Number of chunk reservations made after the initial one.
    pub fn growths(&self) -> usize {
        self.growths
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
