//! Growable, terminated byte buffer.
//!
//! A [`ByteBuffer`] owns a heap block whose size is always a whole number of
//! [`ByteBuffer::CHUNK_SIZE`] chunks. The logical content is followed by a
//! single terminator byte, so `len() + 1 <= capacity()` holds at all times.
//!
//! Every append reduces to one growth routine: when the new content plus its
//! terminator no longer fits, a fresh block rounded up to the next chunk
//! multiple is allocated, the old content is moved across and the old block is
//! freed. Capacity never shrinks except through [`ByteBuffer::reset`].
//!
//! Allocation is fallible. Nothing here aborts on out-of-memory; callers get a
//! [`BufferError::Alloc`] instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Terminator byte stored directly after the logical content.
pub const TERMINATOR: u8 = 0;

/// Errors raised by buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("failed to allocate {requested} bytes for buffer")]
    Alloc { requested: usize },

    #[error("buffer capacity overflow (requested length {requested})")]
    CapacityOverflow { requested: usize },

    #[error("span taken at generation {span} used after buffer mutated (now generation {current})")]
    StaleSpan { span: u64, current: u64 },

    #[error("span taken from buffer #{span} resolved against buffer #{buffer}")]
    ForeignSpan { span: u64, buffer: u64 },

    #[error("span {offset}..{end} is out of bounds for buffer of length {len}")]
    SpanOutOfBounds { offset: usize, end: usize, len: usize },
}

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

fn next_buffer_id() -> u64 {
    NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Owned, growable, terminated byte sequence.
pub struct ByteBuffer {
    block: Box<[u8]>,
    len: usize,
    /// Process-unique, fixed for the buffer's lifetime
    id: u64,
    generation: u64,
}

impl ByteBuffer {
    /// Allocation granularity shared by every buffer.
    pub const CHUNK_SIZE: usize = 256;

    /// Create a buffer holding a copy of `source`.
    pub fn new(source: impl AsRef<[u8]>) -> Result<Self, BufferError> {
        let source = source.as_ref();
        let mut block = alloc_block(capacity_for(source.len())?)?;
        block[..source.len()].copy_from_slice(source);
        block[source.len()] = TERMINATOR;

        Ok(ByteBuffer {
            block,
            len: source.len(),
            id: next_buffer_id(),
            generation: 0,
        })
    }

    /// Create an empty buffer (one chunk, length 0).
    pub fn empty() -> Result<Self, BufferError> {
        Self::new(b"")
    }

    /// Create a buffer whose logical length is exactly `len`.
    ///
    /// At most `len` bytes of `source` are copied. If `source` is shorter,
    /// the remaining bytes up to `len` are zero. The terminator always sits
    /// at offset `len`.
    pub fn with_len(source: impl AsRef<[u8]>, len: usize) -> Result<Self, BufferError> {
        let source = source.as_ref();
        let mut block = alloc_block(capacity_for(len)?)?;
        let copied = source.len().min(len);
        block[..copied].copy_from_slice(&source[..copied]);
        block[len] = TERMINATOR;

        Ok(ByteBuffer {
            block,
            len,
            id: next_buffer_id(),
            generation: 0,
        })
    }

    /// Deep copy preserving both length and capacity.
    pub fn try_clone(&self) -> Result<Self, BufferError> {
        let mut block = alloc_block(self.capacity())?;
        block.copy_from_slice(&self.block);

        Ok(ByteBuffer {
            block,
            len: self.len,
            id: next_buffer_id(),
            generation: 0,
        })
    }

    /// Logical length in bytes, excluding the terminator.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the logical content is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size of the block in bytes.
    pub fn capacity(&self) -> usize {
        self.block.len()
    }

    /// Identity of this buffer. Copies made with [`try_clone`](Self::try_clone)
    /// get their own.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Mutation counter. Bumped by every append and by reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Logical content without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.block[..self.len]
    }

    /// Logical content including the trailing terminator.
    pub fn as_bytes_with_terminator(&self) -> &[u8] {
        &self.block[..=self.len]
    }

    /// Content as UTF-8, if valid.
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Content as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// Append the content of another buffer.
    pub fn append(&mut self, other: &ByteBuffer) -> Result<&mut Self, BufferError> {
        self.append_bytes(other.as_bytes())
    }

    /// Append a string slice.
    pub fn append_str(&mut self, s: &str) -> Result<&mut Self, BufferError> {
        self.append_bytes(s.as_bytes())
    }

    /// Append raw bytes, growing the block if needed.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, BufferError> {
        let new_len = self
            .len
            .checked_add(bytes.len())
            .ok_or(BufferError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        self.grow_for(new_len)?;

        self.block[self.len..new_len].copy_from_slice(bytes);
        self.block[new_len] = TERMINATOR;
        self.len = new_len;
        self.generation += 1;

        Ok(self)
    }

    /// Append at most `count` bytes of another buffer.
    pub fn append_bounded(
        &mut self,
        other: &ByteBuffer,
        count: usize,
    ) -> Result<&mut Self, BufferError> {
        self.append_bytes_bounded(other.as_bytes(), count)
    }

    /// Append at most `count` bytes of `bytes`, terminating right after them.
    pub fn append_bytes_bounded(
        &mut self,
        bytes: &[u8],
        count: usize,
    ) -> Result<&mut Self, BufferError> {
        self.append_bytes(&bytes[..count.min(bytes.len())])
    }

    /// Free the block. The buffer cannot be used afterwards.
    pub fn release(self) {
        drop(self);
    }

    /// Drop the current block and reinitialize to an empty one-chunk buffer.
    pub fn reset(&mut self) -> Result<(), BufferError> {
        self.block = alloc_block(Self::CHUNK_SIZE)?;
        self.len = 0;
        self.generation += 1;
        Ok(())
    }

    fn grow_for(&mut self, new_len: usize) -> Result<(), BufferError> {
        // room for new_len bytes plus the terminator
        if new_len < self.capacity() {
            return Ok(());
        }

        let mut block = alloc_block(capacity_for(new_len)?)?;
        block[..=self.len].copy_from_slice(&self.block[..=self.len]);
        tracing::trace!(
            from = self.capacity(),
            to = block.len(),
            "growing byte buffer"
        );
        self.block = block;
        Ok(())
    }
}

/// Smallest chunk multiple holding `len` bytes plus the terminator.
pub fn capacity_for(len: usize) -> Result<usize, BufferError> {
    let overflow = || BufferError::CapacityOverflow { requested: len };
    let needed = len.checked_add(1).ok_or_else(overflow)?;
    let chunks = needed.div_ceil(ByteBuffer::CHUNK_SIZE);
    chunks
        .checked_mul(ByteBuffer::CHUNK_SIZE)
        .ok_or_else(overflow)
}

fn alloc_block(size: usize) -> Result<Box<[u8]>, BufferError> {
    let mut block = Vec::new();
    block
        .try_reserve_exact(size)
        .map_err(|_| BufferError::Alloc { requested: size })?;
    block.resize(size, TERMINATOR);
    Ok(block.into_boxed_slice())
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("content", &String::from_utf8_lossy(self.as_bytes()))
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish()
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl PartialEq for ByteBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteBuffer {}

impl PartialEq<str> for ByteBuffer {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
