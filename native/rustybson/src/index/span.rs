//! Span - source, offset and length of encoded bytes
//!
//! A span points either into one of the document's backing buffers or into
//! its value heap. Backing buffers are reference counted `Bytes`, so a
//! document keeps every buffer it wraps alive for as long as it lives.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Index of a backing buffer within a document
pub type BufferId = u32;

/// Source id reserved for the value heap
pub const HEAP_SOURCE: u32 = u32::MAX;

/// A span referencing encoded bytes.
///
/// Size: 12 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Buffer id, or `HEAP_SOURCE`
    pub source: u32,
    /// Byte offset into the source
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(source: u32, offset: u32, len: u32) -> Self {
        Self { source, offset, len }
    }

    /// Check whether the span lives in the value heap
    #[inline]
    pub const fn is_heap(&self) -> bool {
        self.source == HEAP_SOURCE
    }

    /// Get the byte range within the source
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }

    /// A sub-span of this span, given a range relative to its start
    #[inline]
    pub fn sub(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            source: self.source,
            offset: self.offset + range.start as u32,
            len: (range.end - range.start) as u32,
        }
    }
}

/// Backing buffers owned by a document
#[derive(Debug, Default, Clone)]
pub struct Buffers {
    buffers: Vec<Bytes>,
}

impl Buffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer; spans over it use the returned id
    pub fn add(&mut self, bytes: Bytes) -> Result<BufferId> {
        if u32::try_from(bytes.len()).is_err() {
            return Err(Error::codec(0, "buffer exceeds addressable size"));
        }
        let id = BufferId::try_from(self.buffers.len())
            .ok()
            .filter(|&id| id != HEAP_SOURCE)
            .ok_or(Error::Allocation { what: "backing buffers" })?;
        self.buffers
            .try_reserve(1)
            .map_err(Error::alloc("backing buffers"))?;
        self.buffers.push(bytes);
        Ok(id)
    }

    /// Span covering an entire buffer
    pub fn whole(&self, id: BufferId) -> Span {
        Span::new(id, 0, self.buffers[id as usize].len() as u32)
    }

    /// Extract the bytes of a buffer span
    #[inline]
    pub fn slice(&self, span: Span) -> &[u8] {
        debug_assert!(!span.is_heap());
        &self.buffers[span.source as usize][span.range()]
    }

    /// Extract the bytes of a buffer span as a shared handle
    pub fn bytes(&self, span: Span) -> Bytes {
        self.buffers[span.source as usize].slice(span.range())
    }

    /// Get the number of buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Check if no buffers were wrapped
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Total bytes held across all buffers
    pub fn bytes_held(&self) -> usize {
        self.buffers.iter().map(Bytes::len).sum()
    }
}
