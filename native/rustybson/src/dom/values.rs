//! Leaf value heap
//!
//! Values set through the API are encoded once and appended here; Reps hold
//! a heap `Span`. Reading and serializing a heap value therefore goes
//! through the same path as a value still sitting in a backing buffer.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::index::{Span, HEAP_SOURCE};

#[derive(Debug)]
pub struct ValueHeap {
    data: Vec<u8>,
    /// Hash of encoded value -> spans with that hash (only when deduplicating)
    hash_index: HashMap<u64, Vec<Span>>,
    dedup: bool,
}

impl ValueHeap {
    pub fn new(dedup: bool) -> Self {
        ValueHeap {
            data: Vec::new(),
            hash_index: HashMap::new(),
            dedup,
        }
    }

    #[inline]
    fn compute_hash(s: &[u8]) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Store encoded value bytes
    pub fn insert(&mut self, encoded: &[u8]) -> Result<Span> {
        let hash = self.dedup.then(|| Self::compute_hash(encoded));
        if let Some(hash) = hash {
            if let Some(spans) = self.hash_index.get(&hash) {
                if let Some(span) = spans.iter().find(|s| self.get(**s) == encoded) {
                    return Ok(*span);
                }
            }
        }

        let offset = u32::try_from(self.data.len())
            .ok()
            .filter(|o| o.checked_add(encoded.len() as u32).is_some())
            .ok_or(Error::Allocation { what: "value heap" })?;
        self.data
            .try_reserve(encoded.len())
            .map_err(Error::alloc("value heap"))?;
        self.data.extend_from_slice(encoded);

        let span = Span::new(HEAP_SOURCE, offset, encoded.len() as u32);
        if let Some(hash) = hash {
            self.hash_index.entry(hash).or_default().push(span);
        }
        Ok(span)
    }

    /// Get the bytes of a heap span
    #[inline]
    pub fn get(&self, span: Span) -> &[u8] {
        debug_assert!(span.is_heap());
        &self.data[span.range()]
    }

    /// Get total bytes stored
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut heap = ValueHeap::new(false);
        let a = heap.insert(&[1, 0, 0, 0]).unwrap();
        let b = heap.insert(&[2, 0, 0, 0]).unwrap();
        assert!(a.is_heap());
        assert_eq!(heap.get(b), &[2, 0, 0, 0]);
        assert_eq!(heap.bytes_used(), 8);
    }

    #[test]
    fn test_dedup() {
        let mut heap = ValueHeap::new(true);
        let a = heap.insert(b"same").unwrap();
        let b = heap.insert(b"same").unwrap();
        assert_eq!(a, b);
        assert_eq!(heap.bytes_used(), 4);
    }

    #[test]
    fn test_empty_value() {
        let mut heap = ValueHeap::new(true);
        let span = heap.insert(&[]).unwrap();
        assert_eq!(heap.get(span), &[] as &[u8]);
    }
}
