//! Field Name Heap with Backing-Buffer Support
//!
//! Append-only storage for element names, optionally deduplicated.
//!
//! Two storage modes:
//! - Backed: (buffer, offset, len) referencing a wrapped buffer (zero-copy)
//! - Copied: names supplied through the API, stored in the heap buffer
//!
//! Id 0 is reserved for the empty name carried by the root.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::index::{BufferId, Buffers, Span};

/// Index into the name heap
pub type NameId = u32;

/// Entry type for name storage
#[derive(Debug, Clone, Copy)]
pub enum NameEntry {
    /// References a backing buffer
    Backed(Span),
    /// Copied name: (offset_in_heap_data, length)
    Copied(u32, u32),
}

#[derive(Debug)]
pub struct NameHeap {
    /// Entries indexed by name ID
    entries: Vec<NameEntry>,
    /// Buffer for copied names only
    data: Vec<u8>,
    /// Hash of name bytes -> IDs with that hash (empty when not deduplicating)
    hash_index: HashMap<u64, Vec<NameId>>,
    dedup: bool,
}

impl NameHeap {
    pub fn new(dedup: bool) -> Self {
        NameHeap {
            entries: vec![NameEntry::Copied(0, 0)],
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

    fn resolve<'a>(&'a self, entry: NameEntry, buffers: &'a Buffers) -> &'a [u8] {
        match entry {
            NameEntry::Backed(span) => buffers.slice(span),
            NameEntry::Copied(offset, len) => {
                let start = offset as usize;
                &self.data[start..start + len as usize]
            }
        }
    }

    fn find(&self, hash: u64, s: &[u8], buffers: &Buffers) -> Option<NameId> {
        self.hash_index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| self.resolve(self.entries[id as usize], buffers) == s)
    }

    fn push(&mut self, hash: u64, entry: NameEntry) -> Result<NameId> {
        let id = NameId::try_from(self.entries.len())
            .map_err(|_| Error::Allocation { what: "name heap" })?;
        self.entries
            .try_reserve(1)
            .map_err(Error::alloc("name heap"))?;
        self.entries.push(entry);
        if self.dedup {
            self.hash_index.entry(hash).or_default().push(id);
        }
        Ok(id)
    }

    /// Intern a name by copying it into the heap
    pub fn intern(&mut self, name: &str, buffers: &Buffers) -> Result<NameId> {
        let s = name.as_bytes();
        if s.is_empty() {
            return Ok(0);
        }
        let hash = Self::compute_hash(s);
        if self.dedup {
            if let Some(id) = self.find(hash, s, buffers) {
                return Ok(id);
            }
        }

        let offset = u32::try_from(self.data.len())
            .map_err(|_| Error::Allocation { what: "name heap" })?;
        self.data
            .try_reserve(s.len())
            .map_err(Error::alloc("name heap"))?;
        self.data.extend_from_slice(s);
        self.push(hash, NameEntry::Copied(offset, s.len() as u32))
    }

    /// Intern a name that already lives in a backing buffer (zero-copy path)
    ///
    /// The caller guarantees the span holds valid UTF-8.
    pub fn intern_backed(&mut self, buffers: &Buffers, buffer: BufferId, offset: u32, len: u32) -> Result<NameId> {
        if len == 0 {
            return Ok(0);
        }
        let span = Span::new(buffer, offset, len);
        let s = buffers.slice(span);
        let hash = Self::compute_hash(s);
        if self.dedup {
            if let Some(id) = self.find(hash, s, buffers) {
                return Ok(id);
            }
        }
        self.push(hash, NameEntry::Backed(span))
    }

    /// Get a name by ID
    pub fn get<'a>(&'a self, id: NameId, buffers: &'a Buffers) -> &'a str {
        let bytes = self.resolve(self.entries[id as usize], buffers);
        std::str::from_utf8(bytes).unwrap_or_default()
    }

    /// Get entry info for a name ID
    #[inline]
    pub fn get_entry(&self, id: NameId) -> Option<NameEntry> {
        self.entries.get(id as usize).copied()
    }

    /// Get the number of stored names (including the reserved empty name)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if only the reserved entry exists
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Get total bytes used for copied names
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_intern_copied() {
        let buffers = Buffers::new();
        let mut heap = NameHeap::new(true);
        let id = heap.intern("hello", &buffers).unwrap();
        assert!(id > 0);
        assert_eq!(heap.get(id, &buffers), "hello");
    }

    #[test]
    fn test_intern_duplicate() {
        let buffers = Buffers::new();
        let mut heap = NameHeap::new(true);
        let id1 = heap.intern("hello", &buffers).unwrap();
        let id2 = heap.intern("hello", &buffers).unwrap();
        assert_eq!(id1, id2);
        assert_ne!(id1, heap.intern("world", &buffers).unwrap());
    }

    #[test]
    fn test_no_dedup() {
        let buffers = Buffers::new();
        let mut heap = NameHeap::new(false);
        let id1 = heap.intern("a", &buffers).unwrap();
        let id2 = heap.intern("a", &buffers).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(heap.get(id2, &buffers), "a");
    }

    #[test]
    fn test_backed_dedups_against_copied() {
        let mut buffers = Buffers::new();
        let buf = buffers.add(Bytes::from_static(b"xxnamexx")).unwrap();
        let mut heap = NameHeap::new(true);
        let copied = heap.intern("name", &buffers).unwrap();
        let backed = heap.intern_backed(&buffers, buf, 2, 4).unwrap();
        assert_eq!(copied, backed);

        let other = heap.intern_backed(&buffers, buf, 0, 2).unwrap();
        assert!(matches!(heap.get_entry(other), Some(NameEntry::Backed(_))));
        assert_eq!(heap.get(other, &buffers), "xx");
    }

    #[test]
    fn test_empty_name() {
        let buffers = Buffers::new();
        let mut heap = NameHeap::new(true);
        assert_eq!(heap.intern("", &buffers).unwrap(), 0);
        assert_eq!(heap.get(0, &buffers), "");
        assert!(heap.is_empty());
    }
}
