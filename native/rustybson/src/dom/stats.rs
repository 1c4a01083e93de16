//! Arena statistics
//!
//! The arena never shrinks: removed elements and replaced values stay
//! allocated until the document is dropped. These counters make that
//! growth observable.

use super::document::Document;
use super::node::EMPTY_REP;

/// Memory and record counts for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    /// Element records in the arena, reachable or not
    pub reps: usize,
    /// Records reachable from the root (materialized ones only)
    pub reachable_reps: usize,
    /// Interned names
    pub names: usize,
    /// Bytes copied into the name heap
    pub name_bytes: usize,
    /// Bytes held by the value heap
    pub value_bytes: usize,
    /// Backing buffers kept alive
    pub buffers: usize,
    /// Total bytes across backing buffers
    pub buffer_bytes: usize,
}

impl DocumentStats {
    /// Records allocated but no longer part of the tree
    pub fn unreachable_reps(&self) -> usize {
        self.reps - self.reachable_reps
    }
}

impl Document {
    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            reps: self.reps.len(),
            reachable_reps: self.count_reachable(),
            names: self.names.len(),
            name_bytes: self.names.bytes_used(),
            value_bytes: self.values.bytes_used(),
            buffers: self.buffers.len(),
            buffer_bytes: self.buffers.bytes_held(),
        }
    }

    fn count_reachable(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root().rep()];
        while let Some(id) = stack.pop() {
            count += 1;
            let mut child = self.rep(id).first_child;
            while child != EMPTY_REP {
                stack.push(child);
                child = self.rep(child).next_sibling;
            }
        }
        count
    }
}
