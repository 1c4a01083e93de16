//! Arena of element records
//!
//! Append-only: RepIds are never reused, so a handle stays valid for the
//! whole life of its document even across reallocation of the backing
//! vector. Reachability from the root, not arena membership, decides
//! whether an element is part of the tree.

use crate::error::{Error, Result};

use super::node::{Rep, RepId, EMPTY_REP};

#[derive(Debug)]
pub struct ElementRepository {
    reps: Vec<Rep>,
}

impl ElementRepository {
    /// Create an arena whose record 0 is `root`
    pub fn with_root(root: Rep, capacity: usize) -> Self {
        let mut reps = Vec::with_capacity(capacity.max(1));
        reps.push(root);
        ElementRepository { reps }
    }

    /// Ensure room for `additional` appends without further allocation
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let total = self.reps.len().saturating_add(additional);
        if total > EMPTY_REP as usize {
            return Err(Error::Allocation { what: "element arena" });
        }
        self.reps
            .try_reserve(additional)
            .map_err(Error::alloc("element arena"))
    }

    /// Append a record and return its id
    pub fn append(&mut self, rep: Rep) -> Result<RepId> {
        self.reserve(1)?;
        let id = self.reps.len() as RepId;
        self.reps.push(rep);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: RepId) -> &Rep {
        debug_assert!((id as usize) < self.reps.len(), "rep {id} out of range");
        &self.reps[id as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: RepId) -> &mut Rep {
        debug_assert!((id as usize) < self.reps.len(), "rep {id} out of range");
        &mut self.reps[id as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.reps.len()
    }
}
