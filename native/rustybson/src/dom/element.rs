//! Element handles and child iteration
//!
//! An `Element` is a (document, rep) pair. It owns nothing: every operation
//! goes through the `Document` that issued it.

use super::document::Document;
use super::node::{RepId, EMPTY_REP};

/// Process-unique document identifier
pub type DocumentId = u64;

/// Lightweight handle to one element of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    pub(crate) doc: DocumentId,
    pub(crate) rep: RepId,
}

impl Element {
    #[inline]
    pub(crate) fn new(doc: DocumentId, rep: RepId) -> Self {
        Element { doc, rep }
    }

    /// Arena index of the underlying record
    #[inline]
    pub fn rep(&self) -> RepId {
        self.rep
    }

    /// Id of the document this handle belongs to
    #[inline]
    pub fn document_id(&self) -> DocumentId {
        self.doc
    }
}

/// Iterator over the children of a container, in sibling order.
///
/// Cloning restarts from the same position. Forward and backward iteration
/// can be mixed; they stop when they meet.
#[derive(Clone)]
pub struct Children<'d> {
    doc: &'d Document,
    front: RepId,
    back: RepId,
}

impl<'d> Children<'d> {
    pub(crate) fn new(doc: &'d Document, first: RepId, last: RepId) -> Self {
        Children {
            doc,
            front: first,
            back: last,
        }
    }

    pub(crate) fn empty(doc: &'d Document) -> Self {
        Self::new(doc, EMPTY_REP, EMPTY_REP)
    }

    /// The document being iterated
    #[inline]
    pub fn document(&self) -> &'d Document {
        self.doc
    }

    fn element(&self, rep: RepId) -> Element {
        Element::new(self.doc.id(), rep)
    }
}

impl<'d> Iterator for Children<'d> {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == EMPTY_REP {
            return None;
        }
        let current = self.front;
        if current == self.back {
            self.front = EMPTY_REP;
            self.back = EMPTY_REP;
        } else {
            self.front = self.doc.rep(current).next_sibling;
        }
        Some(self.element(current))
    }
}

impl<'d> DoubleEndedIterator for Children<'d> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back == EMPTY_REP {
            return None;
        }
        let current = self.back;
        if current == self.front {
            self.front = EMPTY_REP;
            self.back = EMPTY_REP;
        } else {
            self.back = self.doc.rep(current).prev_sibling;
        }
        Some(self.element(current))
    }
}

impl<'d> std::iter::FusedIterator for Children<'d> {}
