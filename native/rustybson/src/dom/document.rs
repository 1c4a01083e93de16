//! Mutable Document - Arena-based overlay over encoded documents
//!
//! Efficient mutable storage with:
//! - Arena allocation for element records
//! - RepId indices for links (no pointers, stable across growth)
//! - Interned field names and heap-encoded leaf values
//! - Opaque spans that are only decoded when first touched
//!
//! Every mutation validates before it relinks anything, so a rejected
//! operation leaves the tree exactly as it was.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use memchr::memchr;

use super::element::{Children, DocumentId, Element};
use super::node::{link, Payload, Rep, RepId, EMPTY_REP};
use super::repository::ElementRepository;
use super::strings::NameHeap;
use super::values::ValueHeap;
use crate::core::{codec, ElementType, Value};
use crate::error::{Error, InvalidOp, Result};
use crate::index::{Buffers, Span};
use crate::options::DocumentOptions;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A mutable document.
///
/// Single writer: mutation needs `&mut self`, and nothing is locked
/// internally. Read-only operations (including serialization) take `&self`
/// and may run concurrently.
pub struct Document {
    id: DocumentId,
    pub(crate) reps: ElementRepository,
    pub(crate) names: NameHeap,
    pub(crate) values: ValueHeap,
    pub(crate) buffers: Buffers,
    root: RepId,
    options: DocumentOptions,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with default options
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// Create an empty document
    pub fn with_options(options: DocumentOptions) -> Self {
        Self::bare(options, Rep::container(ElementType::Object, 0))
    }

    /// Wrap an encoded document as an opaque root (default options).
    ///
    /// Only the outer length prefix and terminator are checked here;
    /// anything malformed deeper is reported on first access.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        Self::from_bytes_with_options(bytes, DocumentOptions::default())
    }

    /// Wrap an encoded document as an opaque root
    pub fn from_bytes_with_options(bytes: impl Into<Bytes>, options: DocumentOptions) -> Result<Self> {
        let bytes = bytes.into();
        codec::document_len(&bytes, 0)?;
        let mut buffers = Buffers::new();
        let buffer = buffers.add(bytes)?;
        let span = buffers.whole(buffer);
        let mut doc = Self::bare(options, Rep::opaque(ElementType::Object, 0, span));
        doc.buffers = buffers;
        tracing::debug!(doc = doc.id, len = span.len, "wrapped encoded document");
        Ok(doc)
    }

    fn bare(options: DocumentOptions, root: Rep) -> Self {
        Document {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            reps: ElementRepository::with_root(root, options.arena_capacity),
            names: NameHeap::new(options.dedup_names),
            values: ValueHeap::new(options.dedup_values),
            buffers: Buffers::new(),
            root: 0,
            options,
        }
    }

    #[inline]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    #[inline]
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    #[inline]
    pub(crate) fn rep(&self, id: RepId) -> &Rep {
        self.reps.get(id)
    }

    #[inline]
    pub(crate) fn element(&self, id: RepId) -> Element {
        Element::new(self.id, id)
    }

    /// Check that `el` was issued by this document
    #[inline]
    pub(crate) fn own(&self, el: Element) -> Result<RepId> {
        if el.doc != self.id {
            return Err(InvalidOp::ForeignElement.into());
        }
        Ok(el.rep)
    }

    /// # Panics
    ///
    /// If `el` was issued by another document.
    #[inline]
    fn get(&self, el: Element) -> &Rep {
        assert_eq!(el.doc, self.id, "element from another document");
        self.reps.get(el.rep)
    }

    /// Record behind `el`, or None if it belongs to another document
    #[inline]
    fn try_get(&self, el: Element) -> Option<&Rep> {
        (el.doc == self.id).then(|| self.reps.get(el.rep))
    }

    /// Resolve the bytes behind a span
    #[inline]
    pub(crate) fn span_bytes(&self, span: Span) -> &[u8] {
        if span.is_heap() {
            self.values.get(span)
        } else {
            self.buffers.slice(span)
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    fn check_name(name: &str) -> Result<()> {
        if memchr(0, name.as_bytes()).is_some() {
            return Err(InvalidOp::InvalidName.into());
        }
        Ok(())
    }

    fn alloc(&mut self, rep: Rep) -> Result<Element> {
        let id = self.reps.append(rep)?;
        Ok(self.element(id))
    }

    /// Create a parentless leaf
    pub fn make_leaf(&mut self, name: &str, value: impl Into<Value>) -> Result<Element> {
        Self::check_name(name)?;
        let value = value.into();
        let span = self.store_value(&value)?;
        let name_id = self.names.intern(name, &self.buffers)?;
        self.alloc(Rep::leaf(value.element_type(), name_id, span))
    }

    /// Create a parentless, empty object
    pub fn make_object(&mut self, name: &str) -> Result<Element> {
        self.make_container(ElementType::Object, name)
    }

    /// Create a parentless, empty array
    pub fn make_array(&mut self, name: &str) -> Result<Element> {
        self.make_container(ElementType::Array, name)
    }

    /// Create a parentless, empty container of the given type
    pub fn make_container(&mut self, kind: ElementType, name: &str) -> Result<Element> {
        if !kind.is_container() {
            return Err(InvalidOp::NotAContainer.into());
        }
        Self::check_name(name)?;
        let name_id = self.names.intern(name, &self.buffers)?;
        self.alloc(Rep::container(kind, name_id))
    }

    /// Wrap an externally encoded sub-document as a parentless opaque
    /// container. The document keeps `bytes` alive.
    pub fn make_opaque(&mut self, kind: ElementType, name: &str, bytes: impl Into<Bytes>) -> Result<Element> {
        if !kind.is_container() {
            return Err(InvalidOp::NotAContainer.into());
        }
        Self::check_name(name)?;
        let bytes = bytes.into();
        codec::document_len(&bytes, 0)?;
        let name_id = self.names.intern(name, &self.buffers)?;
        self.reps.reserve(1)?;
        let buffer = self.buffers.add(bytes)?;
        let span = self.buffers.whole(buffer);
        self.alloc(Rep::opaque(kind, name_id, span))
    }

    fn store_value(&mut self, value: &Value) -> Result<Span> {
        let mut encoded = Vec::new();
        codec::encode_value(value, &mut encoded)?;
        self.values.insert(&encoded)
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Get the root element
    #[inline]
    pub fn root(&self) -> Element {
        self.element(self.root)
    }

    #[inline]
    pub fn is_root(&self, el: Element) -> bool {
        el.doc == self.id && el.rep == self.root
    }

    /// # Panics
    ///
    /// If `el` was issued by another document. The same holds for `name`,
    /// `is_expanded` and `is_opaque`.
    pub fn element_type(&self, el: Element) -> ElementType {
        self.get(el).kind
    }

    /// Get the field name (empty for the root)
    pub fn name(&self, el: Element) -> &str {
        self.names.get(self.get(el).name_id, &self.buffers)
    }

    /// Decode a leaf's value. Containers have none.
    pub fn value(&self, el: Element) -> Result<Option<Value>> {
        let rep = self.reps.get(self.own(el)?);
        match rep.payload {
            Payload::Leaf(span) => {
                let base = if span.is_heap() { 0 } else { span.offset as usize };
                codec::decode_value(rep.kind, self.span_bytes(span), base).map(Some)
            }
            Payload::Children | Payload::Opaque(_) => Ok(None),
        }
    }

    /// Encoded value bytes of a leaf, without decoding
    pub fn value_bytes(&self, el: Element) -> Option<&[u8]> {
        match self.try_get(el)?.payload {
            Payload::Leaf(span) => Some(self.span_bytes(span)),
            _ => None,
        }
    }

    pub fn parent(&self, el: Element) -> Option<Element> {
        link(self.try_get(el)?.parent).map(|id| self.element(id))
    }

    pub fn next_sibling(&self, el: Element) -> Option<Element> {
        link(self.try_get(el)?.next_sibling).map(|id| self.element(id))
    }

    pub fn prev_sibling(&self, el: Element) -> Option<Element> {
        link(self.try_get(el)?.prev_sibling).map(|id| self.element(id))
    }

    /// Number of ancestors between `el` and the root, or None if `el` is
    /// not reachable from the root
    pub fn depth(&self, el: Element) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.own(el).ok()?;
        while current != self.root {
            current = self.reps.get(current).parent;
            if current == EMPTY_REP {
                return None;
            }
            depth += 1;
        }
        Some(depth)
    }

    /// Check whether `el` is reachable from the root
    pub fn is_attached(&self, el: Element) -> bool {
        self.depth(el).is_some()
    }

    /// Check whether `el`'s children have been decoded (leaves and built
    /// containers always report true)
    pub fn is_expanded(&self, el: Element) -> bool {
        self.get(el).expanded
    }

    /// Check whether `el` is a container still backed by undecoded bytes
    pub fn is_opaque(&self, el: Element) -> bool {
        self.get(el).is_opaque()
    }

    // =========================================================================
    // Structural accessors (may materialize)
    // =========================================================================

    /// Decode an opaque container's children now. No-op if already done.
    pub fn materialize(&mut self, el: Element) -> Result<()> {
        let id = self.own(el)?;
        self.materialize_rep(id)
    }

    /// Materialize `el` and every container beneath it
    pub fn materialize_all(&mut self, el: Element) -> Result<()> {
        let mut stack = vec![self.own(el)?];
        while let Some(id) = stack.pop() {
            if !self.rep(id).is_container() {
                continue;
            }
            self.materialize_rep(id)?;
            let mut child = self.rep(id).first_child;
            while child != EMPTY_REP {
                stack.push(child);
                child = self.rep(child).next_sibling;
            }
        }
        Ok(())
    }

    fn expanded_container(&mut self, el: Element) -> Result<Option<RepId>> {
        let id = self.own(el)?;
        if !self.rep(id).is_container() {
            return Ok(None);
        }
        self.materialize_rep(id)?;
        Ok(Some(id))
    }

    pub fn first_child(&mut self, el: Element) -> Result<Option<Element>> {
        let first = self.expanded_container(el)?.and_then(|id| link(self.rep(id).first_child));
        Ok(first.map(|id| self.element(id)))
    }

    pub fn last_child(&mut self, el: Element) -> Result<Option<Element>> {
        let last = self.expanded_container(el)?.and_then(|id| link(self.rep(id).last_child));
        Ok(last.map(|id| self.element(id)))
    }

    /// Iterate over children (empty for leaves)
    pub fn children(&mut self, el: Element) -> Result<Children<'_>> {
        Ok(match self.expanded_container(el)? {
            Some(id) => {
                let (first, last) = (self.rep(id).first_child, self.rep(id).last_child);
                Children::new(self, first, last)
            }
            None => Children::empty(self),
        })
    }

    /// Iterate over children with the given name
    pub fn children_named<'a>(
        &'a mut self,
        el: Element,
        name: &'a str,
    ) -> Result<impl DoubleEndedIterator<Item = Element> + 'a> {
        let children = self.children(el)?;
        let doc = children.document();
        Ok(children.filter(move |child| doc.name(*child) == name))
    }

    /// Find the first child with the given name
    pub fn find_child(&mut self, el: Element, name: &str) -> Result<Option<Element>> {
        Ok(self.children_named(el, name)?.next())
    }

    /// Find the child at position `n` (0-based)
    pub fn find_nth_child(&mut self, el: Element, n: usize) -> Result<Option<Element>> {
        Ok(self.children(el)?.nth(n))
    }

    pub fn count_children(&mut self, el: Element) -> Result<usize> {
        Ok(self.children(el)?.count())
    }

    pub fn has_children(&mut self, el: Element) -> Result<bool> {
        Ok(self.first_child(el)?.is_some())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Validate attaching `child` under `parent` without changing anything
    fn check_attach(&self, parent: RepId, child: RepId) -> Result<()> {
        if !self.rep(parent).is_container() {
            return Err(InvalidOp::NotAContainer.into());
        }
        if child == self.root {
            return Err(InvalidOp::RootElement.into());
        }
        if self.rep(child).has_parent() {
            return Err(InvalidOp::AlreadyAttached.into());
        }
        let mut ancestor = parent;
        while ancestor != EMPTY_REP {
            if ancestor == child {
                return Err(InvalidOp::WouldCycle.into());
            }
            ancestor = self.rep(ancestor).parent;
        }
        Ok(())
    }

    /// Parent of a positional anchor, which must be attached somewhere
    fn anchor_parent(&self, position: RepId) -> Result<RepId> {
        if position == self.root {
            return Err(InvalidOp::RootElement.into());
        }
        link(self.rep(position).parent).ok_or_else(|| InvalidOp::Detached.into())
    }

    /// Append `child` as the last child of `parent`
    pub fn push_back(&mut self, parent: Element, child: Element) -> Result<()> {
        let (p, c) = (self.own(parent)?, self.own(child)?);
        self.check_attach(p, c)?;
        self.materialize_rep(p)?;
        self.link_back(p, c);
        Ok(())
    }

    /// Prepend `child` as the first child of `parent`
    pub fn push_front(&mut self, parent: Element, child: Element) -> Result<()> {
        let (p, c) = (self.own(parent)?, self.own(child)?);
        self.check_attach(p, c)?;
        self.materialize_rep(p)?;
        let first = self.rep(p).first_child;
        if first == EMPTY_REP {
            self.link_back(p, c);
        } else {
            self.link_before(p, first, c);
        }
        Ok(())
    }

    /// Insert `new` as the sibling immediately before `position`
    pub fn insert_before(&mut self, position: Element, new: Element) -> Result<()> {
        let (pos, c) = (self.own(position)?, self.own(new)?);
        let p = self.anchor_parent(pos)?;
        self.check_attach(p, c)?;
        self.link_before(p, pos, c);
        Ok(())
    }

    /// Insert `new` as the sibling immediately after `position`
    pub fn insert_after(&mut self, position: Element, new: Element) -> Result<()> {
        let (pos, c) = (self.own(position)?, self.own(new)?);
        let p = self.anchor_parent(pos)?;
        self.check_attach(p, c)?;
        let next = self.rep(pos).next_sibling;
        if next == EMPTY_REP {
            self.link_back(p, c);
        } else {
            self.link_before(p, next, c);
        }
        Ok(())
    }

    /// Detach `el` from its parent. The element stays valid and can be
    /// attached again.
    pub fn remove(&mut self, el: Element) -> Result<()> {
        let id = self.own(el)?;
        self.anchor_parent(id)?;
        self.unlink(id);
        Ok(())
    }

    /// Detach and return the first child, if any
    pub fn pop_front(&mut self, parent: Element) -> Result<Option<Element>> {
        let first = self.first_child(parent)?;
        if let Some(child) = first {
            self.unlink(child.rep);
        }
        Ok(first)
    }

    /// Detach and return the last child, if any
    pub fn pop_back(&mut self, parent: Element) -> Result<Option<Element>> {
        let last = self.last_child(parent)?;
        if let Some(child) = last {
            self.unlink(child.rep);
        }
        Ok(last)
    }

    /// Change an element's field name
    pub fn rename(&mut self, el: Element, name: &str) -> Result<()> {
        let id = self.own(el)?;
        if id == self.root {
            return Err(InvalidOp::RootElement.into());
        }
        Self::check_name(name)?;
        let name_id = self.names.intern(name, &self.buffers)?;
        self.reps.get_mut(id).name_id = name_id;
        Ok(())
    }

    /// Replace a leaf's value. The leaf takes the value's type.
    pub fn set_value(&mut self, el: Element, value: impl Into<Value>) -> Result<()> {
        let id = self.own(el)?;
        if self.rep(id).is_container() {
            return Err(InvalidOp::NotALeaf.into());
        }
        let value = value.into();
        let span = self.store_value(&value)?;
        let rep = self.reps.get_mut(id);
        rep.kind = value.element_type();
        rep.payload = Payload::Leaf(span);
        Ok(())
    }

    /// Give `target` the type and value of leaf `source`, sharing its bytes
    pub fn set_value_from(&mut self, target: Element, source: Element) -> Result<()> {
        let (t, s) = (self.own(target)?, self.own(source)?);
        if self.rep(t).is_container() || self.rep(s).is_container() {
            return Err(InvalidOp::NotALeaf.into());
        }
        let (kind, payload) = (self.rep(s).kind, self.rep(s).payload);
        let rep = self.reps.get_mut(t);
        rep.kind = kind;
        rep.payload = payload;
        Ok(())
    }

    /// Copy an element of another document into this one as a new
    /// parentless element. Containers arrive opaque.
    pub fn import(&mut self, other: &Document, el: Element) -> Result<Element> {
        let id = other.own(el)?;
        let rep = other.rep(id);
        let name = other.name(el);
        if rep.is_container() {
            let bytes = other.serialize_element(el)?;
            self.make_opaque(rep.kind, name, bytes)
        } else {
            let value = other.value(el)?.ok_or(Error::from(InvalidOp::NotALeaf))?;
            self.make_leaf(name, value)
        }
    }

    // =========================================================================
    // Link surgery (infallible; callers validate first)
    // =========================================================================

    pub(crate) fn link_back(&mut self, parent: RepId, child: RepId) {
        let last = self.reps.get(parent).last_child;
        {
            let rep = self.reps.get_mut(child);
            rep.parent = parent;
            rep.prev_sibling = last;
            rep.next_sibling = EMPTY_REP;
        }
        if last == EMPTY_REP {
            self.reps.get_mut(parent).first_child = child;
        } else {
            self.reps.get_mut(last).next_sibling = child;
        }
        self.reps.get_mut(parent).last_child = child;
    }

    fn link_before(&mut self, parent: RepId, position: RepId, child: RepId) {
        let prev = self.reps.get(position).prev_sibling;
        {
            let rep = self.reps.get_mut(child);
            rep.parent = parent;
            rep.prev_sibling = prev;
            rep.next_sibling = position;
        }
        self.reps.get_mut(position).prev_sibling = child;
        if prev == EMPTY_REP {
            self.reps.get_mut(parent).first_child = child;
        } else {
            self.reps.get_mut(prev).next_sibling = child;
        }
    }

    pub(crate) fn unlink(&mut self, id: RepId) {
        let (parent, prev, next) = {
            let rep = self.reps.get(id);
            (rep.parent, rep.prev_sibling, rep.next_sibling)
        };
        if prev == EMPTY_REP {
            self.reps.get_mut(parent).first_child = next;
        } else {
            self.reps.get_mut(prev).next_sibling = next;
        }
        if next == EMPTY_REP {
            self.reps.get_mut(parent).last_child = prev;
        } else {
            self.reps.get_mut(next).prev_sibling = prev;
        }
        self.reps.get_mut(id).clear_links();
        tracing::trace!(doc = self.id, rep = id, parent, "unlinked element");
    }
}
