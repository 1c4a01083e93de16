//! Element record (Rep) representation
//!
//! Uses RepId (u32) for compact, cache-friendly links. Links that point
//! nowhere hold `EMPTY_REP`.

use crate::core::ElementType;
use crate::index::Span;

use super::strings::NameId;

/// Compact element identifier (index into the arena)
pub type RepId = u32;

/// Sentinel for "no such relation"
pub const EMPTY_REP: RepId = u32::MAX;

/// Where an element's content lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Container whose children are live Reps
    Children,
    /// Encoded leaf value bytes (value heap or backing buffer)
    Leaf(Span),
    /// Unexpanded container: the whole encoded sub-document
    Opaque(Span),
}

/// One node record in the arena
#[derive(Debug, Clone, Copy)]
pub struct Rep {
    /// Element type
    pub kind: ElementType,
    /// Index into the name heap
    pub name_id: NameId,
    /// Value bytes, opaque span, or live children
    pub payload: Payload,
    /// Parent container (EMPTY_REP for the root and detached elements)
    pub parent: RepId,
    /// First child
    pub first_child: RepId,
    /// Last child
    pub last_child: RepId,
    /// Previous sibling
    pub prev_sibling: RepId,
    /// Next sibling
    pub next_sibling: RepId,
    /// Children have been decoded (always true unless payload is Opaque)
    pub expanded: bool,
}

impl Rep {
    fn unlinked(kind: ElementType, name_id: NameId, payload: Payload, expanded: bool) -> Self {
        Rep {
            kind,
            name_id,
            payload,
            parent: EMPTY_REP,
            first_child: EMPTY_REP,
            last_child: EMPTY_REP,
            prev_sibling: EMPTY_REP,
            next_sibling: EMPTY_REP,
            expanded,
        }
    }

    /// Create a leaf whose value bytes live at `span`
    pub fn leaf(kind: ElementType, name_id: NameId, span: Span) -> Self {
        debug_assert!(!kind.is_container());
        Self::unlinked(kind, name_id, Payload::Leaf(span), true)
    }

    /// Create an empty, live container
    pub fn container(kind: ElementType, name_id: NameId) -> Self {
        debug_assert!(kind.is_container());
        Self::unlinked(kind, name_id, Payload::Children, true)
    }

    /// Create an unexpanded container backed by encoded bytes
    pub fn opaque(kind: ElementType, name_id: NameId, span: Span) -> Self {
        debug_assert!(kind.is_container());
        Self::unlinked(kind, name_id, Payload::Opaque(span), false)
    }

    /// Check if this is an object or array
    #[inline]
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Check if this container still awaits materialization
    #[inline]
    pub fn is_opaque(&self) -> bool {
        matches!(self.payload, Payload::Opaque(_))
    }

    /// Check if this node has a parent
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent != EMPTY_REP
    }

    /// Clear parent and sibling links
    #[inline]
    pub fn clear_links(&mut self) {
        self.parent = EMPTY_REP;
        self.prev_sibling = EMPTY_REP;
        self.next_sibling = EMPTY_REP;
    }
}

/// Convert a raw link to an Option
#[inline]
pub fn link(id: RepId) -> Option<RepId> {
    (id != EMPTY_REP).then_some(id)
}
