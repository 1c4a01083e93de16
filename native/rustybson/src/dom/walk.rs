//! Read-only traversal that sees through opaque spans
//!
//! A `Node` is either a live record or a field still sitting inside an
//! undecoded span. Cursors step through a container's children in either
//! form, so serialization, rendering and comparison can walk the whole tree
//! through `&Document` with an explicit stack instead of recursion.

use super::document::Document;
use super::node::{link, Payload, RepId, EMPTY_REP};
use crate::core::{codec, ElementType, RawField};
use crate::error::Result;
use crate::index::Span;

/// One element as seen by a traversal
#[derive(Debug, Clone, Copy)]
pub(crate) enum Node {
    Rep(RepId),
    Raw {
        kind: ElementType,
        name: Span,
        value: Span,
    },
}

/// Position within one container's children
pub(crate) enum Cursor {
    Live(RepId),
    Raw {
        span: Span,
        fields: Vec<RawField>,
        next: usize,
    },
}

impl Document {
    pub(crate) fn node_kind(&self, node: Node) -> ElementType {
        match node {
            Node::Rep(id) => self.rep(id).kind,
            Node::Raw { kind, .. } => kind,
        }
    }

    pub(crate) fn node_name(&self, node: Node) -> &str {
        match node {
            Node::Rep(id) => self.names.get(self.rep(id).name_id, &self.buffers),
            // Raw names were validated as UTF-8 by decode_fields
            Node::Raw { name, .. } => std::str::from_utf8(self.buffers.slice(name)).unwrap_or_default(),
        }
    }

    /// Value span of a leaf node
    pub(crate) fn node_value(&self, node: Node) -> Option<Span> {
        match node {
            Node::Rep(id) => match self.rep(id).payload {
                Payload::Leaf(span) => Some(span),
                Payload::Children | Payload::Opaque(_) => None,
            },
            Node::Raw { kind, value, .. } => (!kind.is_container()).then_some(value),
        }
    }

    /// Encoded document span of a container that has not been expanded
    pub(crate) fn node_span(&self, node: Node) -> Option<Span> {
        match node {
            Node::Rep(id) => match self.rep(id).payload {
                Payload::Opaque(span) => Some(span),
                Payload::Children | Payload::Leaf(_) => None,
            },
            Node::Raw { kind, value, .. } => kind.is_container().then_some(value),
        }
    }

    /// Open a cursor over a container's children, decoding one level of an
    /// opaque span if needed
    pub(crate) fn open(&self, node: Node) -> Result<Cursor> {
        if let Some(span) = self.node_span(node) {
            let fields = codec::decode_fields(self.buffers.slice(span), span.offset as usize)?;
            return Ok(Cursor::Raw {
                span,
                fields,
                next: 0,
            });
        }
        Ok(match node {
            Node::Rep(id) => Cursor::Live(self.rep(id).first_child),
            Node::Raw { .. } => Cursor::Live(EMPTY_REP),
        })
    }

    pub(crate) fn advance(&self, cursor: &mut Cursor) -> Option<Node> {
        match cursor {
            Cursor::Live(next) => {
                let id = link(*next)?;
                *next = self.rep(id).next_sibling;
                Some(Node::Rep(id))
            }
            Cursor::Raw { span, fields, next } => {
                let field = fields.get(*next)?;
                *next += 1;
                Some(Node::Raw {
                    kind: field.kind,
                    name: span.sub(field.name.clone()),
                    value: span.sub(field.value.clone()),
                })
            }
        }
    }
}
