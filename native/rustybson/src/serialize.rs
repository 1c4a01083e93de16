//! Serializer - flattens a document back to canonical bytes
//!
//! Live containers are written child by child in current sibling order.
//! Untouched opaque spans are copied verbatim, or decoded and re-encoded
//! when `verbatim_opaque` is off. Serialization never materializes, so it
//! only needs `&Document`.

use crate::core::{codec, ElementType};
use crate::dom::walk::{Cursor, Node};
use crate::dom::{Document, Element};
use crate::error::Result;
use crate::index::Span;

/// One open container: its children cursor and its length prefix position
struct Frame {
    cursor: Cursor,
    at: usize,
    is_array: bool,
    index: usize,
}

struct Serializer<'d> {
    doc: &'d Document,
    verbatim: bool,
    out: Vec<u8>,
}

impl<'d> Serializer<'d> {
    fn new(doc: &'d Document) -> Self {
        Serializer {
            doc,
            verbatim: doc.options().verbatim_opaque,
            out: Vec::new(),
        }
    }

    /// Copy an untouched container span as is, when allowed
    fn copy_verbatim(&mut self, node: Node) -> bool {
        let doc = self.doc;
        match doc.node_span(node) {
            Some(span) if self.verbatim => {
                tracing::trace!(len = span.len, "copying opaque span verbatim");
                self.out.extend_from_slice(doc.span_bytes(span));
                true
            }
            _ => false,
        }
    }

    fn open(&mut self, node: Node) -> Result<Frame> {
        let cursor = self.doc.open(node)?;
        Ok(Frame {
            cursor,
            at: codec::begin_document(&mut self.out),
            is_array: self.doc.node_kind(node) == ElementType::Array,
            index: 0,
        })
    }

    /// Write a container as a document (length prefix, children, terminator)
    fn write_container(&mut self, node: Node) -> Result<()> {
        if self.copy_verbatim(node) {
            return Ok(());
        }
        let doc = self.doc;
        let mut stack = vec![self.open(node)?];
        while let Some(frame) = stack.last_mut() {
            let Some(child) = doc.advance(&mut frame.cursor) else {
                let at = frame.at;
                stack.pop();
                codec::end_document(&mut self.out, at)?;
                continue;
            };
            let index = frame.is_array.then_some(frame.index);
            frame.index += 1;

            let kind = doc.node_kind(child);
            match index {
                Some(i) => codec::write_element_header(&mut self.out, kind, &i.to_string())?,
                None => codec::write_element_header(&mut self.out, kind, doc.node_name(child))?,
            }
            if let Some(span) = doc.node_value(child) {
                self.write_leaf(kind, span)?;
            } else if !self.copy_verbatim(child) {
                let frame = self.open(child)?;
                stack.push(frame);
            }
        }
        Ok(())
    }

    fn write_leaf(&mut self, kind: ElementType, span: Span) -> Result<()> {
        let doc = self.doc;
        let bytes = doc.span_bytes(span);
        if self.verbatim || span.is_heap() {
            self.out.extend_from_slice(bytes);
            return Ok(());
        }
        let value = codec::decode_value(kind, bytes, span.offset as usize)?;
        codec::encode_value(&value, &mut self.out)
    }
}

impl Document {
    /// Serialize the whole document
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.serialize_element(self.root())
    }

    /// Serialize one element. A container yields a document holding its
    /// children (its own name is not part of the output); a leaf yields a
    /// single encoded element with its name.
    pub fn serialize_element(&self, el: Element) -> Result<Vec<u8>> {
        let id = self.own(el)?;
        let mut serializer = Serializer::new(self);
        let node = Node::Rep(id);
        match self.node_value(node) {
            Some(span) => {
                let kind = self.node_kind(node);
                codec::write_element_header(&mut serializer.out, kind, self.node_name(node))?;
                serializer.write_leaf(kind, span)?;
            }
            None => serializer.write_container(node)?,
        }
        Ok(serializer.out)
    }
}
