//! Debug rendering
//!
//! Renders an element as `{ a: 1, b: { c: "x" } }`. Opaque containers are
//! walked straight from their encoded bytes, so rendering never
//! materializes and works through `&Document`.

use std::fmt::Write;

use super::document::Document;
use super::element::Element;
use super::walk::{Cursor, Node};
use crate::core::{codec, ElementType};
use crate::error::Result;
use crate::index::Span;

struct Frame {
    cursor: Cursor,
    is_array: bool,
    empty: bool,
}

impl Document {
    /// Render `el` as JSON-like text. Leaves render as `name: value`.
    pub fn to_debug_string(&self, el: Element) -> Result<String> {
        let node = Node::Rep(self.own(el)?);
        let mut out = String::new();
        match self.node_value(node) {
            Some(span) => {
                let _ = write!(out, "{}: ", self.name(el));
                self.render_leaf(self.node_kind(node), span, &mut out)?;
            }
            None => self.render_container(node, &mut out)?,
        }
        Ok(out)
    }

    fn open_frame(&self, node: Node, out: &mut String) -> Result<Frame> {
        let is_array = self.node_kind(node) == ElementType::Array;
        let cursor = self.open(node)?;
        out.push(if is_array { '[' } else { '{' });
        Ok(Frame {
            cursor,
            is_array,
            empty: true,
        })
    }

    fn render_container(&self, node: Node, out: &mut String) -> Result<()> {
        let mut stack = vec![self.open_frame(node, out)?];
        while let Some(frame) = stack.last_mut() {
            let Some(child) = self.advance(&mut frame.cursor) else {
                if !frame.empty {
                    out.push(' ');
                }
                out.push(if frame.is_array { ']' } else { '}' });
                stack.pop();
                continue;
            };
            out.push_str(if frame.empty { " " } else { ", " });
            frame.empty = false;
            if !frame.is_array {
                out.push_str(self.node_name(child));
                out.push_str(": ");
            }
            match self.node_value(child) {
                Some(span) => self.render_leaf(self.node_kind(child), span, out)?,
                None => {
                    let frame = self.open_frame(child, out)?;
                    stack.push(frame);
                }
            }
        }
        Ok(())
    }

    fn render_leaf(&self, kind: ElementType, span: Span, out: &mut String) -> Result<()> {
        let base = if span.is_heap() { 0 } else { span.offset as usize };
        let value = codec::decode_value(kind, self.span_bytes(span), base)?;
        let _ = write!(out, "{value}");
        Ok(())
    }
}
