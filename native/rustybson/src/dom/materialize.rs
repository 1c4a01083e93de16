//! Lazy expansion of opaque containers
//!
//! An opaque container holds the span of its encoded body instead of live
//! children. The first structural access decodes exactly that span, one
//! level deep: nested containers come out opaque themselves, and leaves keep
//! pointing at their value bytes in the backing buffer.

use crate::core::codec;
use crate::error::{Error, Result};

use super::document::Document;
use super::node::{Payload, Rep, RepId};

impl Document {
    /// Expand `id` if it is an unexpanded opaque container.
    ///
    /// All-or-nothing: the span is fully decoded and every child appended
    /// before the node switches to live children, so a codec or allocation
    /// failure leaves the node opaque and untouched.
    pub(crate) fn materialize_rep(&mut self, id: RepId) -> Result<()> {
        let rep = self.rep(id);
        if rep.expanded {
            return Ok(());
        }
        let Payload::Opaque(span) = rep.payload else {
            return Ok(());
        };

        let fields = codec::decode_fields(self.buffers.slice(span), span.offset as usize)
            .inspect_err(|err| {
                tracing::debug!(doc = self.id(), rep = id, error = %err, "materialization failed");
            })?;

        let mut staged = Vec::new();
        staged
            .try_reserve_exact(fields.len())
            .map_err(Error::alloc("materialized children"))?;
        for field in &fields {
            let name = span.sub(field.name.clone());
            let name_id = self
                .names
                .intern_backed(&self.buffers, name.source, name.offset, name.len)?;
            let value = span.sub(field.value.clone());
            staged.push(if field.kind.is_container() {
                Rep::opaque(field.kind, name_id, value)
            } else {
                Rep::leaf(field.kind, name_id, value)
            });
        }
        self.reps.reserve(staged.len())?;

        let count = staged.len();
        let mut ids = Vec::new();
        ids.try_reserve_exact(count)
            .map_err(Error::alloc("materialized children"))?;
        for child in staged {
            ids.push(self.reps.append(child)?);
        }

        // Children exist but are unreachable until the parent flips
        let rep = self.reps.get_mut(id);
        rep.payload = Payload::Children;
        rep.expanded = true;
        for child_id in ids {
            self.link_back(id, child_id);
        }
        tracing::debug!(doc = self.id(), rep = id, children = count, "materialized opaque span");
        Ok(())
    }
}
