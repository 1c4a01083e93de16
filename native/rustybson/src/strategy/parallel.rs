//! Parallel Serialization
//!
//! Uses Rayon to serialize many documents at once. Serialization only
//! reads, so each document is shared immutably across workers.

use rayon::prelude::*;

use crate::dom::{Document, Element};
use crate::error::Result;

/// Serialize every document, preserving input order
pub fn serialize_all(docs: &[Document]) -> Vec<Result<Vec<u8>>> {
    docs.par_iter().map(Document::serialize).collect()
}

/// Serialize several elements of one document
pub fn serialize_elements(doc: &Document, elements: &[Element]) -> Vec<Result<Vec<u8>>> {
    elements
        .par_iter()
        .map(|&el| doc.serialize_element(el))
        .collect()
}
