//! DOM Module - Mutable overlay over encoded documents
//!
//! Implements an efficient mutable tree using:
//! - Arena allocation for element records
//! - RepId (u32) indices for sibling and parent links
//! - Name interning and an append-only value heap
//! - Lazy, one-level materialization of encoded sub-documents

mod algorithm;
mod display;
pub mod document;
pub mod element;
mod materialize;
pub mod node;
pub(crate) mod repository;
mod stats;
pub mod strings;
pub(crate) mod values;
pub(crate) mod walk;

pub use document::Document;
pub use element::{Children, DocumentId, Element};
pub use node::{RepId, EMPTY_REP};
pub use stats::DocumentStats;
pub use strings::NameId;
