//! Span Index Module
//!
//! Encoded bytes are never copied into the tree up front. Leaves and
//! unexpanded containers refer to their bytes through a `Span`, resolved
//! against the document's `Buffers` or its value heap.

pub mod span;

pub use span::{BufferId, Buffers, Span, HEAP_SOURCE};
