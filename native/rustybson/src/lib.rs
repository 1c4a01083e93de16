//! RustyBSON - Mutable documents over length-prefixed binary encodings
//!
//! Layers:
//! A: Byte codec (core::codec) - one-level decode, leaf encode
//! B: Span index (index) - zero-copy views into backing buffers
//! C: Mutable tree (dom) - arena of element records, lazily materialized
//! D: Serializer (serialize) - verbatim copy of untouched spans
//! E: Parallel serialization (strategy::parallel)
//!
//! ```
//! use rustybson::{Document, Value};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let a = doc.make_leaf("a", 1).unwrap();
//! doc.push_back(root, a).unwrap();
//! let bytes = doc.serialize().unwrap();
//!
//! let mut wrapped = Document::from_bytes(bytes).unwrap();
//! let root = wrapped.root();
//! let a = wrapped.find_child(root, "a").unwrap().unwrap();
//! assert_eq!(wrapped.value(a).unwrap(), Some(Value::Int32(1)));
//! ```

pub mod core;
pub mod dom;
pub mod error;
pub mod index;
pub mod options;
pub mod serialize;
pub mod strategy;

pub use crate::core::{ElementType, Value};
pub use crate::dom::{Children, Document, DocumentId, DocumentStats, Element};
pub use crate::error::{Error, InvalidOp, Result};
pub use crate::options::DocumentOptions;
