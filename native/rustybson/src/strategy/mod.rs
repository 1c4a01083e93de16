//! Batch strategies
//!
//! - Parallel serialization of many documents (rayon)

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(feature = "parallel")]
pub use parallel::{serialize_all, serialize_elements};
