//! Core byte-level components
//!
//! - `types`: element type codes
//! - `value`: owned leaf values
//! - `scanner`: bounds-checked little-endian cursor (memchr for cstrings)
//! - `codec`: one-level document decode and leaf encode

pub mod codec;
pub mod scanner;
pub mod types;
pub mod value;

pub use codec::RawField;
pub use types::ElementType;
pub use value::Value;
