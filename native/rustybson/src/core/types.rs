//! Element type codes.
//!
//! Each encoded element starts with a 1-byte type code. Objects and arrays
//! are containers; every other type is a leaf.

/// Type of an element, encoded as its wire type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    Object = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Bool = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Regex = 0x0B,
    /// Deprecated: namespace string plus ObjectId
    DbPointer = 0x0C,
    JavaScript = 0x0D,
    Symbol = 0x0E,
    /// Deprecated: code string plus a scope document, kept as one leaf
    JavaScriptWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MaxKey = 0x7F,
    MinKey = 0xFF,
}

impl ElementType {
    /// Parse a type byte. Returns None for unknown or unsupported codes.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0x01 => ElementType::Double,
            0x02 => ElementType::String,
            0x03 => ElementType::Object,
            0x04 => ElementType::Array,
            0x05 => ElementType::Binary,
            0x06 => ElementType::Undefined,
            0x07 => ElementType::ObjectId,
            0x08 => ElementType::Bool,
            0x09 => ElementType::DateTime,
            0x0A => ElementType::Null,
            0x0B => ElementType::Regex,
            0x0C => ElementType::DbPointer,
            0x0D => ElementType::JavaScript,
            0x0E => ElementType::Symbol,
            0x0F => ElementType::JavaScriptWithScope,
            0x10 => ElementType::Int32,
            0x11 => ElementType::Timestamp,
            0x12 => ElementType::Int64,
            0x13 => ElementType::Decimal128,
            0x7F => ElementType::MaxKey,
            0xFF => ElementType::MinKey,
            _ => return None,
        })
    }

    /// Get the raw type byte.
    #[inline]
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Objects and arrays hold children; everything else holds a value.
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, ElementType::Object | ElementType::Array)
    }

    /// Get the type name (for rendering and error messages).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Double => "double",
            ElementType::String => "string",
            ElementType::Object => "object",
            ElementType::Array => "array",
            ElementType::Binary => "binData",
            ElementType::Undefined => "undefined",
            ElementType::ObjectId => "objectId",
            ElementType::Bool => "bool",
            ElementType::DateTime => "date",
            ElementType::Null => "null",
            ElementType::Regex => "regex",
            ElementType::DbPointer => "dbPointer",
            ElementType::JavaScript => "javascript",
            ElementType::Symbol => "symbol",
            ElementType::JavaScriptWithScope => "javascriptWithScope",
            ElementType::Int32 => "int",
            ElementType::Timestamp => "timestamp",
            ElementType::Int64 => "long",
            ElementType::Decimal128 => "decimal",
            ElementType::MaxKey => "maxKey",
            ElementType::MinKey => "minKey",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_byte() {
        assert_eq!(ElementType::from_byte(0x10), Some(ElementType::Int32));
        assert_eq!(ElementType::from_byte(0xFF), Some(ElementType::MinKey));
        assert_eq!(ElementType::from_byte(0x0C), Some(ElementType::DbPointer));
        assert_eq!(ElementType::from_byte(0x0F), Some(ElementType::JavaScriptWithScope));
        assert!(!ElementType::JavaScriptWithScope.is_container());
        assert_eq!(ElementType::from_byte(0x00), None);
        assert_eq!(ElementType::from_byte(0x14), None);
    }

    #[test]
    fn test_containers() {
        assert!(ElementType::Object.is_container());
        assert!(ElementType::Array.is_container());
        assert!(!ElementType::String.is_container());
        assert_eq!(ElementType::Array.as_byte(), 0x04);
    }
}
