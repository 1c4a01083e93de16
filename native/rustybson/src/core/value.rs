//! Owned leaf values.

use std::fmt;

use super::types::ElementType;

/// A typed leaf value. Containers are not values: they are built from
/// child elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Double(f64),
    String(String),
    Binary { subtype: u8, bytes: Vec<u8> },
    Undefined,
    ObjectId([u8; 12]),
    Bool(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Null,
    Regex { pattern: String, options: String },
    /// Deprecated reference to a document in another collection.
    DbPointer { namespace: String, id: [u8; 12] },
    JavaScript(String),
    Symbol(String),
    /// Deprecated code with a scope; `scope` is the encoded scope document.
    JavaScriptWithScope { code: String, scope: Vec<u8> },
    Int32(i32),
    /// Internal replication timestamp, increment in the low word.
    Timestamp(u64),
    Int64(i64),
    /// Raw IEEE 754-2008 decimal128 bits, little endian.
    Decimal128([u8; 16]),
    MinKey,
    MaxKey,
}

impl Value {
    /// Get the element type this value encodes as.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Double(_) => ElementType::Double,
            Value::String(_) => ElementType::String,
            Value::Binary { .. } => ElementType::Binary,
            Value::Undefined => ElementType::Undefined,
            Value::ObjectId(_) => ElementType::ObjectId,
            Value::Bool(_) => ElementType::Bool,
            Value::DateTime(_) => ElementType::DateTime,
            Value::Null => ElementType::Null,
            Value::Regex { .. } => ElementType::Regex,
            Value::DbPointer { .. } => ElementType::DbPointer,
            Value::JavaScript(_) => ElementType::JavaScript,
            Value::Symbol(_) => ElementType::Symbol,
            Value::JavaScriptWithScope { .. } => ElementType::JavaScriptWithScope,
            Value::Int32(_) => ElementType::Int32,
            Value::Timestamp(_) => ElementType::Timestamp,
            Value::Int64(_) => ElementType::Int64,
            Value::Decimal128(_) => ElementType::Decimal128,
            Value::MinKey => ElementType::MinKey,
            Value::MaxKey => ElementType::MaxKey,
        }
    }

    /// Get the value as i64 if it is any integer type.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(n) => Some(i64::from(*n)),
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{b:02x}")?;
    }
    Ok(())
}

/// Shell-style rendering, e.g. `ObjectId("…")`, `NumberLong(5)`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Double(n) => write!(f, "{n:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Binary { subtype, bytes } => {
                write!(f, "BinData({subtype}, ")?;
                write_hex(f, bytes)?;
                write!(f, ")")
            }
            Value::Undefined => write!(f, "undefined"),
            Value::ObjectId(oid) => {
                write!(f, "ObjectId(\"")?;
                write_hex(f, oid)?;
                write!(f, "\")")
            }
            Value::Bool(b) => write!(f, "{b}"),
            Value::DateTime(ms) => write!(f, "new Date({ms})"),
            Value::Null => write!(f, "null"),
            Value::Regex { pattern, options } => write!(f, "/{pattern}/{options}"),
            Value::DbPointer { namespace, id } => {
                write!(f, "DBPointer({namespace:?}, ObjectId(\"")?;
                write_hex(f, id)?;
                write!(f, "\"))")
            }
            Value::JavaScript(code) => write!(f, "function {code:?}"),
            Value::Symbol(s) => write!(f, "Symbol({s:?})"),
            Value::JavaScriptWithScope { code, scope } => {
                write!(f, "CodeWScope({code:?}, {} bytes)", scope.len())
            }
            Value::Int32(n) => write!(f, "{n}"),
            Value::Timestamp(ts) => write!(f, "Timestamp({}, {})", ts >> 32, ts & 0xFFFF_FFFF),
            Value::Int64(n) => write!(f, "NumberLong({n})"),
            Value::Decimal128(bits) => {
                write!(f, "NumberDecimal(0x")?;
                write_hex(f, bits)?;
                write!(f, ")")
            }
            Value::MinKey => write!(f, "MinKey"),
            Value::MaxKey => write!(f, "MaxKey"),
        }
    }
}
