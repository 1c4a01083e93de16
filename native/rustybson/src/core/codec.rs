//! Wire codec
//!
//! A document is an i32 little-endian total length, a run of elements, and
//! a 0x00 terminator. An element is a type byte, a NUL-terminated UTF-8
//! name, and a type-specific value. Arrays are documents keyed "0", "1", ...
//!
//! Decoding is one level at a time: nested documents are checked only by
//! their length prefix and terminator, so problems deeper down surface when
//! that subtree is first decoded.

use std::ops::Range;

use memchr::memchr;

use super::scanner::Scanner;
use super::types::ElementType;
use super::value::Value;
use crate::error::{Error, Result};

/// Smallest valid document: length prefix plus terminator
pub const MIN_DOCUMENT_LEN: usize = 5;

/// Smallest code-with-scope value: total length, empty string, empty scope
const MIN_CODE_WITH_SCOPE_LEN: usize = 4 + 5 + MIN_DOCUMENT_LEN;

/// One decoded element, with ranges relative to the decoded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub kind: ElementType,
    /// Name bytes (without the NUL)
    pub name: Range<usize>,
    /// Value bytes (for containers, the whole nested document)
    pub value: Range<usize>,
}

/// Validate the length prefix and terminator of a document that must span
/// all of `bytes`. `base` is the offset of `bytes` in its buffer.
pub fn document_len(bytes: &[u8], base: usize) -> Result<usize> {
    let len = Scanner::with_base(bytes, base).peek_len()?;
    if len < MIN_DOCUMENT_LEN {
        return Err(Error::codec(base, "document shorter than minimum"));
    }
    if len != bytes.len() {
        return Err(Error::codec(base, "length prefix does not match span"));
    }
    if bytes[len - 1] != 0 {
        return Err(Error::codec(base + len - 1, "missing document terminator"));
    }
    Ok(len)
}

/// Decode exactly one level of a document.
pub fn decode_fields(doc: &[u8], base: usize) -> Result<Vec<RawField>> {
    let len = document_len(doc, base)?;
    let body = &doc[4..len - 1];
    let mut scanner = Scanner::with_base(body, base + 4);
    let mut fields = Vec::new();

    while !scanner.is_eof() {
        let type_byte = scanner.read_u8()?;
        let kind = match ElementType::from_byte(type_byte) {
            Some(kind) => kind,
            None if type_byte == 0 => return Err(scanner.error("terminator inside document")),
            None => return Err(scanner.error("unsupported element type")),
        };

        let name_start = scanner.position();
        let name = scanner.read_cstr_utf8()?;
        let name = (name_start + 4)..(name_start + 4 + name.len());

        let value_start = scanner.position();
        let n = value_len(kind, &scanner)?;
        scanner.take(n)?;
        fields.push(RawField {
            kind,
            name,
            value: (value_start + 4)..(value_start + 4 + n),
        });
    }

    Ok(fields)
}

/// Length of the value of type `kind` at the scanner's position.
fn value_len(kind: ElementType, scanner: &Scanner<'_>) -> Result<usize> {
    let rest = scanner.remaining();
    let n = match kind {
        ElementType::Double | ElementType::DateTime | ElementType::Timestamp | ElementType::Int64 => 8,
        ElementType::Int32 => 4,
        ElementType::Bool => 1,
        ElementType::ObjectId => 12,
        ElementType::Decimal128 => 16,
        ElementType::Undefined | ElementType::Null | ElementType::MinKey | ElementType::MaxKey => 0,
        ElementType::String | ElementType::JavaScript | ElementType::Symbol => {
            let n = scanner.peek_len()?;
            if n == 0 {
                return Err(scanner.error("empty string length"));
            }
            if rest.get(4 + n - 1) != Some(&0) {
                return Err(scanner.error("string not NUL terminated"));
            }
            4 + n
        }
        ElementType::DbPointer => {
            let n = scanner.peek_len()?;
            if n == 0 || rest.get(4 + n - 1) != Some(&0) {
                return Err(scanner.error("string not NUL terminated"));
            }
            4 + n + 12
        }
        ElementType::JavaScriptWithScope => {
            let n = scanner.peek_len()?;
            if n < MIN_CODE_WITH_SCOPE_LEN {
                return Err(scanner.error("code with scope shorter than minimum"));
            }
            n
        }
        ElementType::Binary => scanner
            .peek_len()?
            .checked_add(5)
            .ok_or_else(|| scanner.error("binary length overflow"))?,
        ElementType::Object | ElementType::Array => {
            let n = scanner.peek_len()?;
            if n < MIN_DOCUMENT_LEN {
                return Err(scanner.error("document shorter than minimum"));
            }
            if rest.get(n - 1) != Some(&0) {
                return Err(scanner.error("missing document terminator"));
            }
            n
        }
        ElementType::Regex => {
            let pattern = memchr(0, rest).ok_or_else(|| scanner.error("unterminated regex"))?;
            let options = memchr(0, &rest[pattern + 1..])
                .ok_or_else(|| scanner.error("unterminated regex options"))?;
            pattern + options + 2
        }
    };
    if n > rest.len() {
        return Err(scanner.error("truncated value"));
    }
    Ok(n)
}

fn read_string(scanner: &mut Scanner<'_>) -> Result<String> {
    let n = scanner.peek_len()?;
    scanner.take(4)?;
    let bytes = scanner.take(n)?;
    let text = bytes
        .split_last()
        .filter(|(last, _)| **last == 0)
        .map(|(_, text)| text)
        .ok_or_else(|| scanner.error("string not NUL terminated"))?;
    String::from_utf8(text.to_vec()).map_err(|_| scanner.error("invalid UTF-8"))
}

/// Decode the value bytes of a leaf of type `kind`.
pub fn decode_value(kind: ElementType, bytes: &[u8], base: usize) -> Result<Value> {
    let mut s = Scanner::with_base(bytes, base);
    let value = match kind {
        ElementType::Double => Value::Double(s.read_f64()?),
        ElementType::String => Value::String(read_string(&mut s)?),
        ElementType::JavaScript => Value::JavaScript(read_string(&mut s)?),
        ElementType::Symbol => Value::Symbol(read_string(&mut s)?),
        ElementType::DbPointer => Value::DbPointer {
            namespace: read_string(&mut s)?,
            id: s.take_array()?,
        },
        ElementType::JavaScriptWithScope => {
            let total = s.peek_len()?;
            if total != bytes.len() {
                return Err(s.error("code with scope length mismatch"));
            }
            s.take(4)?;
            let code = read_string(&mut s)?;
            let scope_base = base + s.position();
            let rest = s.remaining().len();
            let scope = s.take(rest)?;
            document_len(scope, scope_base)?;
            Value::JavaScriptWithScope {
                code,
                scope: scope.to_vec(),
            }
        }
        ElementType::Binary => {
            let n = s.peek_len()?;
            s.take(4)?;
            let subtype = s.read_u8()?;
            Value::Binary {
                subtype,
                bytes: s.take(n)?.to_vec(),
            }
        }
        ElementType::Undefined => Value::Undefined,
        ElementType::ObjectId => Value::ObjectId(s.take_array()?),
        ElementType::Bool => match s.read_u8()? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            _ => return Err(Error::codec(base, "invalid boolean")),
        },
        ElementType::DateTime => Value::DateTime(s.read_i64()?),
        ElementType::Null => Value::Null,
        ElementType::Regex => Value::Regex {
            pattern: s.read_cstr_utf8()?.to_string(),
            options: s.read_cstr_utf8()?.to_string(),
        },
        ElementType::Int32 => Value::Int32(s.read_i32()?),
        ElementType::Timestamp => Value::Timestamp(s.read_u64()?),
        ElementType::Int64 => Value::Int64(s.read_i64()?),
        ElementType::Decimal128 => Value::Decimal128(s.take_array()?),
        ElementType::MinKey => Value::MinKey,
        ElementType::MaxKey => Value::MaxKey,
        ElementType::Object | ElementType::Array => {
            return Err(Error::codec(base, "container has no leaf value"))
        }
    };
    if !s.is_eof() {
        return Err(s.error("trailing bytes after value"));
    }
    Ok(value)
}

fn len_prefix(n: usize) -> Result<[u8; 4]> {
    i32::try_from(n)
        .map(i32::to_le_bytes)
        .map_err(|_| Error::codec(0, "value exceeds maximum length"))
}

fn write_cstr(out: &mut Vec<u8>, s: &str) -> Result<()> {
    if memchr(0, s.as_bytes()).is_some() {
        return Err(Error::codec(0, "cstring contains NUL"));
    }
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

fn write_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    out.extend_from_slice(&len_prefix(s.len() + 1)?);
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

/// Encode the value bytes of a leaf (no type byte, no name).
pub fn encode_value(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Double(n) => out.extend_from_slice(&n.to_le_bytes()),
        Value::String(s) | Value::JavaScript(s) | Value::Symbol(s) => write_string(out, s)?,
        Value::Binary { subtype, bytes } => {
            out.extend_from_slice(&len_prefix(bytes.len())?);
            out.push(*subtype);
            out.extend_from_slice(bytes);
        }
        Value::Undefined | Value::Null | Value::MinKey | Value::MaxKey => {}
        Value::ObjectId(oid) => out.extend_from_slice(oid),
        Value::Bool(b) => out.push(u8::from(*b)),
        Value::DateTime(ms) => out.extend_from_slice(&ms.to_le_bytes()),
        Value::Regex { pattern, options } => {
            write_cstr(out, pattern)?;
            write_cstr(out, options)?;
        }
        Value::DbPointer { namespace, id } => {
            write_string(out, namespace)?;
            out.extend_from_slice(id);
        }
        Value::JavaScriptWithScope { code, scope } => {
            document_len(scope, 0)?;
            let at = begin_document(out);
            write_string(out, code)?;
            out.extend_from_slice(scope);
            let prefix = len_prefix(out.len() - at)?;
            out[at..at + 4].copy_from_slice(&prefix);
        }
        Value::Int32(n) => out.extend_from_slice(&n.to_le_bytes()),
        Value::Timestamp(ts) => out.extend_from_slice(&ts.to_le_bytes()),
        Value::Int64(n) => out.extend_from_slice(&n.to_le_bytes()),
        Value::Decimal128(bits) => out.extend_from_slice(bits),
    }
    Ok(())
}

/// Write an element's type byte and name.
pub fn write_element_header(out: &mut Vec<u8>, kind: ElementType, name: &str) -> Result<()> {
    out.push(kind.as_byte());
    write_cstr(out, name)
}

/// Reserve a length prefix; returns its position for `end_document`.
#[inline]
pub fn begin_document(out: &mut Vec<u8>) -> usize {
    let at = out.len();
    out.extend_from_slice(&[0; 4]);
    at
}

/// Write the terminator and patch the length prefix reserved at `at`.
pub fn end_document(out: &mut Vec<u8>, at: usize) -> Result<()> {
    out.push(0);
    let prefix = len_prefix(out.len() - at)?;
    out[at..at + 4].copy_from_slice(&prefix);
    Ok(())
}

/// Encode a flat document of leaf fields, in order.
pub fn encode_document<'v, I, N>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (N, &'v Value)>,
    N: AsRef<str>,
{
    let mut out = Vec::new();
    let at = begin_document(&mut out);
    for (name, value) in fields {
        write_element_header(&mut out, value.element_type(), name.as_ref())?;
        encode_value(value, &mut out)?;
    }
    end_document(&mut out, at)?;
    Ok(out)
}
