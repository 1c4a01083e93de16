//! Little-endian byte scanner using memchr
//!
//! Bounds-checked cursor over an encoded buffer. Every read either
//! advances or fails with a codec error carrying the absolute offset.

use memchr::memchr;

use crate::error::{Error, Result};

/// Cursor over encoded bytes
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    /// Offset of `input[0]` within the enclosing buffer (for error reports)
    base: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0, base: 0 }
    }

    /// Create a scanner whose error offsets are shifted by `base`
    #[inline]
    pub fn with_base(input: &'a [u8], base: usize) -> Self {
        Scanner { input, pos: 0, base }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Build a codec error at the current position
    #[inline]
    pub fn error(&self, reason: &'static str) -> Error {
        Error::codec(self.base + self.pos, reason)
    }

    /// Take the next `n` bytes
    #[inline]
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.input.len())
            .ok_or_else(|| self.error("truncated value"))?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Take exactly N bytes as an array
    #[inline]
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Read a non-negative i32 length prefix without advancing
    pub fn peek_len(&self) -> Result<usize> {
        let bytes = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("truncated length prefix"))?;
        let len = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        usize::try_from(len).map_err(|_| self.error("negative length prefix"))
    }

    /// Read a NUL-terminated string, returning its bytes without the NUL
    #[inline]
    pub fn read_cstr(&mut self) -> Result<&'a [u8]> {
        let len = memchr(0, self.remaining()).ok_or_else(|| self.error("unterminated cstring"))?;
        let bytes = &self.input[self.pos..self.pos + len];
        self.pos += len + 1;
        Ok(bytes)
    }

    /// Read a NUL-terminated UTF-8 string
    pub fn read_cstr_utf8(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let bytes = self.read_cstr()?;
        std::str::from_utf8(bytes).map_err(|_| Error::codec(self.base + start, "invalid UTF-8"))
    }
}
