//! Read cursor over the input document.
//!
//! Every fixed-width read is bounds-checked against the slice and fails with
//! [`TranscodeError::TruncatedInput`] rather than reading past the end.
//! Multi-byte values are little-endian regardless of host byte order.

use crate::error::TranscodeError;

#[derive(Debug)]
pub(crate) struct Input<'a> {
    data: &'a [u8],
    idx: usize,
}

impl<'a> Input<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, idx: 0 }
    }

    #[inline]
    pub(crate) fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub(crate) fn idx(&self) -> usize {
        self.idx
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.idx
    }

    /// Pointer to the byte at the cursor.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.data[self.idx..].as_ptr()
    }

    /// Advances the cursor over bytes already known to be in bounds.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.idx += n;
        debug_assert!(self.idx <= self.data.len());
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.data.get(self.idx).copied()
    }

    /// The byte just before the cursor.
    #[inline]
    pub(crate) fn prev(&self) -> u8 {
        self.data[self.idx - 1]
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], TranscodeError> {
        let arr = self
            .data
            .get(self.idx..self.idx + N)
            .and_then(|s| s.try_into().ok())
            .ok_or(TranscodeError::TruncatedInput)?;
        self.idx += N;
        Ok(arr)
    }

    #[inline]
    pub(crate) fn read_byte(&mut self) -> Result<u8, TranscodeError> {
        let b = self.peek().ok_or(TranscodeError::TruncatedInput)?;
        self.idx += 1;
        Ok(b)
    }

    #[inline]
    pub(crate) fn read_i32(&mut self) -> Result<i32, TranscodeError> {
        Ok(i32::from_le_bytes(self.read_bytes()?))
    }

    #[inline]
    pub(crate) fn read_i64(&mut self) -> Result<i64, TranscodeError> {
        Ok(i64::from_le_bytes(self.read_bytes()?))
    }

    #[inline]
    pub(crate) fn read_f64(&mut self) -> Result<f64, TranscodeError> {
        Ok(f64::from_le_bytes(self.read_bytes()?))
    }

    /// Reads a fixed-size block, e.g. the 12 ObjectId bytes.
    #[inline]
    pub(crate) fn read_block<const N: usize>(&mut self) -> Result<[u8; N], TranscodeError> {
        self.read_bytes()
    }

    /// Advances past a NUL-terminated name, returning its length (without
    /// the terminator). The cursor lands just after the NUL.
    ///
    /// The walker's hot paths subsume this: object keys are skipped by the
    /// escaping scan itself and array indices by their known digit count.
    #[allow(dead_code)]
    pub(crate) fn skip_cstring(&mut self) -> Result<usize, TranscodeError> {
        let tail = &self.data[self.idx..];
        match tail.iter().position(|&b| b == 0) {
            Some(len) => {
                self.idx += len + 1;
                Ok(len)
            }
            None => Err(TranscodeError::UnterminatedName),
        }
    }
}
