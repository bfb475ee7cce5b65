//! The document walker: a recursive state machine over BSON documents and
//! arrays that sequences names, values, separators and container brackets.

use crate::encode;
use crate::error::TranscodeError;
use crate::escape;
use crate::input::Input;
use crate::isa::IsaTier;
use crate::options::TranscodeOptions;
use crate::output::{GrowSink, Sink};

/// Maximum container nesting before a document is rejected; adversarial
/// inputs must not be able to exhaust the thread stack.
pub(crate) const MAX_DEPTH: usize = 200;

const TYPE_NUMBER: u8 = 0x01;
const TYPE_STRING: u8 = 0x02;
const TYPE_OBJECT: u8 = 0x03;
const TYPE_ARRAY: u8 = 0x04;
const TYPE_BINARY: u8 = 0x05;
const TYPE_UNDEFINED: u8 = 0x06;
const TYPE_OID: u8 = 0x07;
const TYPE_BOOLEAN: u8 = 0x08;
const TYPE_DATE: u8 = 0x09;
const TYPE_NULL: u8 = 0x0a;
const TYPE_REGEXP: u8 = 0x0b;
const TYPE_DBPOINTER: u8 = 0x0c;
const TYPE_CODE: u8 = 0x0d;
const TYPE_SYMBOL: u8 = 0x0e;
const TYPE_CODE_W_SCOPE: u8 = 0x0f;
const TYPE_INT: u8 = 0x10;
const TYPE_TIMESTAMP: u8 = 0x11;
const TYPE_LONG: u8 = 0x12;
const TYPE_DECIMAL128: u8 = 0x13;
const TYPE_MIN_KEY: u8 = 0xff;
const TYPE_MAX_KEY: u8 = 0x7f;

/// Decimal digit count of an array index; BSON spells indices out as ASCII
/// names, known to equal the element counter, so the walker can skip them
/// without reading.
fn digits(v: u32) -> usize {
    if v < 10 {
        1
    } else if v < 100 {
        2
    } else if v < 1_000 {
        3
    } else if v < 10_000 {
        4
    } else if v < 100_000 {
        5
    } else if v < 1_000_000 {
        6
    } else if v < 10_000_000 {
        7
    } else if v < 100_000_000 {
        8
    } else if v < 1_000_000_000 {
        9
    } else {
        10
    }
}

pub(crate) struct Transcoder<'a, S: Sink> {
    input: Input<'a>,
    sink: S,
    tier: IsaTier,
    depth: usize,
}

impl<'a, S: Sink> Transcoder<'a, S> {
    pub(crate) fn new(data: &'a [u8], sink: S, tier: IsaTier) -> Self {
        Self {
            input: Input::new(data),
            sink,
            tier,
            depth: 0,
        }
    }

    pub(crate) fn run(&mut self, is_array: bool) -> Result<(), TranscodeError> {
        self.walk(is_array)
    }

    pub(crate) fn into_sink(self) -> S {
        self.sink
    }

    fn walk(&mut self, is_array: bool) -> Result<(), TranscodeError> {
        if self.depth == MAX_DEPTH {
            return Err(TranscodeError::NestingTooDeep);
        }
        self.depth += 1;

        let size = self.input.read_i32()?;
        if size < 5 {
            return Err(TranscodeError::InvalidSize);
        }
        // The declared size spans from before the four length bytes.
        if size as usize > self.input.remaining() + 4 {
            return Err(TranscodeError::SizeExceedsInput);
        }

        self.sink.ensure(1)?;
        self.sink.push(if is_array { b'[' } else { b'{' });

        let mut index = 0u32;
        loop {
            let element_type = self.input.read_byte()?;
            if element_type == 0 {
                break;
            }

            if index > 0 {
                self.sink.ensure(1)?;
                self.sink.push(b',');
            }

            if is_array {
                // The name is the decimal spelling of `index`; skip it and
                // its terminator after confirming the terminator is where
                // the digit count says it must be.
                let skip = digits(index);
                match self.input.data().get(self.input.idx() + skip) {
                    Some(0) => self.input.advance(skip + 1),
                    Some(_) => return Err(TranscodeError::UnterminatedName),
                    None => return Err(TranscodeError::TruncatedInput),
                }
            } else {
                self.sink.ensure(1)?;
                self.sink.push(b'"');
                escape::escape_cstr(&mut self.input, &mut self.sink, self.tier)?;
                self.input.advance(1); // terminator
                self.sink.ensure(2)?;
                self.sink.push(b'"');
                self.sink.push(b':');
            }

            match element_type {
                TYPE_NUMBER => {
                    let value = self.input.read_f64()?;
                    encode::write_f64(&mut self.sink, value)?;
                }
                TYPE_STRING => {
                    let size = self.input.read_i32()?;
                    if size <= 0 || size as usize > self.input.remaining() {
                        return Err(TranscodeError::BadStringLength);
                    }
                    self.sink.ensure(1)?;
                    self.sink.push(b'"');
                    escape::escape_n(&mut self.input, &mut self.sink, self.tier, size as usize - 1)?;
                    self.input.advance(1); // terminator
                    self.sink.ensure(1)?;
                    self.sink.push(b'"');
                }
                TYPE_OBJECT => {
                    self.walk(false)?;
                }
                TYPE_ARRAY => {
                    self.walk(true)?;
                    if self.input.prev() != 0 {
                        return Err(TranscodeError::InvalidArrayTerminator);
                    }
                }
                TYPE_UNDEFINED => {
                    // Deprecated BSON `undefined` maps to null; eliding it
                    // would leave a dangling comma or a missing value.
                    self.sink.ensure(4)?;
                    self.sink.extend(b"null");
                }
                TYPE_OID => {
                    let bytes = self.input.read_block::<12>()?;
                    encode::write_object_id(&mut self.sink, &bytes, self.tier)?;
                }
                TYPE_BOOLEAN => {
                    if self.input.read_byte()? == 1 {
                        self.sink.ensure(4)?;
                        self.sink.extend(b"true");
                    } else {
                        self.sink.ensure(5)?;
                        self.sink.extend(b"false");
                    }
                }
                TYPE_DATE => {
                    let value = self.input.read_i64()?;
                    encode::write_date(&mut self.sink, value)?;
                }
                TYPE_NULL => {
                    self.sink.ensure(4)?;
                    self.sink.extend(b"null");
                }
                TYPE_INT => {
                    let value = self.input.read_i32()?;
                    encode::write_i32(&mut self.sink, value)?;
                }
                TYPE_LONG => {
                    let value = self.input.read_i64()?;
                    encode::write_i64(&mut self.sink, value)?;
                }
                TYPE_BINARY | TYPE_REGEXP | TYPE_DBPOINTER | TYPE_CODE | TYPE_SYMBOL
                | TYPE_CODE_W_SCOPE | TYPE_TIMESTAMP | TYPE_DECIMAL128 | TYPE_MIN_KEY
                | TYPE_MAX_KEY => {
                    return Err(TranscodeError::UnsupportedType(element_type));
                }
                unknown => return Err(TranscodeError::UnknownType(unknown)),
            }

            index += 1;
        }

        self.sink.ensure(1)?;
        self.sink.push(if is_array { b']' } else { b'}' });
        self.depth -= 1;
        Ok(())
    }
}

/// Transcodes one BSON document into a contiguous JSON byte buffer.
///
/// The output buffer starts at `options.chunk_size` bytes (or the 2.5×
/// heuristic) and grows as needed.
///
/// # Errors
///
/// Returns the first [`TranscodeError`] encountered; no partial output is
/// kept.
///
/// # Examples
///
/// ```rust
/// use bsonjet::{transcode, TranscodeOptions};
///
/// // {"a": 1}
/// let doc = b"\x0c\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x00";
/// let json = transcode(doc, &TranscodeOptions::default()).unwrap();
/// assert_eq!(json, b"{\"a\":1}");
/// ```
pub fn transcode(input: &[u8], options: &TranscodeOptions) -> Result<Vec<u8>, TranscodeError> {
    let tier = IsaTier::effective(options.isa);
    let capacity = if options.chunk_size == 0 {
        heuristic_capacity(input.len())
    } else {
        options.chunk_size
    };
    let mut transcoder = Transcoder::new(input, GrowSink::with_capacity(capacity), tier);
    transcoder.run(options.is_array)?;
    Ok(transcoder.into_sink().finish())
}

/// 2.5× the input length, the observed mixed-data expansion ceiling.
pub(crate) fn heuristic_capacity(input_len: usize) -> usize {
    (input_len * 5).div_ceil(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_counts() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(99), 2);
        assert_eq!(digits(100), 3);
        assert_eq!(digits(999_999_999), 9);
        assert_eq!(digits(1_000_000_000), 10);
        assert_eq!(digits(u32::MAX), 10);
    }

    #[test]
    fn heuristic() {
        assert_eq!(heuristic_capacity(0), 0);
        assert_eq!(heuristic_capacity(4), 10);
        assert_eq!(heuristic_capacity(5), 13);
    }
}
