//! Transcode BSON documents straight to UTF-8 JSON bytes.
//!
//! The transcoder walks the wire format once, escaping strings with
//! SIMD-accelerated scans where the CPU allows, and never materialises an
//! intermediate value tree. Output is delivered either as one contiguous
//! buffer ([`transcode`]) or as fixed-capacity chunks produced on demand by
//! a background thread ([`transcode_chunked`]).
//!
//! BSON types with no natural JSON form (binary, regex, timestamp, code,
//! symbol, decimal128, db-pointer, min/max key) are rejected rather than
//! approximated. ObjectIds become 24-char lowercase hex strings, dates
//! become ISO-8601 UTC strings, and 64-bit integers become plain JSON
//! numbers.
//!
//! # Examples
//!
//! ```rust
//! use bsonjet::{transcode, TranscodeOptions};
//!
//! // {"greeting": "hello"}
//! let doc = b"\x19\x00\x00\x00\x02greeting\x00\x06\x00\x00\x00hello\x00\x00";
//! let json = transcode(doc, &TranscodeOptions::default()).unwrap();
//! assert_eq!(json, br#"{"greeting":"hello"}"#);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod chunks;
mod encode;
mod error;
mod escape;
mod input;
mod isa;
mod options;
mod output;
mod transcoder;

pub use chunks::{transcode_chunked, Chunks};
pub use error::TranscodeError;
pub use isa::IsaTier;
pub use options::TranscodeOptions;
pub use transcoder::transcode;
