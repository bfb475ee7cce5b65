use thiserror::Error;

/// The reason a transcode run was abandoned.
///
/// The first error encountered wins; once one is reported no further output
/// is produced and any partial output must be treated as void.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TranscodeError {
    /// The declared document size is below the five-byte minimum.
    #[error("document size must be at least 5 bytes")]
    InvalidSize,
    /// The declared document size runs past the end of the input.
    #[error("document size exceeds input length")]
    SizeExceedsInput,
    /// A fixed-width read would pass the end of the input.
    #[error("unexpected end of input")]
    TruncatedInput,
    /// A string's declared length is non-positive or runs past the input.
    #[error("bad string length")]
    BadStringLength,
    /// A nested array did not end on a 0x00 terminator byte.
    #[error("invalid array terminator byte")]
    InvalidArrayTerminator,
    /// A BSON type with no JSON representation (binary, regex, timestamp,
    /// code, symbol, decimal128, db-pointer, min/max key).
    #[error("BSON type {0:#04x} is incompatible with JSON")]
    UnsupportedType(u8),
    /// A type byte outside the known BSON set.
    #[error("unknown BSON type {0:#04x}")]
    UnknownType(u8),
    /// The allocator refused to grow the output buffer.
    #[error("output allocation failure")]
    OutOfMemory,
    /// A fixed-capacity output buffer cannot hold a single non-splittable
    /// value.
    #[error("output buffer too small for value")]
    BufferTooSmall,
    /// An element name without a NUL terminator before end of input.
    #[error("unterminated element name")]
    UnterminatedName,
    /// Documents nested beyond the supported depth.
    #[error("documents nested deeper than {}", crate::transcoder::MAX_DEPTH)]
    NestingTooDeep,
    /// The consumer abandoned a chunked run before it finished.
    #[error("consumer dropped before transcoding finished")]
    Cancelled,
}
