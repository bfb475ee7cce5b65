use crate::isa::IsaTier;

/// Configuration for a transcode run.
///
/// # Examples
///
/// ```rust
/// use bsonjet::{IsaTier, TranscodeOptions};
///
/// let options = TranscodeOptions {
///     is_array: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscodeOptions {
    /// Whether the top-level document is emitted as a JSON array (`[…]`)
    /// instead of an object (`{…}`).
    ///
    /// BSON encodes arrays and documents identically; the caller knows which
    /// one the bytes represent.
    ///
    /// # Default
    ///
    /// `false`
    pub is_array: bool,

    /// Output capacity in bytes: the initial capacity of the growable buffer
    /// for [`transcode`](crate::transcode), or the fixed chunk capacity for
    /// [`transcode_chunked`](crate::transcode_chunked).
    ///
    /// `0` selects a heuristic of 2.5× the input length, matched to observed
    /// expansion ratios (ObjectId 1:2.2, null 1:5, most strings ≈ 1:1, dates
    /// 1:3.3, numbers ≤ 1:2.5; mixed data averages ≈ 2.3×).
    ///
    /// In chunked mode the capacity bounds the largest non-splittable value:
    /// 128 bytes for doubles, 26 for ObjectIds and dates. A smaller capacity
    /// fails with [`BufferTooSmall`](crate::TranscodeError::BufferTooSmall)
    /// when such a value is reached.
    ///
    /// # Default
    ///
    /// `0`
    pub chunk_size: usize,

    /// Overrides the auto-detected instruction-set tier.
    ///
    /// Intended for testing tier equivalence; a requested tier the host CPU
    /// does not support is clamped down to the best supported one.
    ///
    /// # Default
    ///
    /// `None` (auto-detect)
    pub isa: Option<IsaTier>,
}
