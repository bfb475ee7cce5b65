//! JSON string escaping over raw input bytes.
//!
//! Two entry points feed the output sink under ECMA-404 §9 string rules:
//!
//! - [`escape_n`]: copy an exact byte count (length-prefixed BSON strings,
//!   which may contain interior NULs).
//! - [`escape_cstr`]: copy up to, but not including, the next NUL (element
//!   names); the cursor is left on the terminator.
//!
//! A byte passes through verbatim iff it is `>= 0x20` and is neither `"` nor
//! `\`. The short escapes `\b \t \n \f \r \" \\` cover their usual bytes and
//! every other control byte becomes a six-byte `\u00xx` with lowercase hex.
//! Bytes `>= 0x80` are never escaped, so multi-byte UTF-8 sequences pass
//! through unchanged; the input is not validated as UTF-8.
//!
//! Each SIMD tier scans whole 16- or 32-byte blocks for the escape predicate
//! `c < 0x20 || c == 0x22 || c == 0x5c` and bulk-copies the clean prefix.
//! Blocks are only taken while a full block lies inside the input slice and
//! the output has room for a full block store; the scalar loop finishes every
//! tail. All tiers produce byte-identical output.

#[cfg(target_arch = "x86_64")]
mod x86;

use crate::error::TranscodeError;
use crate::input::Input;
use crate::isa::IsaTier;
use crate::output::Sink;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// The short-escape substitute for `c`, if it has one.
#[inline]
fn single_escape(c: u8) -> Option<u8> {
    match c {
        0x08 => Some(b'b'),
        0x09 => Some(b't'),
        0x0a => Some(b'n'),
        0x0c => Some(b'f'),
        0x0d => Some(b'r'),
        0x22 | 0x5c => Some(c),
        _ => None,
    }
}

#[inline]
fn needs_escape(c: u8) -> bool {
    c < 0x20 || c == 0x22 || c == 0x5c
}

/// Writes the escape sequence for one byte that failed the verbatim test.
fn write_escape<S: Sink>(sink: &mut S, c: u8) -> Result<(), TranscodeError> {
    if let Some(sub) = single_escape(c) {
        sink.ensure(2)?;
        sink.push(b'\\');
        sink.push(sub);
    } else {
        sink.ensure(6)?;
        sink.push(b'\\');
        sink.push(b'u');
        sink.push(b'0');
        sink.push(b'0');
        sink.push(HEX_DIGITS[usize::from(c >> 4)]);
        sink.push(HEX_DIGITS[usize::from(c & 0xf)]);
    }
    Ok(())
}

/// Per-tier whole-block scanner.
///
/// Implementations report the lane index of the first byte matching the
/// escape predicate (NUL included, since `0x00 < 0x20`), or at least `WIDTH`
/// when the block is clean.
#[cfg(target_arch = "x86_64")]
trait BlockScan {
    const WIDTH: usize;

    /// # Safety
    ///
    /// `WIDTH` bytes must be readable at `ptr` and the CPU features backing
    /// the implementation must be present.
    unsafe fn first_escape(ptr: *const u8) -> usize;
}

/// Escapes exactly `n` input bytes. The caller has verified `n` bytes remain.
pub(crate) fn escape_n<S: Sink>(
    input: &mut Input<'_>,
    sink: &mut S,
    tier: IsaTier,
    n: usize,
) -> Result<(), TranscodeError> {
    debug_assert!(n <= input.remaining());
    #[cfg(target_arch = "x86_64")]
    let n = match tier {
        IsaTier::Scalar => n,
        IsaTier::Sse2 => escape_n_blocks::<S, x86::Sse2Scan>(input, sink, n)?,
        IsaTier::Sse42 => escape_n_blocks::<S, x86::Sse42Scan>(input, sink, n)?,
        IsaTier::Avx2 => escape_n_blocks::<S, x86::Avx2Scan>(input, sink, n)?,
    };
    #[cfg(not(target_arch = "x86_64"))]
    let _ = tier;
    escape_n_scalar(input, sink, n)
}

/// Escapes bytes up to the next NUL, leaving the cursor on it.
///
/// Fails with [`TranscodeError::UnterminatedName`] if the input ends first.
pub(crate) fn escape_cstr<S: Sink>(
    input: &mut Input<'_>,
    sink: &mut S,
    tier: IsaTier,
) -> Result<(), TranscodeError> {
    #[cfg(target_arch = "x86_64")]
    {
        let hit_nul = match tier {
            IsaTier::Scalar => false,
            IsaTier::Sse2 => escape_cstr_blocks::<S, x86::Sse2Scan>(input, sink)?,
            IsaTier::Sse42 => escape_cstr_blocks::<S, x86::Sse42Scan>(input, sink)?,
            IsaTier::Avx2 => escape_cstr_blocks::<S, x86::Avx2Scan>(input, sink)?,
        };
        if hit_nul {
            return Ok(());
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = tier;
    escape_cstr_scalar(input, sink)
}

fn escape_n_scalar<S: Sink>(
    input: &mut Input<'_>,
    sink: &mut S,
    n: usize,
) -> Result<(), TranscodeError> {
    let end = input.idx() + n;
    while input.idx() < end {
        let c = input.data()[input.idx()];
        input.advance(1);
        if !needs_escape(c) {
            sink.ensure(1)?;
            sink.push(c);
        } else {
            write_escape(sink, c)?;
        }
    }
    Ok(())
}

fn escape_cstr_scalar<S: Sink>(input: &mut Input<'_>, sink: &mut S) -> Result<(), TranscodeError> {
    loop {
        let c = input.peek().ok_or(TranscodeError::UnterminatedName)?;
        if c == 0 {
            return Ok(());
        }
        input.advance(1);
        if !needs_escape(c) {
            sink.ensure(1)?;
            sink.push(c);
        } else {
            write_escape(sink, c)?;
        }
    }
}

/// Block-copies the clean prefix of each whole block, handling one escape
/// byte per round, until fewer than `WIDTH` bytes remain. Returns the
/// leftover count for the scalar tail.
#[cfg(target_arch = "x86_64")]
fn escape_n_blocks<S: Sink, B: BlockScan>(
    input: &mut Input<'_>,
    sink: &mut S,
    mut n: usize,
) -> Result<usize, TranscodeError> {
    while n >= B::WIDTH {
        if sink.idx() + B::WIDTH > sink.capacity() {
            if B::WIDTH > sink.capacity() {
                // The buffer can never hold a block store; scalar handles it.
                return Ok(n);
            }
            sink.ensure(B::WIDTH)?;
        }
        // SAFETY: `n >= WIDTH` bytes remain past the cursor, and the tier was
        // verified against the CPU when it was selected.
        let clean = unsafe { B::first_escape(input.as_ptr()) }.min(B::WIDTH);
        let (i, o) = (input.idx(), sink.idx());
        // Store the whole block; only the clean prefix is claimed by the
        // cursors, so trailing garbage is overwritten by the next write.
        sink.buf_mut()[o..o + B::WIDTH].copy_from_slice(&input.data()[i..i + B::WIDTH]);
        input.advance(clean);
        sink.set_idx(o + clean);
        n -= clean;
        if clean < B::WIDTH {
            let c = input.data()[input.idx()];
            input.advance(1);
            n -= 1;
            write_escape(sink, c)?;
        }
    }
    Ok(n)
}

/// Like [`escape_n_blocks`] but NUL-terminated. Returns `true` when the
/// terminator was found (cursor left on it); `false` leaves the tail to the
/// scalar loop.
#[cfg(target_arch = "x86_64")]
fn escape_cstr_blocks<S: Sink, B: BlockScan>(
    input: &mut Input<'_>,
    sink: &mut S,
) -> Result<bool, TranscodeError> {
    while input.remaining() >= B::WIDTH {
        if sink.idx() + B::WIDTH > sink.capacity() {
            if B::WIDTH > sink.capacity() {
                return Ok(false);
            }
            sink.ensure(B::WIDTH)?;
        }
        // SAFETY: a whole block remains past the cursor; the tier was
        // verified against the CPU when it was selected.
        let clean = unsafe { B::first_escape(input.as_ptr()) }.min(B::WIDTH);
        let (i, o) = (input.idx(), sink.idx());
        sink.buf_mut()[o..o + B::WIDTH].copy_from_slice(&input.data()[i..i + B::WIDTH]);
        input.advance(clean);
        sink.set_idx(o + clean);
        if clean < B::WIDTH {
            let c = input.data()[input.idx()];
            if c == 0 {
                return Ok(true);
            }
            input.advance(1);
            write_escape(sink, c)?;
        }
    }
    Ok(false)
}
