//! Output buffer management for the two flow-control regimes.
//!
//! A [`Sink`] owns the write cursor and answers `ensure(n)` requests from the
//! walker and the value writers:
//!
//! - [`GrowSink`] reallocates on demand. It keeps [`OUT_SLACK`] bytes of
//!   trailing headroom past every guarantee so whole SIMD blocks can be
//!   stored at the cursor without further checks; `idx` stays the
//!   authoritative length and the vector is truncated to it at the end.
//! - [`HandoffSink`] wraps a fixed-capacity buffer shared with a consumer
//!   thread. It holds the mutex guard for the whole production run and
//!   releases it only inside condition-variable waits, so exactly one side
//!   makes progress at any time. When space runs out it signals the consumer
//!   and blocks until the buffer is drained (`idx == 0`) or the run is
//!   cancelled.
//!
//! Invariants
//! - `idx <= capacity()` at every suspension point.
//! - After `ensure(n)` returns `Ok`, `n` bytes are writable at `idx`.
//! - A value larger than a fixed buffer's whole capacity can never be
//!   written; `ensure` reports [`TranscodeError::BufferTooSmall`].

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::TranscodeError;

/// Trailing headroom kept past every growable-buffer guarantee, sized to the
/// widest SIMD block store.
pub(crate) const OUT_SLACK: usize = 32;

pub(crate) trait Sink {
    /// Guarantees `n` writable bytes past the cursor, growing or suspending
    /// as the regime dictates.
    fn ensure(&mut self, n: usize) -> Result<(), TranscodeError>;

    fn idx(&self) -> usize;

    fn set_idx(&mut self, idx: usize);

    /// The whole writable buffer; its length is the current capacity.
    fn buf_mut(&mut self) -> &mut [u8];

    fn capacity(&self) -> usize;

    /// Writes one byte at the cursor. Space must have been ensured.
    #[inline]
    fn push(&mut self, byte: u8) {
        let i = self.idx();
        self.buf_mut()[i] = byte;
        self.set_idx(i + 1);
    }

    /// Copies `bytes` to the cursor. Space must have been ensured.
    #[inline]
    fn extend(&mut self, bytes: &[u8]) {
        let i = self.idx();
        self.buf_mut()[i..i + bytes.len()].copy_from_slice(bytes);
        self.set_idx(i + bytes.len());
    }
}

/// Owned, reallocating output buffer.
#[derive(Debug)]
pub(crate) struct GrowSink {
    buf: Vec<u8>,
    idx: usize,
}

impl GrowSink {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity + OUT_SLACK],
            idx: 0,
        }
    }

    /// Consumes the sink, truncating to the written length.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.buf.truncate(self.idx);
        self.buf
    }
}

impl Sink for GrowSink {
    fn ensure(&mut self, n: usize) -> Result<(), TranscodeError> {
        let needed = self.idx + n + OUT_SLACK;
        if needed <= self.buf.len() {
            return Ok(());
        }
        let target = std::cmp::max(self.buf.len() + self.buf.len() / 2, needed);
        self.buf
            .try_reserve_exact(target - self.buf.len())
            .map_err(|_| TranscodeError::OutOfMemory)?;
        self.buf.resize(target, 0);
        Ok(())
    }

    #[inline]
    fn idx(&self) -> usize {
        self.idx
    }

    #[inline]
    fn set_idx(&mut self, idx: usize) {
        self.idx = idx;
    }

    #[inline]
    fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

/// Output state shared between the producer and consumer threads in chunked
/// mode. Only these fields cross threads, behind [`Shared::state`].
#[derive(Debug)]
pub(crate) struct OutState {
    pub(crate) buf: Vec<u8>,
    pub(crate) idx: usize,
    pub(crate) done: bool,
    pub(crate) cancelled: bool,
    pub(crate) err: Option<TranscodeError>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: Mutex<OutState>,
    pub(crate) cv: Condvar,
}

impl Shared {
    /// Seeds the shared state with the "not ready" start-up sentinel:
    /// `idx == capacity + 1` until the consumer's first pull zeroes it.
    pub(crate) fn new(capacity: usize) -> Self {
        Shared {
            state: Mutex::new(OutState {
                buf: vec![0; capacity],
                idx: capacity + 1,
                done: false,
                cancelled: false,
                err: None,
            }),
            cv: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, OutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed-capacity sink handing filled buffers to a consumer thread.
///
/// The guard is only ever absent transiently inside [`Sink::ensure`].
pub(crate) struct HandoffSink<'s> {
    guard: Option<MutexGuard<'s, OutState>>,
    shared: &'s Shared,
}

impl<'s> HandoffSink<'s> {
    pub(crate) fn new(guard: MutexGuard<'s, OutState>, shared: &'s Shared) -> Self {
        Self {
            guard: Some(guard),
            shared,
        }
    }

    #[inline]
    fn state(&mut self) -> &mut OutState {
        self.guard.as_mut().expect("output guard held")
    }

    /// Releases the guard for the caller to finalise the run under it.
    pub(crate) fn into_guard(mut self) -> MutexGuard<'s, OutState> {
        self.guard.take().expect("output guard held")
    }
}

impl Sink for HandoffSink<'_> {
    fn ensure(&mut self, n: usize) -> Result<(), TranscodeError> {
        {
            let state = self.state();
            if state.idx + n <= state.buf.len() {
                return Ok(());
            }
            if n > state.buf.len() {
                return Err(TranscodeError::BufferTooSmall);
            }
        }
        // Hand the filled prefix to the consumer, then block until it has
        // been drained. The wait releases the mutex, which is the only point
        // where the consumer can observe the buffer.
        self.shared.cv.notify_one();
        let mut guard = self.guard.take().expect("output guard held");
        loop {
            if guard.cancelled {
                self.guard = Some(guard);
                return Err(TranscodeError::Cancelled);
            }
            if guard.idx == 0 {
                break;
            }
            guard = self
                .shared
                .cv
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.guard = Some(guard);
        Ok(())
    }

    #[inline]
    fn idx(&self) -> usize {
        self.guard.as_ref().expect("output guard held").idx
    }

    #[inline]
    fn set_idx(&mut self, idx: usize) {
        self.state().idx = idx;
    }

    #[inline]
    fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.state().buf
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.guard.as_ref().expect("output guard held").buf.len()
    }
}
