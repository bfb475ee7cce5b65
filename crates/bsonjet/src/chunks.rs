//! On-demand chunked output: a producer thread fills one fixed-capacity
//! buffer, the consuming iterator drains it.
//!
//! Protocol
//! - The shared write cursor is seeded with the sentinel `capacity + 1`
//!   ("not ready"); the producer waits for it to reach zero before emitting
//!   anything, so the first chunk is produced on demand rather than eagerly.
//! - Each [`Chunks::next`] call copies the filled prefix out, zeroes the
//!   cursor and wakes the producer, then blocks until the producer either
//!   refills the buffer or finishes.
//! - Chunks arrive in document order; their concatenation is byte-for-byte
//!   the contiguous output of [`transcode`](crate::transcode).
//! - A transcode error wakes the consumer with the buffer discarded; the
//!   error is yielded once and iteration ends.
//! - Dropping the iterator mid-run raises a cancelled flag, wakes the
//!   producer (which abandons the run) and joins its thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::TranscodeError;
use crate::isa::IsaTier;
use crate::options::TranscodeOptions;
use crate::output::{HandoffSink, Shared};
use crate::transcoder::{heuristic_capacity, Transcoder};

/// Starts a producer thread transcoding `input` and returns the chunk
/// iterator over its output.
///
/// The producer thread must own its view of the document, so `input` is any
/// owned byte container (`Vec<u8>`, `Arc<[u8]>`, a `'static` slice, …).
/// `options.chunk_size` fixes the chunk capacity; `0` selects the 2.5×
/// heuristic. The capacity bounds the largest single value (see
/// [`TranscodeOptions::chunk_size`]).
///
/// # Examples
///
/// ```rust
/// use bsonjet::{transcode_chunked, TranscodeOptions};
///
/// // {"a": 1}
/// let doc = b"\x0c\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x00".to_vec();
/// let mut json = Vec::new();
/// for chunk in transcode_chunked(doc, &TranscodeOptions::default()) {
///     json.extend_from_slice(&chunk.unwrap());
/// }
/// assert_eq!(json, b"{\"a\":1}");
/// ```
pub fn transcode_chunked<I>(input: I, options: &TranscodeOptions) -> Chunks
where
    I: AsRef<[u8]> + Send + 'static,
{
    let tier = IsaTier::effective(options.isa);
    let capacity = if options.chunk_size == 0 {
        heuristic_capacity(input.as_ref().len())
    } else {
        options.chunk_size
    };
    let is_array = options.is_array;

    let shared = Arc::new(Shared::new(capacity));
    let producer = {
        let shared = Arc::clone(&shared);
        thread::spawn(move || produce(&shared, input.as_ref(), tier, is_array))
    };

    Chunks {
        shared,
        producer: Some(producer),
        finished: false,
    }
}

/// Runs the whole transcode while holding the output lock, releasing it only
/// inside hand-off waits, then records the outcome under the same guard so
/// the consumer can never observe a torn final state.
fn produce(shared: &Shared, input: &[u8], tier: IsaTier, is_array: bool) {
    let mut guard = shared.lock();
    // Start-up barrier: wait out the "not ready" sentinel.
    loop {
        if guard.cancelled {
            return;
        }
        if guard.idx == 0 {
            break;
        }
        guard = shared
            .cv
            .wait(guard)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
    }

    let mut transcoder = Transcoder::new(input, HandoffSink::new(guard, shared), tier);
    let result = transcoder.run(is_array);
    let mut guard = transcoder.into_sink().into_guard();
    match result {
        Ok(()) => guard.done = true,
        Err(err) => {
            // Partial output is void on error.
            guard.idx = 0;
            guard.done = true;
            guard.err = Some(err);
        }
    }
    shared.cv.notify_all();
}

/// Iterator over the chunks of one chunked transcode run.
///
/// Yields each filled buffer in order and terminates after the final chunk;
/// a transcode failure is yielded once as `Err`.
#[derive(Debug)]
pub struct Chunks {
    shared: Arc<Shared>,
    producer: Option<JoinHandle<()>>,
    finished: bool,
}

impl Chunks {
    /// Whether the run has completed (all chunks delivered, or the error
    /// observed).
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.finished
    }

    fn join_producer(&mut self) {
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}

impl Iterator for Chunks {
    type Item = Result<Vec<u8>, TranscodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut guard = self.shared.lock();
        let capacity = guard.buf.len();
        if guard.idx > capacity {
            // First pull: clear the start-up sentinel.
            guard.idx = 0;
        }
        loop {
            if let Some(err) = guard.err.take() {
                self.finished = true;
                drop(guard);
                self.join_producer();
                return Some(Err(err));
            }
            if guard.idx > 0 {
                let chunk = guard.buf[..guard.idx].to_vec();
                guard.idx = 0;
                self.shared.cv.notify_one();
                return Some(Ok(chunk));
            }
            if guard.done {
                self.finished = true;
                drop(guard);
                self.join_producer();
                return None;
            }
            // Buffer drained; let the producer refill it.
            self.shared.cv.notify_one();
            guard = self
                .shared
                .cv
                .wait(guard)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }
}

impl Drop for Chunks {
    fn drop(&mut self) {
        {
            let mut guard = self.shared.lock();
            guard.cancelled = true;
            self.shared.cv.notify_all();
        }
        self.join_producer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode;

    // {"a": 1}
    const INT_DOC: &[u8] = b"\x0c\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x00";

    #[test]
    fn single_chunk_run() {
        let chunks: Vec<_> = transcode_chunked(INT_DOC.to_vec(), &TranscodeOptions::default())
            .map(Result::unwrap)
            .collect();
        assert_eq!(chunks.concat(), b"{\"a\":1}");
    }

    #[test]
    fn tiny_chunks_concatenate() {
        let contiguous = transcode(INT_DOC, &TranscodeOptions::default()).unwrap();
        let options = TranscodeOptions {
            chunk_size: 2,
            ..Default::default()
        };
        let mut collected = Vec::new();
        let mut iter = transcode_chunked(INT_DOC.to_vec(), &options);
        for chunk in &mut iter {
            let chunk = chunk.unwrap();
            assert!(chunk.len() <= 2);
            collected.extend_from_slice(&chunk);
        }
        assert!(iter.is_done());
        assert_eq!(collected, contiguous);
    }

    #[test]
    fn drop_mid_run_does_not_hang() {
        let options = TranscodeOptions {
            chunk_size: 2,
            ..Default::default()
        };
        let mut iter = transcode_chunked(INT_DOC.to_vec(), &options);
        let first = iter.next().unwrap().unwrap();
        assert!(!first.is_empty());
        drop(iter);
    }

    #[test]
    fn drop_before_first_pull_does_not_hang() {
        let iter = transcode_chunked(INT_DOC.to_vec(), &TranscodeOptions::default());
        drop(iter);
    }
}
