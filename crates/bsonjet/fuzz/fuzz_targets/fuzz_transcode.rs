//! Arbitrary bytes must never panic or read out of bounds, successful output
//! must be valid JSON, and the chunked regime must agree with the contiguous
//! one byte-for-byte.
#![no_main]

use libfuzzer_sys::fuzz_target;

use bsonjet::{transcode, transcode_chunked, IsaTier, TranscodeOptions};

fuzz_target!(|data: &[u8]| {
    for is_array in [false, true] {
        let reference = transcode(
            data,
            &TranscodeOptions {
                is_array,
                isa: Some(IsaTier::Scalar),
                ..Default::default()
            },
        );

        // Every supported tier agrees with the scalar reference.
        for tier in [IsaTier::Sse2, IsaTier::Sse42, IsaTier::Avx2] {
            if !tier.is_supported() {
                continue;
            }
            let out = transcode(
                data,
                &TranscodeOptions {
                    is_array,
                    isa: Some(tier),
                    ..Default::default()
                },
            );
            assert_eq!(out, reference);
        }

        match &reference {
            Ok(json) => {
                serde_json::from_slice::<serde_json::Value>(json).expect("output must parse");

                // Chunk concatenation equals the contiguous output. The
                // capacity must cover the largest single value window.
                let chunked = transcode_chunked(
                    data.to_vec(),
                    &TranscodeOptions {
                        is_array,
                        chunk_size: 160,
                        ..Default::default()
                    },
                );
                let mut collected = Vec::new();
                for chunk in chunked {
                    collected.extend_from_slice(&chunk.expect("chunked run must agree"));
                }
                assert_eq!(&collected, json);
            }
            Err(_) => {
                // Errors are fine; they just must be reported, not panicked.
            }
        }
    }
});
