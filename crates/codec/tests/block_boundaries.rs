//! Block-boundary scanning against streams with more than one deflate block.
//!
//! Sync flushes force the encoder to close the current block and emit an
//! empty stored block, so a flushed stream is guaranteed to contain several
//! blocks for the scanner to pause at.

use std::io::Write;

use codec::gzip;
use codec::{BlockScanner, ScanError};
use flate2::write::DeflateEncoder;

fn multi_block_payload(parts: &[&[u8]]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), gzip::clamp_level(6));
    for part in parts {
        encoder.write_all(part).expect("write part");
        encoder.flush().expect("sync flush");
    }
    encoder.finish().expect("finish stream")
}

#[test]
fn flushed_stream_reports_multiple_boundaries() {
    let payload = multi_block_payload(&[b"first part", b"second part", b"third part"]);

    let mut scanner = BlockScanner::new(&payload).expect("init");
    let mut boundaries = 0usize;
    loop {
        let boundary = scanner.step().expect("step");
        if boundary.end_of_stream {
            assert_eq!(boundary.consumed, payload.len());
            break;
        }
        boundaries += 1;
        assert!(boundary.consumed <= payload.len());
        assert!(boundary.intra_byte_bits <= 7);
        assert!(boundaries < 10_000, "scanner failed to make progress");
    }
    assert!(
        boundaries >= 2,
        "expected several block boundaries, saw {boundaries}"
    );
}

#[test]
fn sync_flush_boundaries_are_byte_aligned() {
    // A sync flush ends on the empty stored block's byte boundary, so at
    // least one reported boundary must be byte-aligned.
    let payload = multi_block_payload(&[b"some data worth flushing"]);

    let mut scanner = BlockScanner::new(&payload).expect("init");
    let mut saw_aligned = false;
    loop {
        let boundary = scanner.step().expect("step");
        if boundary.end_of_stream {
            break;
        }
        if boundary.intra_byte_bits == 0 {
            saw_aligned = true;
        }
    }
    assert!(saw_aligned);
}

#[test]
fn scan_positions_are_deterministic() {
    let payload = multi_block_payload(&[b"alpha", b"beta", b"gamma"]);

    let collect = || {
        let mut scanner = BlockScanner::new(&payload).expect("init");
        let mut seen = Vec::new();
        loop {
            let boundary = scanner.step().expect("step");
            seen.push(boundary);
            if boundary.end_of_stream {
                break;
            }
        }
        seen
    };

    assert_eq!(collect(), collect());
}

#[test]
fn garbage_input_reports_corruption_not_panic() {
    let garbage = [0x07u8, 0xde, 0xad, 0xbe, 0xef];
    let mut scanner = BlockScanner::new(&garbage).expect("init");
    match scanner.step() {
        Err(ScanError::Corrupt { .. } | ScanError::Truncated) => {}
        other => panic!("garbage input must fail cleanly, got {other:?}"),
    }
}

#[test]
fn gzip_round_trip_across_levels() {
    let data: Vec<u8> = (0u32..2048)
        .flat_map(|i| (i % 251).to_le_bytes())
        .collect();
    for level in 0..=9 {
        let body = gzip::compress(&data, level).expect("compress");
        assert_eq!(gzip::decompress(&body).expect("decompress"), data);
    }
}
