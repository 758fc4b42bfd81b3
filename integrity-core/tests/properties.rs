//! Property tests for integrity hashing
//!
//! Serial, parallel and incremental computation must agree for any content,
//! segment size and shard layout.
//!
//! Run with: cargo test --package integrity-core --test properties

use integrity_core::parallel::hash_stream_with_workers;
use integrity_core::{
    compute_integrity_hash, ErasureConfig, ErasureEncoder, HashConfig, IntegrityHasher, Strategy,
};
use proptest::prelude::*;
use std::io::Cursor;

fn layout() -> impl proptest::strategy::Strategy<Value = (usize, usize)> {
    (1usize..6, 0usize..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Serial and parallel strategies produce identical results
    #[test]
    fn strategy_equivalence(
        content in prop::collection::vec(any::<u8>(), 0..2048),
        segment_size in 1usize..200,
        (data_shards, parity_shards) in layout(),
        workers in 1usize..6,
    ) {
        let config = HashConfig::new(segment_size, data_shards, parity_shards).unwrap();
        let codec = ErasureEncoder::with_config(config.erasure).unwrap();

        let serial = compute_integrity_hash(Cursor::new(&content), &config, Strategy::Serial).unwrap();
        let parallel = hash_stream_with_workers(Cursor::new(&content), &codec, segment_size, workers).unwrap();

        prop_assert_eq!(&serial, &parallel);
        prop_assert_eq!(serial.content_length, content.len() as u64);
        prop_assert_eq!(serial.integrity_hashes.len(), data_shards + parity_shards + 1);
    }

    /// Splitting the input differently does not change the incremental result
    #[test]
    fn chunking_invariance(
        content in prop::collection::vec(any::<u8>(), 0..1024),
        segment_size in 1usize..64,
        splits in prop::collection::vec(1usize..64, 1..32),
    ) {
        let config = HashConfig::new(segment_size, 2, 1).unwrap();

        let mut whole = IntegrityHasher::new(config).unwrap();
        for chunk in content.chunks(segment_size) {
            whole.append(chunk).unwrap();
        }
        let expected = whole.finish().unwrap();

        let mut pieces = IntegrityHasher::new(config).unwrap();
        let mut offset = 0;
        let mut split = splits.iter().cycle();
        while offset < content.len() {
            let step = split.next().copied().unwrap_or(1).min(segment_size);
            let end = (offset + step).min(content.len());
            pieces.append(&content[offset..end]).unwrap();
            prop_assert!(pieces.buffered().len() < segment_size);
            offset = end;
        }
        let actual = pieces.finish().unwrap();

        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(actual.content_length, content.len() as u64);
    }

    /// The incremental hasher agrees with the bulk orchestrators
    #[test]
    fn incremental_matches_bulk(
        content in prop::collection::vec(any::<u8>(), 0..1024),
        segment_size in 1usize..128,
        (data_shards, parity_shards) in layout(),
    ) {
        let config = HashConfig::new(segment_size, data_shards, parity_shards).unwrap();

        let mut hasher = IntegrityHasher::new(config).unwrap();
        for chunk in content.chunks(segment_size.div_ceil(3)) {
            hasher.append(chunk).unwrap();
        }
        let incremental = hasher.finish().unwrap();
        let bulk = compute_integrity_hash(Cursor::new(&content), &config, Strategy::Parallel).unwrap();

        prop_assert_eq!(incremental, bulk);
    }
}

#[test]
fn zero_parity_layout_is_supported() {
    let config = HashConfig {
        segment_size: 8,
        erasure: ErasureConfig::new(3, 0).unwrap(),
    };
    let content = b"zero parity shards still hash";

    let serial = compute_integrity_hash(Cursor::new(content), &config, Strategy::Serial).unwrap();
    let parallel =
        compute_integrity_hash(Cursor::new(content), &config, Strategy::Parallel).unwrap();

    assert_eq!(serial, parallel);
    assert_eq!(serial.integrity_hashes.len(), 4);
}
