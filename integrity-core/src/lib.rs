//! Integrity Core Library
//!
//! Computes the integrity digest of an object stored with erasure-coded
//! redundancy. This crate provides:
//! - Segmentation of a stream, buffer or file into fixed-size segments
//! - Reed-Solomon encoding of each segment into data + parity shards
//! - Blake3 checksums of every segment and shard, folded into root hashes
//! - Serial, parallel and incremental computation with identical results
//!
//! The result holds `total_shards + 1` roots: the primary copy first, then
//! one per shard position.

pub mod assembly;
pub mod checksum;
pub mod compute;
pub mod config;
pub mod erasure;
pub mod error;
pub mod hasher;
pub mod parallel;
pub mod segment;
pub mod serial;

pub use assembly::{HashAccumulator, IntegrityResult};
pub use checksum::{checksum, root_hash, Checksum};
pub use compute::{
    compute_hash_from_buffer, compute_hash_from_file, compute_hash_from_file_with_strategy,
    compute_integrity_hash, compute_integrity_hash_parallel, compute_integrity_hash_serial,
};
pub use config::{HashConfig, Strategy};
pub use erasure::{ErasureConfig, ErasureEncoder, SegmentCodec, ShardData};
pub use error::{IntegrityError, Result};
pub use hasher::IntegrityHasher;
pub use segment::{hash_segment, validate_segment_size, Segment, SegmentHashes, SegmentReader};

use serde::{Deserialize, Serialize};

/// Default erasure coding configuration
/// - 4 data shards: minimum required to reconstruct
/// - 2 parity shards: can tolerate 2 lost shards
pub const DEFAULT_DATA_SHARDS: usize = 4;
pub const DEFAULT_PARITY_SHARDS: usize = 2;

/// Reed-Solomon over GF(2^8) supports at most 256 shards
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Segment size constants
pub const DEFAULT_SEGMENT_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// How the redundant copies of an object are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedundancyType {
    /// Full copies of the object
    Replica,
    /// Reed-Solomon shards of each segment
    ErasureCoded,
}

impl std::fmt::Display for RedundancyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedundancyType::Replica => write!(f, "replica"),
            RedundancyType::ErasureCoded => write!(f, "erasure_coded"),
        }
    }
}
