//! Bulk entry points
//!
//! One call computes one complete result from a fresh source:
//! - `compute_integrity_hash`: any reader, serial or parallel
//! - `compute_hash_from_file`: a local file, parallel
//! - `compute_hash_from_file_with_strategy`: a local file, serial or parallel
//! - `compute_hash_from_buffer`: an in-memory buffer, parallel

use crate::assembly::IntegrityResult;
use crate::config::{HashConfig, Strategy};
use crate::erasure::ErasureEncoder;
use crate::error::Result;
use crate::{parallel, serial};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{error, instrument};

/// Compute the integrity hashes of a stream with the chosen strategy
#[instrument(skip(reader), fields(segment_size = config.segment_size, total_shards = config.total_shards()))]
pub fn compute_integrity_hash<R: Read>(
    reader: R,
    config: &HashConfig,
    strategy: Strategy,
) -> Result<IntegrityResult> {
    match strategy {
        Strategy::Serial => compute_integrity_hash_serial(reader, config),
        Strategy::Parallel => compute_integrity_hash_parallel(reader, config),
    }
}

/// Split the stream into segments, encode and hash them on the calling thread
pub fn compute_integrity_hash_serial<R: Read>(
    reader: R,
    config: &HashConfig,
) -> Result<IntegrityResult> {
    config.validate()?;
    let codec = ErasureEncoder::with_config(config.erasure)?;
    serial::hash_stream(reader, &codec, config.segment_size)
}

/// Split the stream into segments and encode and hash them on a worker pool
pub fn compute_integrity_hash_parallel<R: Read>(
    reader: R,
    config: &HashConfig,
) -> Result<IntegrityResult> {
    config.validate()?;
    let codec = ErasureEncoder::with_config(config.erasure)?;
    parallel::hash_stream(reader, &codec, config.segment_size)
}

/// Open a file read-only and compute its integrity hashes in parallel
pub fn compute_hash_from_file<P: AsRef<Path>>(
    path: P,
    config: &HashConfig,
) -> Result<IntegrityResult> {
    compute_hash_from_file_with_strategy(path, config, Strategy::Parallel)
}

/// Open a file read-only and compute its integrity hashes with the chosen strategy
#[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
pub fn compute_hash_from_file_with_strategy<P: AsRef<Path>>(
    path: P,
    config: &HashConfig,
    strategy: Strategy,
) -> Result<IntegrityResult> {
    let file = File::open(path.as_ref()).inspect_err(|e| {
        error!(error = %e, "Failed to open file");
    })?;

    // File is closed when dropped, on success and error alike
    compute_integrity_hash(file, config, strategy)
}

/// Compute the integrity hashes of an in-memory buffer in parallel
pub fn compute_hash_from_buffer(content: &[u8], config: &HashConfig) -> Result<IntegrityResult> {
    compute_integrity_hash(Cursor::new(content), config, Strategy::Parallel)
}
