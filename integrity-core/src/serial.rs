//! Serial bulk orchestrator
//!
//! Reads and hashes one segment at a time on the calling thread. This is the
//! baseline the parallel orchestrator must match byte for byte.

use crate::assembly::{HashAccumulator, IntegrityResult};
use crate::erasure::SegmentCodec;
use crate::error::Result;
use crate::segment::{hash_segment, validate_segment_size, SegmentReader};
use std::io::Read;
use tracing::debug;

/// Hash a stream segment by segment in read order
pub fn hash_stream<R, C>(reader: R, codec: &C, segment_size: usize) -> Result<IntegrityResult>
where
    R: Read,
    C: SegmentCodec + ?Sized,
{
    validate_segment_size(segment_size)?;
    let mut segments = SegmentReader::new(reader, segment_size);
    let mut accumulator = HashAccumulator::new(codec.total_shards());

    for segment in segments.by_ref() {
        let segment = segment?;
        let hashes = hash_segment(codec, &segment.data)?;
        accumulator.push(hashes, segment.data.len());
    }

    debug_assert_eq!(accumulator.content_length(), segments.bytes_read());
    debug!(
        segments = accumulator.segment_count(),
        content_length = accumulator.content_length(),
        "Computed integrity hash serially"
    );

    Ok(accumulator.assemble())
}
