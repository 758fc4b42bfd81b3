//! Segments and per-segment hashing
//!
//! A segment is the unit of erasure encoding. Hashing one segment yields its
//! own checksum plus one checksum per shard position.

use crate::checksum::{checksum, Checksum};
use crate::erasure::SegmentCodec;
use crate::error::{IntegrityError, Result};
use crate::DEFAULT_SEGMENT_SIZE;
use std::io::Read;
use tracing::error;

/// Reject a zero segment size, which would turn any input into empty content
pub fn validate_segment_size(segment_size: usize) -> Result<()> {
    if segment_size == 0 {
        return Err(IntegrityError::Configuration(
            "segment_size must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Hashes of one segment and of each of its shards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHashes {
    /// Checksum of the raw segment bytes
    pub checksum: Checksum,
    /// Checksum of each shard, in shard-position order
    pub shard_checksums: Vec<Checksum>,
}

/// Checksum a segment, erasure-encode it and checksum every shard.
///
/// Pure: safe to call concurrently for different segments.
pub fn hash_segment<C>(codec: &C, segment: &[u8]) -> Result<SegmentHashes>
where
    C: SegmentCodec + ?Sized,
{
    let segment_checksum = checksum(segment);

    let shards = codec.encode_segment(segment)?;
    if shards.len() != codec.total_shards() {
        return Err(IntegrityError::Encode(format!(
            "codec produced {} shards, expected {}",
            shards.len(),
            codec.total_shards()
        )));
    }

    let shard_checksums = shards.iter().map(|shard| checksum(&shard.data)).collect();

    Ok(SegmentHashes {
        checksum: segment_checksum,
        shard_checksums,
    })
}

/// A segment read from a source, tagged with its position in the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based, strictly increasing in read order
    pub id: u64,
    pub data: Vec<u8>,
}

/// Splits a reader into segments of `segment_size` bytes.
///
/// Each segment is filled completely before it is yielded, so only the last
/// one may be short. Empty input produces no segments. A read error ends the
/// iteration after it is yielded.
pub struct SegmentReader<R> {
    reader: R,
    segment_size: usize,
    next_id: u64,
    bytes_read: u64,
    done: bool,
}

impl<R: Read> SegmentReader<R> {
    /// Create a new segment reader
    pub fn new(reader: R, segment_size: usize) -> Self {
        Self {
            reader,
            segment_size,
            next_id: 0,
            bytes_read: 0,
            done: false,
        }
    }

    /// Total bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of segments yielded so far
    pub fn segments_read(&self) -> u64 {
        self.next_id
    }

    fn fill_segment(&mut self) -> std::io::Result<Vec<u8>> {
        // Capacity follows the bytes actually read, not the configured size.
        // read_to_end retries Interrupted and stops at segment_size or EOF.
        let mut buf = Vec::with_capacity(self.segment_size.min(DEFAULT_SEGMENT_SIZE));
        self.reader
            .by_ref()
            .take(self.segment_size as u64)
            .read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read> Iterator for SegmentReader<R> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.fill_segment() {
            Ok(data) if data.is_empty() => {
                self.done = true;
                None
            }
            Ok(data) => {
                let id = self.next_id;
                self.next_id += 1;
                self.bytes_read += data.len() as u64;
                Some(Ok(Segment { id, data }))
            }
            Err(e) => {
                self.done = true;
                error!(
                    segment_id = self.next_id,
                    error = %e,
                    "Failed to read content"
                );
                Some(Err(IntegrityError::SourceRead(e)))
            }
        }
    }
}
