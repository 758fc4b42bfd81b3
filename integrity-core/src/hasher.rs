//! Incremental integrity hasher
//!
//! Accepts data in arbitrary chunks (each at most one segment long),
//! re-segments it to the fixed segment size and hashes every full segment as
//! soon as it is complete. Only the partial tail is buffered between calls.
//!
//! Lifecycle: `init` -> `append`* -> `finish`, then `init` again to reuse.

use crate::assembly::{HashAccumulator, IntegrityResult};
use crate::config::HashConfig;
use crate::erasure::{ErasureEncoder, SegmentCodec};
use crate::error::{IntegrityError, Result};
use crate::segment::{hash_segment, validate_segment_size};
use tracing::debug;

/// Stateful integrity hasher fed through repeated `append` calls
pub struct IntegrityHasher<C = ErasureEncoder> {
    codec: C,
    segment_size: usize,
    /// Pending bytes, always shorter than `segment_size` between calls
    buffer: Vec<u8>,
    accumulator: HashAccumulator,
    finished: bool,
}

impl IntegrityHasher<ErasureEncoder> {
    /// Create a hasher using Reed-Solomon encoding with the given layout
    pub fn new(config: HashConfig) -> Result<Self> {
        config.validate()?;
        let codec = ErasureEncoder::with_config(config.erasure)?;
        Self::with_codec(codec, config.segment_size)
    }
}

impl<C: SegmentCodec> IntegrityHasher<C> {
    /// Create a hasher over a custom codec. The hasher starts initialized.
    pub fn with_codec(codec: C, segment_size: usize) -> Result<Self> {
        validate_segment_size(segment_size)?;
        let accumulator = HashAccumulator::new(codec.total_shards());
        Ok(Self {
            codec,
            segment_size,
            buffer: Vec::new(),
            accumulator,
            finished: false,
        })
    }

    /// Reset buffer, accumulated hashes and content length
    pub fn init(&mut self) {
        self.buffer.clear();
        self.accumulator = HashAccumulator::new(self.codec.total_shards());
        self.finished = false;
    }

    /// Feed the next chunk of content.
    ///
    /// A chunk may not exceed the segment size. When the buffered bytes
    /// reach a full segment, that segment is hashed immediately and the
    /// excess is kept as the new buffer. If hashing fails, the buffer is
    /// restored to its content before the call.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if self.finished {
            return Err(IntegrityError::HasherFinished);
        }
        if data.len() > self.segment_size {
            return Err(IntegrityError::InputTooLarge {
                size: data.len(),
                max: self.segment_size,
            });
        }
        if self.buffer.len() >= self.segment_size {
            return Err(IntegrityError::BufferOverflow {
                buffered: self.buffer.len(),
                max: self.segment_size,
            });
        }

        let needed = self.segment_size - self.buffer.len();
        if data.len() < needed {
            self.buffer.extend_from_slice(data);
            return Ok(());
        }

        let origin_len = self.buffer.len();
        self.buffer.extend_from_slice(&data[..needed]);
        if let Err(e) = self.hash_buffer() {
            self.buffer.truncate(origin_len);
            return Err(e);
        }

        // Excess is shorter than a segment since data.len() <= segment_size
        self.buffer.extend_from_slice(&data[needed..]);
        Ok(())
    }

    /// Hash any remaining partial segment and assemble the root hashes.
    ///
    /// Terminal for this cycle: call `init` before feeding more data.
    pub fn finish(&mut self) -> Result<IntegrityResult> {
        if self.finished {
            return Err(IntegrityError::HasherFinished);
        }
        if !self.buffer.is_empty() {
            self.hash_buffer()?;
        }
        self.finished = true;

        debug!(
            segments = self.accumulator.segment_count(),
            content_length = self.accumulator.content_length(),
            shards = self.accumulator.total_shards(),
            "Finished incremental integrity hash"
        );

        Ok(self.accumulator.assemble())
    }

    /// Bytes waiting for a full segment
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes hashed so far (excludes the buffer)
    pub fn content_length(&self) -> u64 {
        self.accumulator.content_length()
    }

    /// Segments hashed so far
    pub fn segment_count(&self) -> usize {
        self.accumulator.segment_count()
    }

    /// Per-segment checksums accumulated so far
    pub fn accumulator(&self) -> &HashAccumulator {
        &self.accumulator
    }

    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Hash the buffer as one segment. Leaves buffer and accumulator
    /// untouched on failure.
    fn hash_buffer(&mut self) -> Result<()> {
        let hashes = hash_segment(&self.codec, &self.buffer)?;
        self.accumulator.push(hashes, self.buffer.len());
        self.buffer.clear();
        Ok(())
    }
}
