//! Per-computation parameters

use crate::erasure::ErasureConfig;
use crate::error::{IntegrityError, Result};
use crate::DEFAULT_SEGMENT_SIZE;
use serde::{Deserialize, Serialize};

/// Segment size and shard layout for one integrity computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashConfig {
    /// Size of every segment except possibly the last (bytes)
    pub segment_size: usize,
    /// Shard layout
    pub erasure: ErasureConfig,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            erasure: ErasureConfig::default(),
        }
    }
}

impl HashConfig {
    /// Create a validated config
    pub fn new(segment_size: usize, data_shards: usize, parity_shards: usize) -> Result<Self> {
        let config = Self {
            segment_size,
            erasure: ErasureConfig {
                data_shards,
                parity_shards,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check segment size and shard layout
    pub fn validate(&self) -> Result<()> {
        if self.segment_size == 0 {
            return Err(IntegrityError::Configuration(
                "segment_size must be > 0".to_string(),
            ));
        }
        self.erasure.validate()
    }

    /// Total number of shards per segment
    pub fn total_shards(&self) -> usize {
        self.erasure.total_shards()
    }

    /// Number of segments a stream of `content_length` bytes splits into
    pub fn segment_count(&self, content_length: u64) -> u64 {
        content_length.div_ceil(self.segment_size as u64)
    }
}

/// Execution strategy for bulk computations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single thread, segment by segment
    Serial,
    /// Sequential reads, hashing fanned out to a worker pool
    #[default]
    Parallel,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Serial => write!(f, "serial"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}
