//! Reed-Solomon Erasure Coding
//!
//! Encodes one segment into `data_shards + parity_shards` shards:
//! - The segment is zero-padded to a multiple of `data_shards` and split
//! - Parity shards are computed over the data shards
//! - Shard position `k` is stable across segments
//!
//! Segments are encoded at their true length; a short final segment yields
//! shorter shards, never a segment padded up to the full segment size.

use crate::error::{IntegrityError, Result};
use crate::{DEFAULT_DATA_SHARDS, DEFAULT_PARITY_SHARDS, MAX_TOTAL_SHARDS};
use bytes::Bytes;
use reed_solomon_erasure::galois_8::ReedSolomon;
use serde::{Deserialize, Serialize};

/// Erasure coding configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureConfig {
    /// Number of data shards (k)
    pub data_shards: usize,
    /// Number of parity shards (m), may be zero
    pub parity_shards: usize,
}

impl Default for ErasureConfig {
    fn default() -> Self {
        Self {
            data_shards: DEFAULT_DATA_SHARDS,
            parity_shards: DEFAULT_PARITY_SHARDS,
        }
    }
}

impl ErasureConfig {
    /// Create a new erasure config
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        let config = Self {
            data_shards,
            parity_shards,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the shard layout
    pub fn validate(&self) -> Result<()> {
        if self.data_shards == 0 {
            return Err(IntegrityError::Configuration(
                "data_shards must be > 0".to_string(),
            ));
        }
        if self.total_shards() > MAX_TOTAL_SHARDS {
            return Err(IntegrityError::Configuration(format!(
                "total shards must be <= {}, got {}",
                MAX_TOTAL_SHARDS,
                self.total_shards()
            )));
        }
        Ok(())
    }

    /// Total number of shards
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Storage overhead ratio (parity/data)
    pub fn overhead_ratio(&self) -> f64 {
        self.parity_shards as f64 / self.data_shards as f64
    }

    /// Maximum number of failures that can be tolerated
    pub fn max_failures(&self) -> usize {
        self.parity_shards
    }
}

/// A single shard of an erasure-coded segment
#[derive(Debug, Clone)]
pub struct ShardData {
    /// Shard position (0 to total_shards-1)
    pub index: u8,
    /// Shard data
    pub data: Bytes,
    /// Whether this is a parity shard
    pub is_parity: bool,
}

impl ShardData {
    /// Create a new shard
    pub fn new(index: u8, data: Bytes, is_parity: bool) -> Self {
        Self {
            index,
            data,
            is_parity,
        }
    }

    /// Get shard size
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Turns one segment into its ordered shard set.
///
/// Implementations must be deterministic and pure: the same segment always
/// produces the same shards, in the same positions.
pub trait SegmentCodec: Send + Sync {
    /// Number of shards produced per segment
    fn total_shards(&self) -> usize;

    /// Encode one segment into exactly `total_shards()` shards
    fn encode_segment(&self, segment: &[u8]) -> Result<Vec<ShardData>>;
}

/// Reed-Solomon segment encoder
pub struct ErasureEncoder {
    config: ErasureConfig,
    /// None when the layout has no parity shards
    encoder: Option<ReedSolomon>,
}

impl ErasureEncoder {
    /// Create a new encoder with default configuration (4, 2)
    pub fn new() -> Result<Self> {
        Self::with_config(ErasureConfig::default())
    }

    /// Create a new encoder with custom configuration
    pub fn with_config(config: ErasureConfig) -> Result<Self> {
        config.validate()?;
        let encoder = if config.parity_shards > 0 {
            Some(ReedSolomon::new(config.data_shards, config.parity_shards)?)
        } else {
            None
        };
        Ok(Self { config, encoder })
    }

    /// Get the erasure configuration
    pub fn config(&self) -> &ErasureConfig {
        &self.config
    }

    /// Encode data into shards
    ///
    /// Returns a vector of shards (data + parity)
    pub fn encode(&self, data: &[u8]) -> Result<Vec<ShardData>> {
        if data.is_empty() {
            return Err(IntegrityError::Encode(
                "cannot encode empty segment".to_string(),
            ));
        }

        let shard_size = self.calculate_shard_size(data.len());

        // Pad data to be evenly divisible by data_shards
        let padded_size = shard_size * self.config.data_shards;
        let mut padded_data = data.to_vec();
        padded_data.resize(padded_size, 0);

        let mut shards: Vec<Vec<u8>> = padded_data.chunks(shard_size).map(|c| c.to_vec()).collect();

        if let Some(encoder) = &self.encoder {
            for _ in 0..self.config.parity_shards {
                shards.push(vec![0u8; shard_size]);
            }
            // Fills in parity shards
            encoder.encode(&mut shards)?;
        }

        let result = shards
            .into_iter()
            .enumerate()
            .map(|(i, shard_data)| {
                let is_parity = i >= self.config.data_shards;
                ShardData::new(i as u8, Bytes::from(shard_data), is_parity)
            })
            .collect();

        Ok(result)
    }

    /// Calculate the size of each shard given the data size
    fn calculate_shard_size(&self, data_size: usize) -> usize {
        // Round up to ensure all data fits
        data_size.div_ceil(self.config.data_shards)
    }
}

impl SegmentCodec for ErasureEncoder {
    fn total_shards(&self) -> usize {
        self.config.total_shards()
    }

    fn encode_segment(&self, segment: &[u8]) -> Result<Vec<ShardData>> {
        self.encode(segment)
    }
}
