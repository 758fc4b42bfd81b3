//! Ordered hash accumulation and root assembly
//!
//! Both orchestrators and the incremental hasher fold per-segment results
//! into a `HashAccumulator` in SegmentID order. Root assembly then computes:
//! - index 0: root over the segment checksums (primary copy)
//! - index k+1: root over the checksums of shard position k

use crate::checksum::{root_hash, Checksum};
use crate::segment::SegmentHashes;
use crate::RedundancyType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered per-segment checksums for one computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashAccumulator {
    segment_checksums: Vec<Checksum>,
    /// One list per shard position
    shard_checksums: Vec<Vec<Checksum>>,
    content_length: u64,
}

impl HashAccumulator {
    /// Create an empty accumulator for `total_shards` shard positions
    pub fn new(total_shards: usize) -> Self {
        Self::with_capacity(total_shards, 0)
    }

    /// Create an empty accumulator sized for `segments` segments
    pub fn with_capacity(total_shards: usize, segments: usize) -> Self {
        Self {
            segment_checksums: Vec::with_capacity(segments),
            shard_checksums: (0..total_shards)
                .map(|_| Vec::with_capacity(segments))
                .collect(),
            content_length: 0,
        }
    }

    /// Append the next segment's hashes; callers push in SegmentID order
    pub fn push(&mut self, hashes: SegmentHashes, segment_len: usize) {
        debug_assert_eq!(hashes.shard_checksums.len(), self.shard_checksums.len());

        self.segment_checksums.push(hashes.checksum);
        for (list, sum) in self.shard_checksums.iter_mut().zip(hashes.shard_checksums) {
            list.push(sum);
        }
        self.content_length += segment_len as u64;
    }

    /// Number of segments accumulated
    pub fn segment_count(&self) -> usize {
        self.segment_checksums.len()
    }

    /// Total bytes of all accumulated segments
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Number of shard positions
    pub fn total_shards(&self) -> usize {
        self.shard_checksums.len()
    }

    /// Segment checksums in SegmentID order
    pub fn segment_checksums(&self) -> &[Checksum] {
        &self.segment_checksums
    }

    /// Checksums of shard position `index` in SegmentID order
    pub fn shard_checksums(&self, index: usize) -> Option<&[Checksum]> {
        self.shard_checksums.get(index).map(Vec::as_slice)
    }

    /// Compute the primary root and, concurrently, one root per shard position
    pub fn assemble(&self) -> IntegrityResult {
        let shard_roots: Vec<Checksum> = self
            .shard_checksums
            .par_iter()
            .map(|list| root_hash(list))
            .collect();

        let mut integrity_hashes = Vec::with_capacity(shard_roots.len() + 1);
        integrity_hashes.push(root_hash(&self.segment_checksums));
        integrity_hashes.extend(shard_roots);

        IntegrityResult {
            integrity_hashes,
            content_length: self.content_length,
            redundancy_type: RedundancyType::ErasureCoded,
        }
    }
}

/// Result of one integrity computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityResult {
    /// `total_shards + 1` roots: primary first, then one per shard position
    pub integrity_hashes: Vec<Checksum>,
    /// Total bytes consumed
    pub content_length: u64,
    pub redundancy_type: RedundancyType,
}

impl IntegrityResult {
    /// Root over the unencoded segment sequence. None only for a result
    /// built or deserialized without any roots.
    pub fn primary_root(&self) -> Option<Checksum> {
        self.integrity_hashes.first().copied()
    }

    /// Root over shard position `index`
    pub fn shard_root(&self, index: usize) -> Option<Checksum> {
        self.integrity_hashes.get(index + 1).copied()
    }

    /// Roots of all shard positions, in position order
    pub fn shard_roots(&self) -> &[Checksum] {
        self.integrity_hashes.get(1..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum;

    fn segment(tag: &[u8]) -> SegmentHashes {
        SegmentHashes {
            checksum: checksum(tag),
            shard_checksums: vec![
                checksum(&[tag, b"-0".as_slice()].concat()),
                checksum(&[tag, b"-1".as_slice()].concat()),
            ],
        }
    }

    #[test]
    fn test_push_keeps_lists_aligned() {
        let mut acc = HashAccumulator::new(2);
        acc.push(segment(b"a"), 4);
        acc.push(segment(b"b"), 3);

        assert_eq!(acc.segment_count(), 2);
        assert_eq!(acc.content_length(), 7);
        assert_eq!(acc.segment_checksums(), &[checksum(b"a"), checksum(b"b")]);
        assert_eq!(
            acc.shard_checksums(1).unwrap(),
            &[checksum(b"a-1"), checksum(b"b-1")]
        );
        assert!(acc.shard_checksums(2).is_none());
    }

    #[test]
    fn test_assemble() {
        let mut acc = HashAccumulator::new(2);
        acc.push(segment(b"a"), 4);
        acc.push(segment(b"b"), 4);

        let result = acc.assemble();
        assert_eq!(result.integrity_hashes.len(), 3);
        assert_eq!(result.content_length, 8);
        assert_eq!(result.redundancy_type, RedundancyType::ErasureCoded);
        assert_eq!(
            result.primary_root(),
            Some(root_hash(&[checksum(b"a"), checksum(b"b")]))
        );
        assert_eq!(
            result.shard_root(0),
            Some(root_hash(&[checksum(b"a-0"), checksum(b"b-0")]))
        );
        assert_eq!(result.shard_roots().len(), 2);
        assert!(result.shard_root(2).is_none());
    }

    #[test]
    fn test_assemble_empty() {
        let result = HashAccumulator::new(3).assemble();
        assert_eq!(result.integrity_hashes.len(), 4);
        assert_eq!(result.content_length, 0);
        assert!(result.integrity_hashes.iter().all(|h| *h == root_hash(&[])));
    }

    #[test]
    fn test_rootless_result_does_not_panic() {
        let result = IntegrityResult {
            integrity_hashes: vec![],
            content_length: 0,
            redundancy_type: RedundancyType::ErasureCoded,
        };
        assert!(result.primary_root().is_none());
        assert!(result.shard_roots().is_empty());
        assert!(result.shard_root(0).is_none());

        let primary_only = IntegrityResult {
            integrity_hashes: vec![root_hash(&[])],
            ..result
        };
        assert_eq!(primary_only.primary_root(), Some(root_hash(&[])));
        assert!(primary_only.shard_roots().is_empty());
    }
}
