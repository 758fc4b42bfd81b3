//! Error types for integrity hashing
//!
//! Every failure aborts the whole computation; there is no partial result.

use thiserror::Error;

/// Result type alias for integrity operations
pub type Result<T> = std::result::Result<T, IntegrityError>;

/// Unified error type for integrity hashing
#[derive(Error, Debug)]
pub enum IntegrityError {
    // ===== Input Size Errors =====
    #[error("Input too large: {size} bytes (max: {max})")]
    InputTooLarge { size: usize, max: usize },

    #[error("Hasher buffer overflow: {buffered} bytes buffered (max: {max})")]
    BufferOverflow { buffered: usize, max: usize },

    // ===== Source Errors =====
    #[error("Failed to read source: {0}")]
    SourceRead(#[source] std::io::Error),

    // ===== Erasure Coding Errors =====
    #[error("Erasure encoding error: {0}")]
    Encode(String),

    // ===== Internal Consistency Errors =====
    #[error("Missing hash result for segment {segment_id}")]
    MissingSegment { segment_id: u64 },

    #[error("Duplicate hash result for segment {segment_id}")]
    DuplicateSegment { segment_id: u64 },

    #[error("Hash result for segment {segment_id} beyond the {total} segments read")]
    UnexpectedSegment { segment_id: u64, total: u64 },

    // ===== Lifecycle Errors =====
    #[error("Hasher already finished, call init() before reuse")]
    HasherFinished,

    // ===== I/O Errors =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IntegrityError {
    /// Whether this error indicates a scheduling bug rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            IntegrityError::MissingSegment { .. }
                | IntegrityError::DuplicateSegment { .. }
                | IntegrityError::UnexpectedSegment { .. }
                | IntegrityError::BufferOverflow { .. }
        )
    }
}

impl From<reed_solomon_erasure::Error> for IntegrityError {
    fn from(err: reed_solomon_erasure::Error) -> Self {
        IntegrityError::Encode(err.to_string())
    }
}
