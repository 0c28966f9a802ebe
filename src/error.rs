//! Unified error handling for chunkgraph
//!
//! This module provides the single error type returned by every graph
//! construction entry point. It implements error categorization for:
//! - User errors (invalid chunk handles, degenerate shapes, bad config)
//! - Precondition errors (opt-in partition validation failures)
//! - Internal errors (lock poisoning, id reuse, executor failures, I/O)
//!
//! Every failing call leaves the dependency graph exactly as it was.

use std::fmt;

/// Unified error type for chunkgraph
#[derive(Debug, thiserror::Error)]
pub enum ChunkGraphError {
    // ========== Argument Errors ==========
    /// Chunk handle that references no node, or a node outside this graph
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    /// Result shape rejected by the builder configuration
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Shape rank does not match the grid rank
    #[error("Rank mismatch: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Grid without any cell
    #[error("Chunk grid is empty (bounds {0:?})")]
    EmptyGrid(Vec<usize>),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ========== Precondition Errors ==========
    /// Grid violates the Cartesian partitioning invariant
    #[error("Partition violation: {0}")]
    PartitionViolation(String),

    // ========== Internal Errors ==========
    /// Identifier generator handed out an identifier already in the graph
    #[error("Duplicate data id: {0}")]
    DuplicateDataId(u64),

    /// Graph lock poisoned
    #[error("Graph lock poisoned: {0}")]
    LockPoisoned(String),

    /// Broken internal invariant (indicates a bug)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Executor-side failure reported through a backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChunkGraphError {
    /// Categorize the error for handling decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChunkGraphError::InvalidChunk(_)
            | ChunkGraphError::InvalidShape(_)
            | ChunkGraphError::RankMismatch { .. }
            | ChunkGraphError::EmptyGrid(_)
            | ChunkGraphError::Config(_) => ErrorCategory::User,

            ChunkGraphError::PartitionViolation(_) => ErrorCategory::Precondition,

            ChunkGraphError::DuplicateDataId(_)
            | ChunkGraphError::Internal(_)
            | ChunkGraphError::LockPoisoned(_)
            | ChunkGraphError::Backend(_)
            | ChunkGraphError::Io(_)
            | ChunkGraphError::Serialization(_) => ErrorCategory::Internal,
        }
    }

    /// Check if this is a caller error (the arguments should be fixed)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::User | ErrorCategory::Precondition
        )
    }

    /// Check if this is an internal error (indicates a bug or a broken collaborator)
    pub fn is_internal_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Internal)
    }
}

/// Error category for handling decisions
///
/// - User: invalid argument, fix the call
/// - Precondition: the grid does not describe a valid tiling
/// - Internal: log and report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid argument or configuration
    User,
    /// Partitioning contract broken
    Precondition,
    /// Bug, poisoned state or collaborator failure
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::User => write!(f, "User"),
            ErrorCategory::Precondition => write!(f, "Precondition"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ChunkGraphError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        ChunkGraphError::LockPoisoned(err.to_string())
    }
}

/// Result alias used across the crate
pub type GraphResult<T> = std::result::Result<T, ChunkGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ChunkGraphError::InvalidChunk("x".into()).category(),
            ErrorCategory::User
        );
        assert_eq!(
            ChunkGraphError::RankMismatch {
                expected: 2,
                actual: 3
            }
            .category(),
            ErrorCategory::User
        );
        assert_eq!(
            ChunkGraphError::PartitionViolation("x".into()).category(),
            ErrorCategory::Precondition
        );
        assert_eq!(
            ChunkGraphError::DuplicateDataId(7).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_user_vs_internal() {
        let err = ChunkGraphError::EmptyGrid(vec![0, 2]);
        assert!(err.is_user_error());
        assert!(!err.is_internal_error());

        let err = ChunkGraphError::Backend("device lost".into());
        assert!(!err.is_user_error());
        assert!(err.is_internal_error());
    }

    #[test]
    fn test_error_display() {
        let err = ChunkGraphError::RankMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Rank mismatch: expected 2, got 1");
        assert_eq!(ErrorCategory::Precondition.to_string(), "Precondition");
    }

    #[test]
    fn test_poison_error_conversion() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0));
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err: ChunkGraphError = lock.lock().unwrap_err().into();
        assert!(matches!(err, ChunkGraphError::LockPoisoned(_)));
    }
}
