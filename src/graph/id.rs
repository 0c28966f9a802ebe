//! Data identifier allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::graph::DataId;

/// Source of unique data identifiers, one call per new data node.
pub trait DataIdGenerator: Send + Sync {
    fn next_id(&self) -> DataId;
}

/// Monotonic counter shared safely across threads.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl DataIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> DataId {
        DataId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
