//! Recording backend for unit testing.
//!
//! Host-only backend that allocates nothing real and executes nothing. It
//! hands out fake buffers laid out back to back in a fake address space and
//! records every call, so tests can check what an executor asked for.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chunkgraph::executor::{execute_graph, ExecuteConfig, RecordingBackend};
//!
//! let mut backend = RecordingBackend::new();
//! execute_graph(&mut backend, &ctx, ExecuteConfig::default())?;
//! assert_eq!(backend.stats().execute_op_count, ctx.with_graph(|g| g.num_op_nodes())?);
//! ```

use std::collections::HashMap;

use crate::error::{ChunkGraphError, GraphResult};
use crate::executor::ChunkBackend;
use crate::graph::{DataNode, DataNodeId, Graph, OpNode, OpNodeId};

/// Bytes per element assumed for fake allocations
const ELEMENT_SIZE: usize = std::mem::size_of::<f32>();

/// Fake buffer in the recording backend's address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBuffer {
    /// Fake offset from base
    pub offset: usize,
    /// Size in bytes
    pub size: usize,
}

/// Statistics tracking for the recording backend
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingBackendStats {
    /// Number of alloc() calls
    pub alloc_count: usize,
    /// Number of free() calls
    pub free_count: usize,
    /// Number of execute_op() calls
    pub execute_op_count: usize,
    /// Number of synchronize() calls
    pub synchronize_count: usize,
    /// Total "allocated" bytes (fake)
    pub total_allocated_bytes: usize,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    buffers: HashMap<DataNodeId, RecordedBuffer>,
    /// Operations in the order they were executed
    executed: Vec<OpNodeId>,
    /// Data nodes in the order they were allocated
    allocated: Vec<DataNodeId>,
    current_offset: usize,
    /// Operation that reports a backend failure, for error-path tests
    fail_at: Option<OpNodeId>,
    stats: RecordingBackendStats,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose `execute_op` fails on `op`.
    pub fn failing_at(op: OpNodeId) -> Self {
        Self {
            fail_at: Some(op),
            ..Self::default()
        }
    }

    pub fn stats(&self) -> &RecordingBackendStats {
        &self.stats
    }

    pub fn executed(&self) -> &[OpNodeId] {
        &self.executed
    }

    pub fn allocated(&self) -> &[DataNodeId] {
        &self.allocated
    }

    /// Number of buffers currently live
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Clear buffers, records and statistics.
    pub fn reset(&mut self) {
        self.buffers.clear();
        self.executed.clear();
        self.allocated.clear();
        self.current_offset = 0;
        self.stats = RecordingBackendStats::default();
    }
}

impl ChunkBackend for RecordingBackend {
    type Buffer = RecordedBuffer;

    fn alloc(&mut self, id: DataNodeId, node: &DataNode) -> GraphResult<()> {
        let size = node.descriptor().shape.num_elements() * ELEMENT_SIZE;
        let buffer = RecordedBuffer {
            offset: self.current_offset,
            size,
        };

        self.buffers.insert(id, buffer);
        self.allocated.push(id);
        self.current_offset += size;

        self.stats.alloc_count += 1;
        self.stats.total_allocated_bytes += size;
        Ok(())
    }

    fn free(&mut self, id: DataNodeId) -> GraphResult<()> {
        if self.buffers.remove(&id).is_none() {
            return Err(ChunkGraphError::Backend(format!(
                "free of unallocated data node #{}",
                id.index()
            )));
        }
        self.stats.free_count += 1;
        Ok(())
    }

    fn buffer(&self, id: DataNodeId) -> Option<&RecordedBuffer> {
        self.buffers.get(&id)
    }

    fn execute_op(&mut self, id: OpNodeId, op: &OpNode, _graph: &Graph) -> GraphResult<()> {
        if self.fail_at == Some(id) {
            return Err(ChunkGraphError::Backend(format!(
                "injected failure at op #{}",
                id.index()
            )));
        }
        if let Some(missing) = op
            .inputs()
            .iter()
            .chain(op.outputs())
            .find(|data| !self.buffers.contains_key(*data))
        {
            return Err(ChunkGraphError::Backend(format!(
                "op #{} touches data node #{} without a buffer",
                id.index(),
                missing.index()
            )));
        }

        self.executed.push(id);
        self.stats.execute_op_count += 1;
        Ok(())
    }

    fn synchronize(&mut self) -> GraphResult<()> {
        self.stats.synchronize_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Extent, GraphContext};

    #[test]
    fn test_alloc_lays_buffers_out_back_to_back() {
        let ctx = GraphContext::new();
        ctx.zeros(Extent::from([2, 2])).unwrap();
        ctx.zeros(Extent::from([3])).unwrap();

        let mut backend = RecordingBackend::new();
        ctx.with_graph(|g| {
            for (id, node) in g.data_nodes() {
                backend.alloc(id, node).unwrap();
            }
        })
        .unwrap();

        let ids = backend.allocated().to_vec();
        assert_eq!(
            backend.buffer(ids[0]),
            Some(&RecordedBuffer { offset: 0, size: 16 })
        );
        assert_eq!(
            backend.buffer(ids[1]),
            Some(&RecordedBuffer { offset: 16, size: 12 })
        );
        assert_eq!(backend.stats().total_allocated_bytes, 28);
    }

    #[test]
    fn test_free_unknown_buffer_fails() {
        let ctx = GraphContext::new();
        let chunk = ctx.zeros(Extent::from([1])).unwrap();
        let mut backend = RecordingBackend::new();
        let id = chunk.node_id().unwrap();

        assert!(matches!(backend.free(id), Err(ChunkGraphError::Backend(_))));
    }

    #[test]
    fn test_execute_without_buffers_fails() {
        let ctx = GraphContext::new();
        ctx.zeros(Extent::from([1])).unwrap();
        let mut backend = RecordingBackend::new();

        let result = ctx
            .with_graph(|g| {
                let (id, op) = g.op_nodes().next().unwrap();
                backend.execute_op(id, op, g)
            })
            .unwrap();
        assert!(result.is_err());
        assert_eq!(backend.stats().execute_op_count, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let ctx = GraphContext::new();
        ctx.zeros(Extent::from([4])).unwrap();
        let mut backend = RecordingBackend::new();
        ctx.with_graph(|g| {
            let (id, node) = g.data_nodes().next().unwrap();
            backend.alloc(id, node).unwrap();
        })
        .unwrap();

        backend.reset();
        assert_eq!(backend.live_buffers(), 0);
        assert!(backend.allocated().is_empty());
        assert_eq!(backend.stats(), &RecordingBackendStats::default());
    }
}
