//! Backend interface for graph execution.

use crate::error::GraphResult;
use crate::graph::{DataNode, DataNodeId, Graph, OpNode, OpNodeId};

/// Runs operation nodes on real storage.
///
/// The graph layer never computes anything; a backend owns the buffers behind
/// data nodes and interprets each operation's compute unit.
pub trait ChunkBackend {
    type Buffer;

    /// Reserve storage for one data node.
    fn alloc(&mut self, id: DataNodeId, node: &DataNode) -> GraphResult<()>;
    fn free(&mut self, id: DataNodeId) -> GraphResult<()>;
    fn buffer(&self, id: DataNodeId) -> Option<&Self::Buffer>;

    fn has_buffer(&self, id: DataNodeId) -> bool {
        self.buffer(id).is_some()
    }

    /// Run one operation. Every input and output of `op` has a buffer.
    fn execute_op(&mut self, id: OpNodeId, op: &OpNode, graph: &Graph) -> GraphResult<()>;

    fn synchronize(&mut self) -> GraphResult<()>;
}
