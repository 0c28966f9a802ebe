//! Arena-backed dependency graph.
//!
//! Data and operation nodes are stored in two vectors and address each other
//! by index, so there is no shared ownership between them: data nodes keep
//! the index of their producer, operation nodes keep index lists of their
//! inputs and outputs. Nodes are never removed.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::chunk::Chunk;
use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::{DataId, DataNode, DataNodeId, OpNode, OpNodeId};

static GRAPH_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies which graph a chunk handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct GraphId(pub(crate) u64);

#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    data_nodes: Vec<DataNode>,
    op_nodes: Vec<OpNode>,
    /// Operations reading each data node, indexed like `data_nodes`
    consumers: Vec<Vec<OpNodeId>>,
    data_ids: HashSet<DataId>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            id: GraphId(GRAPH_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            data_nodes: Vec::new(),
            op_nodes: Vec::new(),
            consumers: Vec::new(),
            data_ids: HashSet::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn num_data_nodes(&self) -> usize {
        self.data_nodes.len()
    }

    pub fn num_op_nodes(&self) -> usize {
        self.op_nodes.len()
    }

    pub fn data_node(&self, id: DataNodeId) -> Option<&DataNode> {
        self.data_nodes.get(id.0)
    }

    pub fn op_node(&self, id: OpNodeId) -> Option<&OpNode> {
        self.op_nodes.get(id.0)
    }

    /// Data nodes in creation order.
    pub fn data_nodes(&self) -> impl Iterator<Item = (DataNodeId, &DataNode)> {
        self.data_nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (DataNodeId(i), node))
    }

    /// Operation nodes in creation order.
    pub fn op_nodes(&self) -> impl Iterator<Item = (OpNodeId, &OpNode)> {
        self.op_nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (OpNodeId(i), node))
    }

    pub fn producer_of(&self, id: DataNodeId) -> Option<OpNodeId> {
        self.data_node(id).and_then(DataNode::producer)
    }

    pub fn consumers_of(&self, id: DataNodeId) -> &[OpNodeId] {
        self.consumers.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_data_id(&self, data_id: DataId) -> bool {
        self.data_ids.contains(&data_id)
    }

    /// Map a chunk handle to a node of this graph.
    pub fn resolve(&self, chunk: Chunk) -> GraphResult<DataNodeId> {
        let (graph, node) = chunk
            .parts()
            .ok_or_else(|| ChunkGraphError::InvalidChunk("chunk references no node".into()))?;
        if graph != self.id {
            return Err(ChunkGraphError::InvalidChunk(format!(
                "chunk belongs to graph {} but was used with graph {}",
                graph.0, self.id.0
            )));
        }
        if node.0 >= self.data_nodes.len() {
            return Err(ChunkGraphError::InvalidChunk(format!(
                "data node {} does not exist",
                node.0
            )));
        }
        Ok(node)
    }

    pub(crate) fn chunk_for(&self, id: DataNodeId) -> Chunk {
        Chunk::from_parts(self.id, id)
    }

    pub(crate) fn data_node_mut(&mut self, id: DataNodeId) -> Option<&mut DataNode> {
        self.data_nodes.get_mut(id.0)
    }

    /// Append a data node. The caller guarantees `data_id` is unused.
    pub(crate) fn push_data_node(&mut self, node: DataNode) -> DataNodeId {
        let id = DataNodeId(self.data_nodes.len());
        self.data_ids.insert(node.data_id);
        self.data_nodes.push(node);
        self.consumers.push(Vec::new());
        id
    }

    /// Append an operation node and wire producer/consumer edges.
    ///
    /// The caller guarantees every referenced data node exists and that the
    /// outputs have no producer yet.
    pub(crate) fn push_op_node(&mut self, node: OpNode) -> OpNodeId {
        let id = OpNodeId(self.op_nodes.len());
        for input in &node.inputs {
            let readers = &mut self.consumers[input.0];
            // An op may read the same block twice; record the edge once
            if readers.last() != Some(&id) {
                readers.push(id);
            }
        }
        for output in &node.outputs {
            self.data_nodes[output.0].producer = Some(id);
        }
        self.op_nodes.push(node);
        id
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Graph {} ({} data nodes, {} op nodes)",
            self.id.0,
            self.data_nodes.len(),
            self.op_nodes.len()
        )?;
        for (id, node) in self.data_nodes() {
            let desc = node.descriptor();
            write!(
                f,
                "  data #{} {} shape={} offset={} pos={} {}",
                id.0, node.data_id, desc.shape, desc.offset, desc.grid_position, desc.placement
            )?;
            match node.producer {
                Some(op) => writeln!(f, " <- op #{}", op.0)?,
                None => writeln!(f, " (leaf)")?,
            }
        }
        for (id, op) in self.op_nodes() {
            let inputs: Vec<String> = op.inputs.iter().map(|d| format!("#{}", d.0)).collect();
            let outputs: Vec<String> = op.outputs.iter().map(|d| format!("#{}", d.0)).collect();
            writeln!(
                f,
                "  op #{} {} [{}] -> [{}]",
                id.0,
                op.unit,
                inputs.join(", "),
                outputs.join(", ")
            )?;
        }
        Ok(())
    }
}
