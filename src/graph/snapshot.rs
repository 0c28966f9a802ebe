//! Serializable view of a graph for inspection and debugging.

use serde::Serialize;
use std::path::Path;

use crate::error::GraphResult;
use crate::graph::{BlockDescriptor, DataId, Graph, Placement};

#[derive(Debug, Clone, Serialize)]
pub struct DataNodeSnapshot {
    pub index: usize,
    pub data_id: DataId,
    pub descriptor: BlockDescriptor,
    pub producer: Option<usize>,
    pub consumers: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpNodeSnapshot {
    pub index: usize,
    pub kind: String,
    pub params: String,
    pub placement: Placement,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub graph_id: u64,
    pub data_nodes: Vec<DataNodeSnapshot>,
    pub op_nodes: Vec<OpNodeSnapshot>,
}

impl GraphSnapshot {
    pub fn capture(graph: &Graph) -> Self {
        let data_nodes = graph
            .data_nodes()
            .map(|(id, node)| DataNodeSnapshot {
                index: id.index(),
                data_id: node.data_id(),
                descriptor: node.descriptor().clone(),
                producer: node.producer().map(|op| op.index()),
                consumers: graph.consumers_of(id).iter().map(|op| op.index()).collect(),
            })
            .collect();

        let op_nodes = graph
            .op_nodes()
            .map(|(id, op)| OpNodeSnapshot {
                index: id.index(),
                kind: op.compute_unit().kind.name().to_string(),
                params: op.compute_unit().kind.params(),
                placement: op.placement(),
                inputs: op.inputs().iter().map(|d| d.index()).collect(),
                outputs: op.outputs().iter().map(|d| d.index()).collect(),
            })
            .collect();

        Self {
            graph_id: graph.id().0,
            data_nodes,
            op_nodes,
        }
    }

    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty-printed JSON snapshot to `path`.
    pub fn write_json(&self, path: &Path) -> GraphResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
