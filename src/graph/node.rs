//! Data and operation nodes of the dependency graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{BlockDescriptor, ComputeUnit, Placement};

/// Arena index of a data node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DataNodeId(pub(crate) usize);

/// Arena index of an operation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OpNodeId(pub(crate) usize);

impl DataNodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl OpNodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Identifier handed out by the identifier allocator.
///
/// Storage layers locate materialized buffers by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataId(pub u64);

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct DataNode {
    pub(crate) data_id: DataId,
    pub(crate) descriptor: BlockDescriptor,
    pub(crate) producer: Option<OpNodeId>,
}

impl DataNode {
    pub fn data_id(&self) -> DataId {
        self.data_id
    }

    pub fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    /// Operation writing this node, `None` for leaves.
    pub fn producer(&self) -> Option<OpNodeId> {
        self.producer
    }

    pub fn is_leaf(&self) -> bool {
        self.producer.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct OpNode {
    pub(crate) inputs: Vec<DataNodeId>,
    pub(crate) outputs: Vec<DataNodeId>,
    pub(crate) unit: ComputeUnit,
}

impl OpNode {
    pub fn inputs(&self) -> &[DataNodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[DataNodeId] {
        &self.outputs
    }

    pub fn compute_unit(&self) -> &ComputeUnit {
        &self.unit
    }

    pub fn placement(&self) -> Placement {
        self.unit.placement
    }
}
