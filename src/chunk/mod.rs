//! Chunk handles and chunk grids.
//!
//! A [`Chunk`] is a copyable, non-owning handle to one data node of a
//! [`GraphContext`]; a [`ChunkGrid`] arranges chunks as the Cartesian
//! partitioning of one logical tensor. Split and merge move between the two.
//!
//! # Partitioning invariant
//!
//! The offset calculator assumes that the size of a chunk along axis `i`
//! depends only on its grid coordinate along axis `i`. Grids breaking this
//! get silently wrong offsets unless
//! [`BuildConfig::validate_partitions`](crate::config::BuildConfig) is on.

pub mod grid;
pub mod offset;
mod ops;

pub use grid::Grid;

use crate::error::GraphResult;
use crate::graph::{BlockDescriptor, DataNodeId, Extent, GraphContext, GraphId};

/// Grid of chunk handles representing one partitioned tensor.
pub type ChunkGrid = Grid<Chunk>;

/// Handle to a data node.
///
/// `Chunk::default()` refers to no node and is rejected by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Chunk {
    node: Option<(GraphId, DataNodeId)>,
}

impl Chunk {
    pub(crate) fn from_parts(graph: GraphId, node: DataNodeId) -> Self {
        Self {
            node: Some((graph, node)),
        }
    }

    pub(crate) fn parts(&self) -> Option<(GraphId, DataNodeId)> {
        self.node
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    /// Arena index of the referenced node.
    pub fn node_id(&self) -> Option<DataNodeId> {
        self.node.map(|(_, id)| id)
    }

    pub fn descriptor(self, ctx: &GraphContext) -> GraphResult<BlockDescriptor> {
        ctx.descriptor(self)
    }

    pub fn shape(self, ctx: &GraphContext) -> GraphResult<Extent> {
        ctx.shape(self)
    }

    /// See [`GraphContext::split`].
    pub fn split(self, ctx: &GraphContext, part_shapes: &Grid<Extent>) -> GraphResult<ChunkGrid> {
        ctx.split(self, part_shapes)
    }
}

impl ChunkGrid {
    /// See [`GraphContext::merge`].
    pub fn merge(&self, ctx: &GraphContext) -> GraphResult<Chunk> {
        ctx.merge(self)
    }
}
