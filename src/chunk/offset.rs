//! Offset calculation for chunk grids.
//!
//! Walks the grid in enumeration order and places every chunk right after its
//! diagonal predecessor (every coordinate minus one, clamped at zero):
//!
//! ```text
//! offset[i] = 0                                        if pos[i] == 0
//! offset[i] = diag.offset[i] + diag.shape[i]           otherwise
//! ```
//!
//! Under the partitioning invariant the diagonal predecessor has the same
//! extent along axis `i` as the direct predecessor along `i`, so one lookup
//! serves every axis. Without the invariant the result is wrong and nothing
//! here notices.

use crate::chunk::{ChunkGrid, Grid};
use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::{DataNodeId, Extent, Graph};

/// Offsets computed for a grid, not yet written to the graph.
#[derive(Debug, Clone)]
pub struct OffsetPlan {
    /// `(node, offset, grid position)` in enumeration order
    entries: Vec<(DataNodeId, Extent, Extent)>,
    total: Extent,
}

impl OffsetPlan {
    /// Assembled extent of the whole grid.
    pub fn total(&self) -> &Extent {
        &self.total
    }

    pub fn offsets(&self) -> impl Iterator<Item = (&Extent, &Extent)> {
        self.entries.iter().map(|(_, offset, pos)| (pos, offset))
    }

    /// Write every planned offset and grid position into the graph.
    pub(crate) fn apply(self, graph: &mut Graph) -> Extent {
        for (id, offset, pos) in self.entries {
            if let Some(node) = graph.data_node_mut(id) {
                node.descriptor.offset = offset;
                node.descriptor.grid_position = pos;
            }
        }
        self.total
    }
}

/// Compute the offsets of every chunk of `grid` without touching the graph.
///
/// # Errors
/// - `EmptyGrid` if the grid has no cells
/// - `InvalidChunk` if a cell holds no chunk of this graph
/// - `RankMismatch` if a chunk's rank differs from the grid's rank
/// - `PartitionViolation` if `validate` is set and the shapes do not form a
///   Cartesian partition
pub fn plan_offsets(graph: &Graph, grid: &ChunkGrid, validate: bool) -> GraphResult<OffsetPlan> {
    if grid.is_empty() {
        return Err(ChunkGraphError::EmptyGrid(grid.bounds().dims().to_vec()));
    }

    let mut nodes = Vec::with_capacity(grid.len());
    let mut shapes = Vec::with_capacity(grid.len());
    for &chunk in grid.cells() {
        let id = graph.resolve(chunk)?;
        let shape = graph
            .data_node(id)
            .map(|node| node.descriptor().shape.clone())
            .ok_or_else(|| ChunkGraphError::InvalidChunk(format!("{:?}", chunk)))?;
        nodes.push(id);
        shapes.push(shape);
    }

    let shapes = Grid::from_cells(shapes, grid.bounds().clone())?;
    let (offsets, total) = layout(&shapes, validate)?;
    let entries = nodes
        .into_iter()
        .zip(offsets.iter())
        .map(|(id, (pos, offset))| (id, offset.clone(), pos))
        .collect();

    Ok(OffsetPlan { entries, total })
}

/// Offsets of a grid of block shapes and the extent they assemble into.
///
/// Same checks as [`plan_offsets`] minus chunk resolution.
pub fn layout(shapes: &Grid<Extent>, validate: bool) -> GraphResult<(Grid<Extent>, Extent)> {
    let bounds = shapes.bounds();
    if shapes.is_empty() {
        return Err(ChunkGraphError::EmptyGrid(bounds.dims().to_vec()));
    }

    let rank = shapes.rank();
    if let Some(bad) = shapes.cells().iter().find(|s| s.rank() != rank) {
        return Err(ChunkGraphError::RankMismatch {
            expected: rank,
            actual: bad.rank(),
        });
    }
    if validate {
        shapes.axis_sizes()?;
    }

    let cells = shapes.cells();
    let mut offsets: Vec<Extent> = Vec::with_capacity(cells.len());
    let mut pos = Extent::origin(rank);
    loop {
        let diag = pos.diagonal_predecessor();
        let diag_index = Extent::flat_index(&diag, bounds).ok_or_else(|| {
            ChunkGraphError::Internal(format!("predecessor {} outside grid {}", diag, bounds))
        })?;

        let mut offset = vec![0; rank];
        for (axis, slot) in offset.iter_mut().enumerate() {
            if pos[axis] != 0 {
                *slot = offsets[diag_index][axis] + cells[diag_index][axis];
            }
        }
        let offset = Extent::new(offset);

        tracing::trace!(pos = %pos, offset = %offset, "assigned chunk offset");
        offsets.push(offset);

        if pos.increment(bounds) {
            break;
        }
    }

    let last = offsets.len() - 1;
    let total = &offsets[last] + &cells[last];
    tracing::debug!(bounds = %bounds, total = %total, "computed grid offsets");

    Ok((Grid::from_cells(offsets, bounds.clone())?, total))
}
