//! Chunk-level operators on [`GraphContext`]: generators, offset computation,
//! merge and split.

use crate::chunk::offset::{layout, plan_offsets};
use crate::chunk::{Chunk, ChunkGrid, Grid};
use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::builder::{build_op, BuildRequest};
use crate::graph::{ComputeUnit, Extent, GraphContext};

impl GraphContext {
    // ========== Generators ==========

    /// Chunk of `shape` filled with `value`.
    pub fn constant(&self, shape: Extent, value: f32) -> GraphResult<Chunk> {
        self.generate(shape, ComputeUnit::fill(value))
    }

    /// Chunk of `shape` drawn from a normal distribution.
    pub fn randn(&self, shape: Extent, mean: f32, variance: f32) -> GraphResult<Chunk> {
        self.generate(shape, ComputeUnit::randn(mean, variance))
    }

    pub fn zeros(&self, shape: Extent) -> GraphResult<Chunk> {
        self.constant(shape, 0.0)
    }

    pub fn ones(&self, shape: Extent) -> GraphResult<Chunk> {
        self.constant(shape, 1.0)
    }

    fn generate(&self, shape: Extent, unit: ComputeUnit) -> GraphResult<Chunk> {
        let unit = unit.with_placement(self.config().default_placement);
        let chunks = self.compute(&[], &[shape], unit)?;
        single(chunks)
    }

    // ========== Partitioning ==========

    /// Assign offset and grid position to every chunk of `grid` and return
    /// the extent of the assembled tensor.
    ///
    /// Offsets are recomputed from zero on every call.
    ///
    /// # Errors
    /// - `EmptyGrid` if the grid has no cells
    /// - `InvalidChunk` if a cell holds no chunk of this graph
    /// - `RankMismatch` if a chunk's rank differs from the grid's rank
    /// - `PartitionViolation` with `validate_partitions` on and a jigsaw grid
    pub fn compute_offset(&self, grid: &ChunkGrid) -> GraphResult<Extent> {
        let mut graph = self.lock()?;
        let plan = plan_offsets(&graph, grid, self.config().validate_partitions)
            .map_err(|e| rejected("compute_offset", e))?;
        Ok(plan.apply(&mut graph))
    }

    /// Record one `Assemble` operation reading every chunk of `grid` in
    /// enumeration order and producing a single chunk of the assembled extent.
    ///
    /// The offsets of the inputs are written in the same step.
    pub fn merge(&self, grid: &ChunkGrid) -> GraphResult<Chunk> {
        let mut graph = self.lock()?;
        let plan = plan_offsets(&graph, grid, self.config().validate_partitions)
            .map_err(|e| rejected("merge", e))?;

        let total = plan.total().clone();
        let unit = ComputeUnit::assemble().with_placement(self.config().default_placement);
        let (_, chunks) = build_op(
            &mut graph,
            self.ids(),
            self.config(),
            BuildRequest {
                inputs: grid.cells(),
                result_shapes: std::slice::from_ref(&total),
                unit,
            },
        )
        .map_err(|e| rejected("merge", e))?;

        plan.apply(&mut graph);
        tracing::debug!(parts = grid.len(), shape = %total, "merged chunk grid");
        single(chunks)
    }

    /// Record one `Split` operation cutting `chunk` into blocks of
    /// `part_shapes` and return them as a grid with the same bounds, offsets
    /// already assigned.
    ///
    /// With `validate_partitions` on, the part shapes must also tile the
    /// source shape exactly.
    pub fn split(&self, chunk: Chunk, part_shapes: &Grid<Extent>) -> GraphResult<ChunkGrid> {
        let mut graph = self.lock()?;
        let validate = self.config().validate_partitions;
        let (offsets, total) = layout(part_shapes, validate).map_err(|e| rejected("split", e))?;

        if validate {
            let source = graph.resolve(chunk).and_then(|id| {
                graph
                    .data_node(id)
                    .map(|node| node.descriptor().shape.clone())
                    .ok_or_else(|| ChunkGraphError::InvalidChunk(format!("{:?}", chunk)))
            });
            let source = source.map_err(|e| rejected("split", e))?;
            if source != total {
                return Err(rejected(
                    "split",
                    ChunkGraphError::PartitionViolation(format!(
                        "parts assemble to {}, source chunk is {}",
                        total, source
                    )),
                ));
            }
        }

        let unit = ComputeUnit::split().with_placement(self.config().default_placement);
        let (_, chunks) = build_op(
            &mut graph,
            self.ids(),
            self.config(),
            BuildRequest {
                inputs: std::slice::from_ref(&chunk),
                result_shapes: part_shapes.cells(),
                unit,
            },
        )
        .map_err(|e| rejected("split", e))?;

        for (part, (pos, offset)) in chunks.iter().zip(offsets.iter()) {
            if let Some(node) = part.node_id().and_then(|id| graph.data_node_mut(id)) {
                node.descriptor.offset = offset.clone();
                node.descriptor.grid_position = pos;
            }
        }

        tracing::debug!(bounds = %part_shapes.bounds(), shape = %total, "split chunk");
        Grid::from_cells(chunks, part_shapes.bounds().clone())
    }
}

fn single(chunks: Vec<Chunk>) -> GraphResult<Chunk> {
    match chunks.as_slice() {
        [chunk] => Ok(*chunk),
        other => Err(ChunkGraphError::Internal(format!(
            "expected one output chunk, got {}",
            other.len()
        ))),
    }
}

fn rejected(op: &str, err: ChunkGraphError) -> ChunkGraphError {
    tracing::warn!(op, error = %err, "rejected request");
    err
}
