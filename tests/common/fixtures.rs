//! Common test fixtures for chunk and grid creation

#![allow(dead_code)]

use chunkgraph::{Chunk, ChunkGrid, Extent, Grid, GraphContext};

// ============================================================================
// Grid Fixtures
// ============================================================================

/// Grid of fresh zero-filled chunks whose shapes form the Cartesian partition
/// described by `axis_sizes`.
pub fn leaf_grid(ctx: &GraphContext, axis_sizes: &[Vec<usize>]) -> anyhow::Result<ChunkGrid> {
    let shapes = Grid::from_axis_sizes(axis_sizes);
    grid_of_shapes(ctx, &shapes)
}

/// Grid of fresh zero-filled chunks with exactly the given shapes.
pub fn grid_of_shapes(ctx: &GraphContext, shapes: &Grid<Extent>) -> anyhow::Result<ChunkGrid> {
    let chunks = shapes
        .cells()
        .iter()
        .map(|shape| ctx.zeros(shape.clone()))
        .collect::<Result<Vec<Chunk>, _>>()?;
    Ok(Grid::from_cells(chunks, shapes.bounds().clone())?)
}

// ============================================================================
// Graph Inspection
// ============================================================================

/// `(data nodes, op nodes)` currently in the graph.
pub fn node_counts(ctx: &GraphContext) -> anyhow::Result<(usize, usize)> {
    Ok(ctx.with_graph(|g| (g.num_data_nodes(), g.num_op_nodes()))?)
}

/// Offset of every chunk of `grid`, in enumeration order.
pub fn offsets_of(ctx: &GraphContext, grid: &ChunkGrid) -> anyhow::Result<Vec<Extent>> {
    grid.cells()
        .iter()
        .map(|&c| -> anyhow::Result<Extent> { Ok(ctx.descriptor(c)?.offset) })
        .collect()
}

/// Expected offsets of a Cartesian partition: prefix sums per axis.
pub fn prefix_offsets(axis_sizes: &[Vec<usize>]) -> Vec<Extent> {
    let starts: Vec<Vec<usize>> = axis_sizes
        .iter()
        .map(|sizes| {
            sizes
                .iter()
                .scan(0, |acc, &s| {
                    let start = *acc;
                    *acc += s;
                    Some(start)
                })
                .collect()
        })
        .collect();
    let bounds = Extent::new(axis_sizes.iter().map(Vec::len).collect::<Vec<_>>());
    Extent::positions(&bounds)
        .map(|pos| {
            Extent::new(
                starts
                    .iter()
                    .zip(pos.dims())
                    .map(|(s, &p)| s[p])
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}
