//! Dense N-dimensional grids.
//!
//! Cells are stored flat in enumeration order (first axis fastest), the same
//! order [`Extent::positions`] walks, so `cells()` is also the order merge
//! consumes inputs and split produces outputs.

use std::ops::{Index, IndexMut};

use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::Extent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    cells: Vec<T>,
    bounds: Extent,
}

impl<T: Clone + Default> Grid<T> {
    /// Grid with every cell set to `T::default()`.
    pub fn new(bounds: Extent) -> Self {
        Self {
            cells: vec![T::default(); bounds.num_elements()],
            bounds,
        }
    }
}

impl<T> Grid<T> {
    /// Wrap cells already laid out in enumeration order.
    pub fn from_cells(cells: Vec<T>, bounds: Extent) -> GraphResult<Self> {
        if cells.len() != bounds.num_elements() {
            return Err(ChunkGraphError::InvalidShape(format!(
                "{} cells cannot fill grid bounds {}",
                cells.len(),
                bounds
            )));
        }
        Ok(Self { cells, bounds })
    }

    pub fn bounds(&self) -> &Extent {
        &self.bounds
    }

    pub fn rank(&self) -> usize {
        self.bounds.rank()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, pos: &Extent) -> Option<&T> {
        Extent::flat_index(pos, &self.bounds).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: &Extent) -> Option<&mut T> {
        Extent::flat_index(pos, &self.bounds).map(move |i| &mut self.cells[i])
    }

    pub fn set(&mut self, pos: &Extent, value: T) -> GraphResult<()> {
        let bounds = self.bounds.clone();
        let cell = self.get_mut(pos).ok_or_else(|| {
            ChunkGraphError::InvalidShape(format!("position {} outside grid {}", pos, bounds))
        })?;
        *cell = value;
        Ok(())
    }

    /// Cells in enumeration order.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    /// `(position, cell)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Extent, &T)> {
        Extent::positions(&self.bounds).zip(self.cells.iter())
    }

    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            cells: self.cells.iter().map(f).collect(),
            bounds: self.bounds.clone(),
        }
    }
}

impl<T> Index<&Extent> for Grid<T> {
    type Output = T;

    /// # Panics
    /// Panics if `pos` lies outside the grid.
    fn index(&self, pos: &Extent) -> &T {
        match self.get(pos) {
            Some(cell) => cell,
            None => panic!("position {} outside grid {}", pos, self.bounds),
        }
    }
}

impl<T> IndexMut<&Extent> for Grid<T> {
    fn index_mut(&mut self, pos: &Extent) -> &mut T {
        let bounds = self.bounds.clone();
        match self.get_mut(pos) {
            Some(cell) => cell,
            None => panic!("position {} outside grid {}", pos, bounds),
        }
    }
}

impl Grid<Extent> {
    /// Cartesian part-shape grid: the cell at `pos` has shape
    /// `[axis_sizes[0][pos[0]], axis_sizes[1][pos[1]], ...]`.
    pub fn from_axis_sizes(axis_sizes: &[Vec<usize>]) -> Self {
        let bounds = Extent::new(axis_sizes.iter().map(Vec::len).collect::<Vec<_>>());
        let cells = Extent::positions(&bounds)
            .map(|pos| {
                Extent::new(
                    axis_sizes
                        .iter()
                        .zip(pos.dims())
                        .map(|(sizes, &p)| sizes[p])
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        Self { cells, bounds }
    }

    /// Cut `shape` into tiles of at most `tile` per axis; the last tile along
    /// an axis takes the remainder.
    pub fn tiles(shape: &Extent, tile: &Extent) -> GraphResult<Self> {
        if shape.rank() != tile.rank() {
            return Err(ChunkGraphError::RankMismatch {
                expected: shape.rank(),
                actual: tile.rank(),
            });
        }
        if tile.dims().contains(&0) {
            return Err(ChunkGraphError::InvalidShape(format!(
                "tile {} has a zero-length axis",
                tile
            )));
        }

        let axis_sizes: Vec<Vec<usize>> = shape
            .dims()
            .iter()
            .zip(tile.dims())
            .map(|(&len, &step)| {
                (0..len)
                    .step_by(step)
                    .map(|start| step.min(len - start))
                    .collect()
            })
            .collect();
        Ok(Self::from_axis_sizes(&axis_sizes))
    }

    /// Per-axis sizes of a Cartesian partition.
    ///
    /// Fails with `RankMismatch` if a cell's rank differs from the grid rank,
    /// and with `PartitionViolation` if some cell's size along axis `i`
    /// depends on a coordinate other than its own coordinate along `i`.
    pub fn axis_sizes(&self) -> GraphResult<Vec<Vec<usize>>> {
        let rank = self.rank();
        let mut sizes: Vec<Vec<Option<usize>>> =
            self.bounds.dims().iter().map(|&n| vec![None; n]).collect();

        for (pos, shape) in self.iter() {
            if shape.rank() != rank {
                return Err(ChunkGraphError::RankMismatch {
                    expected: rank,
                    actual: shape.rank(),
                });
            }
            for axis in 0..rank {
                let slot = &mut sizes[axis][pos[axis]];
                let seen = *slot;
                match seen {
                    None => *slot = Some(shape[axis]),
                    Some(expected) if expected != shape[axis] => {
                        return Err(ChunkGraphError::PartitionViolation(format!(
                            "cell {} has size {} along axis {}, other cells in slice {} have {}",
                            pos, shape[axis], axis, pos[axis], expected
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(sizes
            .into_iter()
            .map(|axis| axis.into_iter().map(|s| s.unwrap_or(0)).collect())
            .collect())
    }
}
