//! Shape vectors and mixed-radix grid enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index};

/// Immutable vector of non-negative integers, one per dimension.
///
/// Used for chunk shapes, offsets, grid positions and grid bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extent {
    dims: Vec<usize>,
}

impl Extent {
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        Extent { dims: dims.into() }
    }

    /// All-zero extent of the given rank.
    pub fn origin(rank: usize) -> Self {
        Extent {
            dims: vec![0; rank],
        }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total element count. The product of an empty extent is 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_origin(&self) -> bool {
        self.dims.iter().all(|&d| d == 0)
    }

    pub fn map<F>(&self, f: F) -> Extent
    where
        F: Fn(usize) -> usize,
    {
        Extent {
            dims: self.dims.iter().map(|&d| f(d)).collect(),
        }
    }

    /// Cell whose every coordinate is one less, clamped at zero.
    pub fn diagonal_predecessor(&self) -> Extent {
        self.map(|d| d.saturating_sub(1))
    }

    /// Elementwise maximum. `None` if the ranks differ.
    pub fn max(&self, other: &Extent) -> Option<Extent> {
        self.zip_with(other, usize::max)
    }

    /// Elementwise sum. `None` if the ranks differ.
    pub fn checked_add(&self, other: &Extent) -> Option<Extent> {
        self.zip_with(other, |a, b| a + b)
    }

    fn zip_with<F>(&self, other: &Extent, f: F) -> Option<Extent>
    where
        F: Fn(usize, usize) -> usize,
    {
        if self.rank() != other.rank() {
            return None;
        }
        Some(Extent {
            dims: self
                .dims
                .iter()
                .zip(other.dims.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Advance this position by one inside `[origin, bounds)`.
    ///
    /// The first dimension varies fastest and carries into the next one.
    /// Returns `true` when the counter wrapped back to the origin, i.e. the
    /// enumeration is exhausted.
    ///
    /// # Panics
    /// Panics if `bounds` has a different rank.
    pub fn increment(&mut self, bounds: &Extent) -> bool {
        assert_eq!(
            self.rank(),
            bounds.rank(),
            "position {} and bounds {} differ in rank",
            self,
            bounds
        );
        for (d, &b) in self.dims.iter_mut().zip(bounds.dims.iter()) {
            *d += 1;
            if *d < b {
                return false;
            }
            *d = 0;
        }
        true
    }

    /// Iterate every position in `[origin, bounds)` in enumeration order.
    pub fn positions(bounds: &Extent) -> GridPositions {
        GridPositions {
            next: if bounds.num_elements() == 0 {
                None
            } else {
                Some(Extent::origin(bounds.rank()))
            },
            bounds: bounds.clone(),
        }
    }

    /// Flat storage index of `pos` within `bounds` (first dimension fastest).
    ///
    /// `None` if the ranks differ or `pos` lies outside the bounds.
    pub fn flat_index(pos: &Extent, bounds: &Extent) -> Option<usize> {
        if pos.rank() != bounds.rank() {
            return None;
        }
        let mut index = 0;
        let mut stride = 1;
        for (&p, &b) in pos.dims.iter().zip(bounds.dims.iter()) {
            if p >= b {
                return None;
            }
            index += p * stride;
            stride *= b;
        }
        Some(index)
    }
}

impl Index<usize> for Extent {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.dims[axis]
    }
}

impl Add for &Extent {
    type Output = Extent;

    /// # Panics
    /// Panics if the ranks differ; use [`Extent::checked_add`] otherwise.
    fn add(self, rhs: &Extent) -> Extent {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("cannot add extents {} and {}", self, rhs),
        }
    }
}

impl From<Vec<usize>> for Extent {
    fn from(dims: Vec<usize>) -> Self {
        Extent { dims }
    }
}

impl From<&[usize]> for Extent {
    fn from(dims: &[usize]) -> Self {
        Extent {
            dims: dims.to_vec(),
        }
    }
}

impl<const N: usize> From<[usize; N]> for Extent {
    fn from(dims: [usize; N]) -> Self {
        Extent {
            dims: dims.to_vec(),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

/// Iterator over every grid position inside a bound.
#[derive(Debug, Clone)]
pub struct GridPositions {
    next: Option<Extent>,
    bounds: Extent,
}

impl Iterator for GridPositions {
    type Item = Extent;

    fn next(&mut self) -> Option<Extent> {
        let current = self.next.take()?;
        let mut advanced = current.clone();
        if !advanced.increment(&self.bounds) {
            self.next = Some(advanced);
        }
        Some(current)
    }
}
