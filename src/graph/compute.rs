//! Opaque computation units attached to operation nodes.
//!
//! The graph only records which unit an operation runs; executing it is the
//! job of a [`ChunkBackend`](crate::executor::ChunkBackend), which dispatches
//! on [`ComputeKind`].

use std::fmt;
use std::sync::Arc;

use crate::graph::Placement;

/// User-defined computation recorded in the graph.
///
/// Backends that support custom units dispatch on [`CustomCompute::name`].
pub trait CustomCompute: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Free-form parameter summary for graph dumps.
    fn describe(&self) -> String {
        String::new()
    }
}

/// What an operation node computes.
#[derive(Debug, Clone)]
pub enum ComputeKind {
    /// Fill every output element with `value`
    Fill { value: f32 },
    /// Normally distributed fill
    Randn { mean: f32, variance: f32 },
    /// Place every input block at its offset inside the single output
    Assemble,
    /// Cut the single input into the outputs at their offsets
    Split,
    Custom(Arc<dyn CustomCompute>),
}

impl ComputeKind {
    pub fn name(&self) -> &str {
        match self {
            ComputeKind::Fill { .. } => "fill",
            ComputeKind::Randn { .. } => "randn",
            ComputeKind::Assemble => "assemble",
            ComputeKind::Split => "split",
            ComputeKind::Custom(unit) => unit.name(),
        }
    }

    /// Closure parameters rendered for dumps.
    pub fn params(&self) -> String {
        match self {
            ComputeKind::Fill { value } => format!("value={}", value),
            ComputeKind::Randn { mean, variance } => {
                format!("mean={}, variance={}", mean, variance)
            }
            ComputeKind::Assemble | ComputeKind::Split => String::new(),
            ComputeKind::Custom(unit) => unit.describe(),
        }
    }
}

/// A compute kind plus the placement its outputs inherit.
#[derive(Debug, Clone)]
pub struct ComputeUnit {
    pub kind: ComputeKind,
    pub placement: Placement,
}

impl ComputeUnit {
    pub fn new(kind: ComputeKind) -> Self {
        Self {
            kind,
            placement: Placement::Unassigned,
        }
    }

    pub fn fill(value: f32) -> Self {
        Self::new(ComputeKind::Fill { value })
    }

    pub fn randn(mean: f32, variance: f32) -> Self {
        Self::new(ComputeKind::Randn { mean, variance })
    }

    pub fn assemble() -> Self {
        Self::new(ComputeKind::Assemble)
    }

    pub fn split() -> Self {
        Self::new(ComputeKind::Split)
    }

    pub fn custom(unit: Arc<dyn CustomCompute>) -> Self {
        Self::new(ComputeKind::Custom(unit))
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

impl fmt::Display for ComputeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.kind.params();
        if params.is_empty() {
            write!(f, "{}@{}", self.kind.name(), self.placement)
        } else {
            write!(f, "{}({})@{}", self.kind.name(), params, self.placement)
        }
    }
}
