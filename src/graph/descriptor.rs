//! Per-chunk metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::Extent;

/// Opaque device handle issued by the external device layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

/// Where a block lives and where its producing operation runs.
///
/// The engine never interprets this; `Unassigned` leaves the decision to the
/// executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Placement {
    #[default]
    Unassigned,
    Device(DeviceId),
}

impl Placement {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Placement::Device(_))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Unassigned => write!(f, "unassigned"),
            Placement::Device(id) => write!(f, "device:{}", id.0),
        }
    }
}

/// Shape and layout metadata of one block.
///
/// `offset` and `grid_position` only mean something for members of a chunk
/// grid that went through the offset calculator; standalone blocks carry
/// all-zero vectors of the shape's rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDescriptor {
    pub shape: Extent,
    pub offset: Extent,
    pub grid_position: Extent,
    pub placement: Placement,
}

impl BlockDescriptor {
    pub fn new(shape: Extent, placement: Placement) -> Self {
        let rank = shape.rank();
        Self {
            shape,
            offset: Extent::origin(rank),
            grid_position: Extent::origin(rank),
            placement,
        }
    }

    /// One-past-the-end corner of this block inside its parent.
    pub fn end(&self) -> Extent {
        &self.offset + &self.shape
    }
}
