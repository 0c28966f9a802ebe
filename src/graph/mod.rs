//! Dependency graph of data blocks and the operations producing them.
//!
//! Data nodes describe one block each (shape, offset, grid position,
//! placement); operation nodes link an ordered list of input blocks to an
//! ordered list of output blocks through an opaque compute unit. The graph
//! only records intent: an external executor walks it later.

pub(crate) mod builder;
pub mod compute;
pub mod context;
pub mod dag;
pub mod descriptor;
pub mod extent;
pub mod id;
pub mod node;
pub mod snapshot;

pub use compute::{ComputeKind, ComputeUnit, CustomCompute};
pub use context::GraphContext;
pub use dag::{Graph, GraphId};
pub use descriptor::{BlockDescriptor, DeviceId, Placement};
pub use extent::{Extent, GridPositions};
pub use id::{DataIdGenerator, SequentialIdGenerator};
pub use node::{DataId, DataNode, DataNodeId, OpNode, OpNodeId};
pub use snapshot::{DataNodeSnapshot, GraphSnapshot, OpNodeSnapshot};
