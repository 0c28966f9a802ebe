//! chunkgraph - Partitioned tensor dataflow graphs
//!
//! Builds a lazy dependency graph over blocks of N-dimensional tensors.
//! Callers create chunks with generators, record operations on them, and
//! split or merge them along a Cartesian grid. Nothing is computed while the
//! graph is built; an executor walks it later through a [`ChunkBackend`].
//!
//! ```rust,ignore
//! use chunkgraph::{Extent, Grid, GraphContext};
//!
//! let ctx = GraphContext::new();
//! let x = ctx.randn(Extent::from([10, 8]), 0.0, 1.0)?;
//! let parts = x.split(&ctx, &Grid::tiles(&Extent::from([10, 8]), &Extent::from([4, 4]))?)?;
//! let y = parts.merge(&ctx)?;
//! ```

#![allow(clippy::new_without_default)] // Graph::new allocates a fresh graph id

pub mod chunk;
pub mod config;
pub mod error;
pub mod executor;
pub mod graph;
pub mod logging;

pub use chunk::{Chunk, ChunkGrid, Grid};
pub use config::BuildConfig;
pub use error::{ChunkGraphError, ErrorCategory, GraphResult};
pub use executor::{execute_graph, execution_order, ChunkBackend, ExecuteConfig, RecordingBackend};
pub use graph::{
    BlockDescriptor, ComputeKind, ComputeUnit, CustomCompute, DataId, DataIdGenerator, DeviceId,
    Extent, Graph, GraphContext, GraphSnapshot, Placement, SequentialIdGenerator,
};
pub use logging::{init_logging_default, init_logging_from_env, LoggingConfig};
