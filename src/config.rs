//! Builder configuration for graph construction.

use serde::{Deserialize, Serialize};

use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::Placement;

const ALLOW_SCALAR_SHAPES_ENV: &str = "CHUNKGRAPH_ALLOW_SCALAR_SHAPES";
const ALLOW_EMPTY_AXES_ENV: &str = "CHUNKGRAPH_ALLOW_EMPTY_AXES";
const VALIDATE_PARTITIONS_ENV: &str = "CHUNKGRAPH_VALIDATE_PARTITIONS";

/// Controls which shapes the graph builder accepts and whether split/merge
/// check the Cartesian partitioning of their grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Accept rank-0 result shapes
    pub allow_scalar_shapes: bool,
    /// Accept result shapes with a zero-length axis
    pub allow_empty_axes: bool,
    /// Reject grids that are not a Cartesian tiling in split/merge
    pub validate_partitions: bool,
    /// Placement of generator, split and merge outputs
    pub default_placement: Placement,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            allow_scalar_shapes: false,
            allow_empty_axes: true,
            validate_partitions: false,
            default_placement: Placement::Unassigned,
        }
    }
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scalar_shapes(mut self, allow: bool) -> Self {
        self.allow_scalar_shapes = allow;
        self
    }

    pub fn with_empty_axes(mut self, allow: bool) -> Self {
        self.allow_empty_axes = allow;
        self
    }

    pub fn with_partition_validation(mut self, enabled: bool) -> Self {
        self.validate_partitions = enabled;
        self
    }

    pub fn with_default_placement(mut self, placement: Placement) -> Self {
        self.default_placement = placement;
        self
    }

    /// Read overrides from the `CHUNKGRAPH_*` environment variables.
    ///
    /// Unset variables keep their defaults. Accepted values are
    /// `1/0`, `true/false`, `yes/no`, `on/off`.
    pub fn from_env() -> GraphResult<Self> {
        let mut config = Self::default();

        if let Some(v) = read_bool_env(ALLOW_SCALAR_SHAPES_ENV)? {
            config.allow_scalar_shapes = v;
        }
        if let Some(v) = read_bool_env(ALLOW_EMPTY_AXES_ENV)? {
            config.allow_empty_axes = v;
        }
        if let Some(v) = read_bool_env(VALIDATE_PARTITIONS_ENV)? {
            config.validate_partitions = v;
        }

        Ok(config)
    }
}

fn read_bool_env(name: &str) -> GraphResult<Option<bool>> {
    match std::env::var(name) {
        Ok(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| ChunkGraphError::Config(format!("{}={:?} is not a boolean", name, raw))),
        Err(_) => Ok(None),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
