//! Explicit graph context shared by every graph-building call.
//!
//! A context owns one dependency graph behind a mutex together with the
//! identifier generator and builder configuration. Each builder call takes the
//! lock exactly once, so concurrent callers are serialized and every call
//! either commits completely or leaves the graph untouched.
//!
//! ```text
//! caller ──compute/split/merge──> GraphContext
//!                                   ├── Mutex<Graph>            (nodes + edges)
//!                                   ├── Arc<dyn DataIdGenerator> (one id per data node)
//!                                   └── BuildConfig
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use crate::chunk::Chunk;
use crate::config::BuildConfig;
use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::builder::{build_op, BuildRequest};
use crate::graph::{
    BlockDescriptor, ComputeUnit, DataIdGenerator, Extent, Graph, GraphSnapshot,
    SequentialIdGenerator,
};

pub struct GraphContext {
    graph: Mutex<Graph>,
    ids: Arc<dyn DataIdGenerator>,
    config: BuildConfig,
}

impl GraphContext {
    /// Context with default configuration and a fresh sequential id generator.
    pub fn new() -> Self {
        Self::with_config(BuildConfig::default())
    }

    pub fn with_config(config: BuildConfig) -> Self {
        Self::with_id_generator(Arc::new(SequentialIdGenerator::new()), config)
    }

    /// Use an externally owned identifier allocator, e.g. one shared with a
    /// storage layer.
    pub fn with_id_generator(ids: Arc<dyn DataIdGenerator>, config: BuildConfig) -> Self {
        Self {
            graph: Mutex::new(Graph::new()),
            ids,
            config,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub(crate) fn lock(&self) -> GraphResult<MutexGuard<'_, Graph>> {
        Ok(self.graph.lock()?)
    }

    pub(crate) fn ids(&self) -> &dyn DataIdGenerator {
        self.ids.as_ref()
    }

    /// Run `f` with read access to the graph.
    pub fn with_graph<F, R>(&self, f: F) -> GraphResult<R>
    where
        F: FnOnce(&Graph) -> R,
    {
        let graph = self.lock()?;
        Ok(f(&graph))
    }

    /// Record an operation reading `inputs` and producing one new chunk per
    /// entry of `result_shapes`, in order.
    ///
    /// Nothing is computed; the executor runs `unit` later.
    ///
    /// # Errors
    /// - `InvalidChunk` if an input references no node of this graph
    /// - `InvalidShape` if a result shape is rejected by the configuration
    /// - `DuplicateDataId` if the id generator repeats itself
    pub fn compute(
        &self,
        inputs: &[Chunk],
        result_shapes: &[Extent],
        unit: ComputeUnit,
    ) -> GraphResult<Vec<Chunk>> {
        let mut graph = self.lock()?;
        let result = build_op(
            &mut graph,
            self.ids(),
            &self.config,
            BuildRequest {
                inputs,
                result_shapes,
                unit,
            },
        );
        match result {
            Ok((_, chunks)) => Ok(chunks),
            Err(e) => {
                tracing::warn!(error = %e, "rejected compute request");
                Err(e)
            }
        }
    }

    /// Copy of the chunk's current descriptor.
    pub fn descriptor(&self, chunk: Chunk) -> GraphResult<BlockDescriptor> {
        let graph = self.lock()?;
        let id = graph.resolve(chunk)?;
        let node = graph
            .data_node(id)
            .ok_or_else(|| ChunkGraphError::InvalidChunk(format!("{:?}", chunk)))?;
        Ok(node.descriptor().clone())
    }

    pub fn shape(&self, chunk: Chunk) -> GraphResult<Extent> {
        Ok(self.descriptor(chunk)?.shape)
    }

    pub fn snapshot(&self) -> GraphResult<GraphSnapshot> {
        self.with_graph(GraphSnapshot::capture)
    }

    /// Human-readable dump of every node and edge.
    pub fn dump(&self) -> GraphResult<String> {
        self.with_graph(|graph| graph.to_string())
    }
}

impl Default for GraphContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DataId, DeviceId, Placement};

    #[test]
    fn test_compute_returns_one_chunk_per_shape() {
        let ctx = GraphContext::new();
        let a = ctx.constant(Extent::from([4, 4]), 1.0).unwrap();

        let shapes = [Extent::from([4, 2]), Extent::from([4, 1]), Extent::from([4, 1])];
        let out = ctx.compute(&[a], &shapes, ComputeUnit::split()).unwrap();

        assert_eq!(out.len(), 3);
        for (chunk, shape) in out.iter().zip(shapes.iter()) {
            assert_eq!(&ctx.shape(*chunk).unwrap(), shape);
        }
    }

    #[test]
    fn test_compute_passes_placement_through() {
        let ctx = GraphContext::new();
        let device = Placement::Device(DeviceId(7));
        let out = ctx
            .compute(
                &[],
                &[Extent::from([2])],
                ComputeUnit::fill(3.0).with_placement(device),
            )
            .unwrap();

        assert_eq!(ctx.descriptor(out[0]).unwrap().placement, device);
        ctx.with_graph(|graph| {
            let (_, op) = graph.op_nodes().next().unwrap();
            assert_eq!(op.placement(), device);
        })
        .unwrap();
    }

    #[test]
    fn test_compute_rejects_foreign_chunk() {
        let ctx = GraphContext::new();
        let other = GraphContext::new();
        let foreign = other.constant(Extent::from([2]), 0.0).unwrap();

        let err = ctx
            .compute(&[foreign], &[Extent::from([2])], ComputeUnit::fill(0.0))
            .unwrap_err();
        assert!(matches!(err, ChunkGraphError::InvalidChunk(_)));
        assert_eq!(ctx.with_graph(|g| g.num_data_nodes()).unwrap(), 0);
    }

    #[test]
    fn test_shared_id_generator() {
        let ids: Arc<dyn DataIdGenerator> = Arc::new(SequentialIdGenerator::starting_at(100));
        let first = GraphContext::with_id_generator(ids.clone(), BuildConfig::default());
        let second = GraphContext::with_id_generator(ids, BuildConfig::default());

        first.constant(Extent::from([1]), 0.0).unwrap();
        second.constant(Extent::from([1]), 0.0).unwrap();

        let id_of = |ctx: &GraphContext| {
            ctx.with_graph(|g| g.data_nodes().next().map(|(_, n)| n.data_id()))
                .unwrap()
        };
        assert_eq!(id_of(&first), Some(DataId(100)));
        assert_eq!(id_of(&second), Some(DataId(101)));
    }

    #[test]
    fn test_descriptor_of_default_chunk_fails() {
        let ctx = GraphContext::new();
        assert!(ctx.descriptor(Chunk::default()).is_err());
    }

    #[test]
    fn test_dump_mentions_ops() {
        let ctx = GraphContext::new();
        ctx.ones(Extent::from([3])).unwrap();
        let dump = ctx.dump().unwrap();
        assert!(dump.contains("op #0 fill(value=1)@unassigned [] -> [#0]"));
    }

    #[test]
    fn test_concurrent_builders_keep_ids_unique() {
        let ctx = Arc::new(GraphContext::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = ctx.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        ctx.zeros(Extent::from([2, 2])).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        ctx.with_graph(|graph| {
            assert_eq!(graph.num_data_nodes(), 100);
            assert_eq!(graph.num_op_nodes(), 100);
            let unique: std::collections::HashSet<_> =
                graph.data_nodes().map(|(_, n)| n.data_id()).collect();
            assert_eq!(unique.len(), 100);
        })
        .unwrap();
    }
}
