//! Graph executor interface.
//!
//! The graph layer only records intent. An executor orders the recorded
//! operations, asks a [`ChunkBackend`] for storage and hands every operation
//! to it. [`RecordingBackend`] is the host-only backend used by tests.

pub mod backend;
pub mod recording;

pub use backend::ChunkBackend;
pub use recording::{RecordedBuffer, RecordingBackend, RecordingBackendStats};

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::{Graph, GraphContext, OpNodeId};

/// Configuration for graph execution.
#[derive(Debug, Clone, Default)]
pub struct ExecuteConfig {
    /// Free intermediate buffers once their last consumer has run.
    pub free_intermediates: bool,
}

impl ExecuteConfig {
    pub fn with_freeing() -> Self {
        Self {
            free_intermediates: true,
        }
    }

    pub fn without_freeing() -> Self {
        Self {
            free_intermediates: false,
        }
    }
}

/// Summary of one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    pub ops_executed: usize,
    pub buffers_allocated: usize,
    pub buffers_freed: usize,
}

/// Topological order of the operation nodes.
///
/// Kahn's algorithm over producer -> consumer edges; among ready operations
/// the one created first runs first, so the order is deterministic.
pub fn execution_order(graph: &Graph) -> Vec<OpNodeId> {
    let num_ops = graph.num_op_nodes();
    let mut pending = vec![0usize; num_ops];
    let mut dependents: Vec<Vec<OpNodeId>> = vec![Vec::new(); num_ops];

    for (id, op) in graph.op_nodes() {
        let mut producers: Vec<OpNodeId> = op
            .inputs()
            .iter()
            .filter_map(|&input| graph.producer_of(input))
            .filter(|&producer| producer != id)
            .collect();
        producers.sort();
        producers.dedup();

        pending[id.index()] = producers.len();
        for producer in producers {
            dependents[producer.index()].push(id);
        }
    }

    let mut ready: BinaryHeap<Reverse<OpNodeId>> = graph
        .op_nodes()
        .filter(|(id, _)| pending[id.index()] == 0)
        .map(|(id, _)| Reverse(id))
        .collect();

    let mut order = Vec::with_capacity(num_ops);
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        for &next in &dependents[id.index()] {
            pending[next.index()] -= 1;
            if pending[next.index()] == 0 {
                ready.push(Reverse(next));
            }
        }
    }
    order
}

/// Execute every operation of `graph` on `backend`.
///
/// # Arguments
/// - `backend`: Storage and kernels
/// - `graph`: Graph to run, read only
/// - `config`: Execution configuration
///
/// # Returns
/// Counts of executed operations and allocated or freed buffers
pub fn execute_graph_with_config<B: ChunkBackend>(
    backend: &mut B,
    graph: &Graph,
    config: &ExecuteConfig,
) -> GraphResult<ExecuteResult> {
    let order = execution_order(graph);
    if order.len() != graph.num_op_nodes() {
        return Err(ChunkGraphError::Internal(format!(
            "dependency cycle: only {} of {} operations can be ordered",
            order.len(),
            graph.num_op_nodes()
        )));
    }

    tracing::info!(
        graph = ?graph.id(),
        ops = order.len(),
        data = graph.num_data_nodes(),
        "executing graph"
    );

    let mut result = ExecuteResult::default();

    // Allocate buffers for all data nodes
    for (id, node) in graph.data_nodes() {
        if !backend.has_buffer(id) {
            backend.alloc(id, node)?;
            result.buffers_allocated += 1;
        }
    }

    let mut remaining: Vec<usize> = graph
        .data_nodes()
        .map(|(id, _)| graph.consumers_of(id).len())
        .collect();

    for id in order {
        let op = graph
            .op_node(id)
            .ok_or_else(|| ChunkGraphError::Internal(format!("op #{} vanished", id.index())))?;
        tracing::debug!(op = id.index(), unit = %op.compute_unit(), "executing operation");
        backend.execute_op(id, op, graph)?;
        result.ops_executed += 1;

        if config.free_intermediates {
            let mut inputs = op.inputs().to_vec();
            inputs.sort();
            inputs.dedup();
            for input in inputs {
                remaining[input.index()] -= 1;
                if remaining[input.index()] == 0 && backend.has_buffer(input) {
                    backend.free(input)?;
                    result.buffers_freed += 1;
                }
            }
        }
    }

    backend.synchronize()?;
    tracing::info!(
        ops = result.ops_executed,
        allocated = result.buffers_allocated,
        freed = result.buffers_freed,
        "graph execution finished"
    );
    Ok(result)
}

/// Execute the graph held by `ctx`. The context stays locked until the
/// backend has synchronized.
pub fn execute_graph<B: ChunkBackend>(
    backend: &mut B,
    ctx: &GraphContext,
    config: ExecuteConfig,
) -> GraphResult<ExecuteResult> {
    ctx.with_graph(|graph| execute_graph_with_config(backend, graph, &config))?
}
