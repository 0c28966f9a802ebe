//! Operation registration: allocate output data nodes and link them to their
//! inputs through one operation node.

use std::collections::HashSet;

use crate::chunk::Chunk;
use crate::config::BuildConfig;
use crate::error::{ChunkGraphError, GraphResult};
use crate::graph::{
    BlockDescriptor, ComputeUnit, DataIdGenerator, DataNode, DataNodeId, Extent, Graph, OpNode,
    OpNodeId,
};

/// Everything one builder call needs besides the graph itself.
pub(crate) struct BuildRequest<'a> {
    pub inputs: &'a [Chunk],
    pub result_shapes: &'a [Extent],
    pub unit: ComputeUnit,
}

/// Register one operation producing `result_shapes`.
///
/// All validation happens before the first node is pushed, so an error leaves
/// the graph untouched. Identifiers drawn from `ids` before a duplicate is
/// detected are simply discarded.
pub(crate) fn build_op(
    graph: &mut Graph,
    ids: &dyn DataIdGenerator,
    config: &BuildConfig,
    request: BuildRequest<'_>,
) -> GraphResult<(OpNodeId, Vec<Chunk>)> {
    let inputs = request
        .inputs
        .iter()
        .map(|&chunk| graph.resolve(chunk))
        .collect::<GraphResult<Vec<DataNodeId>>>()?;

    for shape in request.result_shapes {
        validate_result_shape(shape, config)?;
    }

    let mut fresh = HashSet::with_capacity(request.result_shapes.len());
    let data_ids = request
        .result_shapes
        .iter()
        .map(|_| {
            let data_id = ids.next_id();
            if graph.contains_data_id(data_id) || !fresh.insert(data_id) {
                return Err(ChunkGraphError::DuplicateDataId(data_id.0));
            }
            Ok(data_id)
        })
        .collect::<GraphResult<Vec<_>>>()?;

    let placement = request.unit.placement;
    let outputs: Vec<DataNodeId> = request
        .result_shapes
        .iter()
        .zip(data_ids)
        .map(|(shape, data_id)| {
            graph.push_data_node(DataNode {
                data_id,
                descriptor: BlockDescriptor::new(shape.clone(), placement),
                producer: None,
            })
        })
        .collect();

    let chunks = outputs.iter().map(|&id| graph.chunk_for(id)).collect();
    let kind = request.unit.kind.name().to_string();
    let op = graph.push_op_node(OpNode {
        inputs,
        outputs,
        unit: request.unit,
    });

    tracing::debug!(
        op = op.index(),
        kind = %kind,
        placement = %placement,
        num_inputs = request.inputs.len(),
        num_outputs = request.result_shapes.len(),
        "registered operation"
    );

    Ok((op, chunks))
}

fn validate_result_shape(shape: &Extent, config: &BuildConfig) -> GraphResult<()> {
    if shape.rank() == 0 && !config.allow_scalar_shapes {
        return Err(ChunkGraphError::InvalidShape(
            "rank-0 result shape not allowed".into(),
        ));
    }
    if !config.allow_empty_axes && shape.dims().contains(&0) {
        return Err(ChunkGraphError::InvalidShape(format!(
            "result shape {} has a zero-length axis",
            shape
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DataId, Placement, SequentialIdGenerator};

    /// Hands out the same identifier every time
    struct StuckIds;

    impl DataIdGenerator for StuckIds {
        fn next_id(&self) -> DataId {
            DataId(42)
        }
    }

    fn build(
        graph: &mut Graph,
        ids: &dyn DataIdGenerator,
        config: &BuildConfig,
        inputs: &[Chunk],
        shapes: &[Extent],
    ) -> GraphResult<(OpNodeId, Vec<Chunk>)> {
        build_op(
            graph,
            ids,
            config,
            BuildRequest {
                inputs,
                result_shapes: shapes,
                unit: ComputeUnit::fill(0.0),
            },
        )
    }

    #[test]
    fn test_build_op_creates_outputs() {
        let mut graph = Graph::new();
        let ids = SequentialIdGenerator::new();
        let config = BuildConfig::default();

        let (op, chunks) = build(
            &mut graph,
            &ids,
            &config,
            &[],
            &[Extent::from([2, 2]), Extent::from([3])],
        )
        .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(graph.num_data_nodes(), 2);
        assert_eq!(graph.num_op_nodes(), 1);
        for chunk in &chunks {
            let id = graph.resolve(*chunk).unwrap();
            assert_eq!(graph.producer_of(id), Some(op));
            assert_eq!(
                graph.data_node(id).unwrap().descriptor().placement,
                Placement::Unassigned
            );
        }
    }

    #[test]
    fn test_scalar_shape_rejected_by_default() {
        let mut graph = Graph::new();
        let ids = SequentialIdGenerator::new();

        let err = build(&mut graph, &ids, &BuildConfig::default(), &[], &[Extent::origin(0)])
            .unwrap_err();
        assert!(matches!(err, ChunkGraphError::InvalidShape(_)));
        assert_eq!(graph.num_data_nodes(), 0);

        let config = BuildConfig::new().with_scalar_shapes(true);
        assert!(build(&mut graph, &ids, &config, &[], &[Extent::origin(0)]).is_ok());
    }

    #[test]
    fn test_empty_axis_rejected_when_configured() {
        let mut graph = Graph::new();
        let ids = SequentialIdGenerator::new();
        let config = BuildConfig::new().with_empty_axes(false);

        assert!(build(&mut graph, &ids, &config, &[], &[Extent::from([0, 4])]).is_err());
        assert!(build(
            &mut graph,
            &ids,
            &BuildConfig::default(),
            &[],
            &[Extent::from([0, 4])]
        )
        .is_ok());
    }

    #[test]
    fn test_duplicate_ids_leave_graph_untouched() {
        let mut graph = Graph::new();
        let config = BuildConfig::default();

        // Two outputs in one call collide with each other
        let err = build(
            &mut graph,
            &StuckIds,
            &config,
            &[],
            &[Extent::from([1]), Extent::from([1])],
        )
        .unwrap_err();
        assert!(matches!(err, ChunkGraphError::DuplicateDataId(42)));
        assert_eq!(graph.num_data_nodes(), 0);
        assert_eq!(graph.num_op_nodes(), 0);

        // A later call collides with an existing node
        build(&mut graph, &StuckIds, &config, &[], &[Extent::from([1])]).unwrap();
        assert!(build(&mut graph, &StuckIds, &config, &[], &[Extent::from([1])]).is_err());
        assert_eq!(graph.num_data_nodes(), 1);
    }

    #[test]
    fn test_invalid_input_leaves_graph_untouched() {
        let mut graph = Graph::new();
        let ids = SequentialIdGenerator::new();

        let err = build(
            &mut graph,
            &ids,
            &BuildConfig::default(),
            &[Chunk::default()],
            &[Extent::from([2])],
        )
        .unwrap_err();
        assert!(matches!(err, ChunkGraphError::InvalidChunk(_)));
        assert_eq!(graph.num_data_nodes(), 0);
        assert_eq!(graph.num_op_nodes(), 0);
    }
}
