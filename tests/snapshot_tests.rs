//! Integration tests for graph snapshots and dumps

mod common;

use chunkgraph::{Extent, Grid, GraphContext, GraphSnapshot};
use common::{create_temp_dir, create_temp_file_with_suffix};

fn small_graph() -> anyhow::Result<GraphContext> {
    let ctx = GraphContext::new();
    let a = ctx.constant(Extent::from([4, 2]), 0.5)?;
    let parts = ctx.split(a, &Grid::from_axis_sizes(&[vec![1, 3], vec![2]]))?;
    ctx.merge(&parts)?;
    Ok(ctx)
}

#[test]
fn test_write_json_round_trips_through_file() -> anyhow::Result<()> {
    let ctx = small_graph()?;
    let file = create_temp_file_with_suffix(".json")?;

    let snapshot = ctx.snapshot()?;
    snapshot.write_json(file.path())?;

    let text = std::fs::read_to_string(file.path())?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["data_nodes"].as_array().map(Vec::len), Some(4));
    assert_eq!(value["op_nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["op_nodes"][2]["kind"], "assemble");
    assert_eq!(value["op_nodes"][2]["inputs"], serde_json::json!([1, 2]));
    assert_eq!(
        value["data_nodes"][2]["descriptor"]["offset"],
        serde_json::json!([1, 0])
    );
    Ok(())
}

#[test]
fn test_write_json_into_missing_directory_fails() -> anyhow::Result<()> {
    let ctx = small_graph()?;
    let dir = create_temp_dir()?;
    let path = dir.path().join("missing").join("graph.json");

    let err = ctx.snapshot()?.write_json(&path).unwrap_err();
    assert!(matches!(err, chunkgraph::ChunkGraphError::Io(_)));
    assert!(err.is_internal_error());
    Ok(())
}

#[test]
fn test_snapshot_of_empty_graph() -> anyhow::Result<()> {
    let ctx = GraphContext::new();
    let snapshot: GraphSnapshot = ctx.snapshot()?;
    assert!(snapshot.data_nodes.is_empty());
    assert!(snapshot.op_nodes.is_empty());
    Ok(())
}

#[test]
fn test_dump_lists_every_node() -> anyhow::Result<()> {
    let ctx = small_graph()?;
    let dump = ctx.dump()?;

    assert!(dump.contains("(4 data nodes, 3 op nodes)"));
    assert!(dump.contains("op #1 split@unassigned [#0] -> [#1, #2]"));
    assert!(dump.contains("op #2 assemble@unassigned [#1, #2] -> [#3]"));
    Ok(())
}
