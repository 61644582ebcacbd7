use bpmn_layout::graph::{Error as GraphError, NodeType, Point, ProcessGraph};
use bpmn_layout::{Layout, LayoutConfig, LayoutError, LayoutSummary, compute_layout, layout};

fn graph(nodes: &[(&str, NodeType)], flows: &[(&str, &str, &str)]) -> ProcessGraph {
    let mut g = ProcessGraph::new();
    for (id, t) in nodes {
        g.add_node(*id, *t).unwrap();
    }
    for (id, s, t) in flows {
        g.add_flow(*id, *s, *t).unwrap();
    }
    g
}

fn linear_chain() -> ProcessGraph {
    graph(
        &[
            ("start", NodeType::StartEvent),
            ("task", NodeType::Task),
            ("end", NodeType::EndEvent),
        ],
        &[("f1", "start", "task"), ("f2", "task", "end")],
    )
}

fn split_join() -> ProcessGraph {
    let doc = serde_json::json!({
        "nodes": [
            { "id": "start", "type": "startEvent", "outgoing": ["f1"] },
            { "id": "task1", "type": "task", "incoming": ["f1"], "outgoing": ["f2"] },
            { "id": "fork", "type": "parallelGateway", "incoming": ["f2"], "outgoing": ["f3", "f4"] },
            { "id": "task_a", "type": "task", "incoming": ["f3"], "outgoing": ["f5"] },
            { "id": "task_b", "type": "task", "incoming": ["f4"], "outgoing": ["f6"] },
            { "id": "join", "type": "parallelGateway", "incoming": ["f5", "f6"], "outgoing": ["f7"] },
            { "id": "end", "type": "endEvent", "incoming": ["f7"] }
        ],
        "flows": [
            { "id": "f1", "source": "start", "target": "task1" },
            { "id": "f2", "source": "task1", "target": "fork" },
            { "id": "f3", "source": "fork", "target": "task_a" },
            { "id": "f4", "source": "fork", "target": "task_b" },
            { "id": "f5", "source": "task_a", "target": "join" },
            { "id": "f6", "source": "task_b", "target": "join" },
            { "id": "f7", "source": "join", "target": "end" }
        ]
    });
    serde_json::from_value(doc).unwrap()
}

fn gateway_cycle() -> ProcessGraph {
    graph(
        &[
            ("task1", NodeType::Task),
            ("gateway", NodeType::ExclusiveGateway),
            ("task2", NodeType::Task),
        ],
        &[
            ("f1", "task1", "gateway"),
            ("f2", "gateway", "task2"),
            ("f3", "task2", "gateway"),
        ],
    )
}

fn loop_with_exclusive_branches() -> ProcessGraph {
    graph(
        &[
            ("start", NodeType::StartEvent),
            ("task1", NodeType::Task),
            ("fork", NodeType::ExclusiveGateway),
            ("task1_ex", NodeType::Task),
            ("task2_ex", NodeType::Task),
            ("join", NodeType::ExclusiveGateway),
            ("task2", NodeType::Task),
            ("end", NodeType::EndEvent),
        ],
        &[
            ("start_to_one", "start", "task1"),
            ("one_to_ex_fork", "task1", "fork"),
            ("ex_fork_to_ex_one", "fork", "task1_ex"),
            ("ex_two_to_ex_fork", "task2_ex", "fork"),
            ("ex_one_to_ex_join", "task1_ex", "join"),
            ("ex_join_to_ex_two", "join", "task2_ex"),
            ("ex_join_to_two", "join", "task2"),
            ("two_to_end", "task2", "end"),
        ],
    )
}

fn three_way_split() -> ProcessGraph {
    graph(
        &[
            ("start", NodeType::StartEvent),
            ("fork", NodeType::InclusiveGateway),
            ("a", NodeType::Task),
            ("b", NodeType::Task),
            ("c", NodeType::Task),
            ("join", NodeType::InclusiveGateway),
            ("end", NodeType::EndEvent),
        ],
        &[
            ("f0", "start", "fork"),
            ("f1", "fork", "a"),
            ("f2", "fork", "b"),
            ("f3", "fork", "c"),
            ("f4", "a", "join"),
            ("f5", "b", "join"),
            ("f6", "c", "join"),
            ("f7", "join", "end"),
        ],
    )
}

fn fixtures() -> Vec<(&'static str, ProcessGraph)> {
    vec![
        ("linear_chain", linear_chain()),
        ("split_join", split_join()),
        ("gateway_cycle", gateway_cycle()),
        ("loop_with_exclusive_branches", loop_with_exclusive_branches()),
        ("three_way_split", three_way_split()),
    ]
}

fn pts(points: &[(f64, f64)]) -> Vec<Point> {
    points.iter().map(|&p| p.into()).collect()
}

fn on_box(p: Point, node: &bpmn_layout::NodeLayout) -> bool {
    const EPS: f64 = 1e-9;
    p.x >= node.x - EPS
        && p.x <= node.x + node.width + EPS
        && p.y >= node.y - EPS
        && p.y <= node.y + node.height + EPS
}

#[test]
fn linear_chain_lays_out_on_one_row() {
    let l = compute_layout(&linear_chain(), &LayoutConfig::default()).unwrap();

    let columns: Vec<i32> = l.nodes.iter().map(|n| n.column).collect();
    let xs: Vec<f64> = l.nodes.iter().map(|n| n.x).collect();
    assert_eq!(columns, vec![1, 2, 3]);
    assert_eq!(xs, vec![200.0, 350.0, 500.0]);
    assert!(l.nodes.iter().all(|n| n.y == 150.0 && n.row == 1));

    assert_eq!(
        l.flow("f1").unwrap().waypoints,
        pts(&[(300.0, 200.0), (350.0, 200.0)])
    );
    assert_eq!(
        l.flow("f2").unwrap().waypoints,
        pts(&[(450.0, 200.0), (500.0, 200.0)])
    );
}

#[test]
fn split_join_fans_out_symmetrically() {
    let l = compute_layout(&split_join(), &LayoutConfig::default()).unwrap();
    let fork = l.node("fork").unwrap();
    let a = l.node("task_a").unwrap();
    let b = l.node("task_b").unwrap();
    let join = l.node("join").unwrap();

    assert_eq!((fork.row, fork.column), (1, 3));
    assert_eq!((fork.x, fork.y), (500.0, 150.0));
    assert_eq!(a.y, fork.y + 100.0);
    assert_eq!(b.y, fork.y - 100.0);
    assert_eq!(a.column, fork.column + 1);
    assert_eq!(b.column, fork.column + 1);
    assert_eq!(join.column, a.column.max(b.column) + 1);
    assert_eq!(join.row, (a.row + b.row) / 2);
    assert_eq!(join.row, fork.row);
    assert_eq!(l.node("end").unwrap().column, 6);
}

#[test]
fn split_join_waypoints() {
    let l = compute_layout(&split_join(), &LayoutConfig::default()).unwrap();

    // Out of the split gateway: vertical first, then into the left edge.
    assert_eq!(
        l.flow("f3").unwrap().waypoints,
        pts(&[(550.0, 200.0), (550.0, 300.0), (650.0, 300.0)])
    );
    assert_eq!(
        l.flow("f4").unwrap().waypoints,
        pts(&[(550.0, 200.0), (550.0, 100.0), (650.0, 100.0)])
    );
    // Into the join gateway: horizontal first, then into the bottom or top edge.
    assert_eq!(
        l.flow("f5").unwrap().waypoints,
        pts(&[(700.0, 300.0), (850.0, 300.0), (850.0, 250.0)])
    );
    assert_eq!(
        l.flow("f6").unwrap().waypoints,
        pts(&[(700.0, 100.0), (850.0, 100.0), (850.0, 150.0)])
    );
    assert_eq!(
        l.flow("f7").unwrap().waypoints,
        pts(&[(850.0, 200.0), (850.0, 200.0), (950.0, 200.0)])
    );
}

#[test]
fn gateway_cycle_records_the_back_edge() {
    let l = compute_layout(&gateway_cycle(), &LayoutConfig::default()).unwrap();
    assert_eq!(l.order, vec!["task1", "gateway", "task2"]);
    assert_eq!(l.backward_flows, vec!["f3"]);
    assert!(l.is_backward("f3"));
    assert!(!l.is_backward("f1"));

    let columns: Vec<i32> = l.nodes.iter().map(|n| n.column).collect();
    assert_eq!(columns, vec![1, 2, 3]);

    // The backward flow is still routed.
    assert_eq!(
        l.flow("f3").unwrap().waypoints,
        pts(&[(600.0, 200.0), (350.0, 200.0)])
    );
}

#[test]
fn forward_flows_follow_the_sequencing_order() {
    for (name, g) in fixtures() {
        let l = compute_layout(&g, &LayoutConfig::default()).unwrap();
        let pos = |id: &str| l.order.iter().position(|o| o == id).unwrap();
        for f in g.flows() {
            if l.is_backward(&f.id) {
                continue;
            }
            assert!(
                pos(&f.source) < pos(&f.target),
                "{name}: flow {} runs against the order",
                f.id
            );
        }
    }
}

#[test]
fn every_node_gets_exactly_one_unique_cell() {
    for (name, g) in fixtures() {
        let l = compute_layout(&g, &LayoutConfig::default()).unwrap();
        assert_eq!(l.nodes.len(), g.node_count(), "{name}");
        let mut cells: Vec<(i32, i32)> = l.nodes.iter().map(|n| (n.row, n.column)).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), g.node_count(), "{name}: two nodes share a cell");
    }
}

#[test]
fn single_predecessor_nodes_continue_the_predecessor_row() {
    for (name, g) in fixtures() {
        let l = compute_layout(&g, &LayoutConfig::default()).unwrap();
        for node in g.nodes() {
            let [flow_id] = node.incoming.as_slice() else {
                continue;
            };
            let flow = g.flow(flow_id).unwrap();
            if l.is_backward(flow_id) || g.node(&flow.source).unwrap().outgoing.len() > 1 {
                continue;
            }
            let me = l.node(&node.id).unwrap();
            let pred = l.node(&flow.source).unwrap();
            assert_eq!(me.row, pred.row, "{name}: {}", node.id);
            assert_eq!(me.column, pred.column + 1, "{name}: {}", node.id);
        }
    }
}

#[test]
fn three_way_split_keeps_the_middle_branch_level() {
    let l = compute_layout(&three_way_split(), &LayoutConfig::default()).unwrap();
    let fork = l.node("fork").unwrap().row;
    assert_eq!(l.node("a").unwrap().row, fork + 1);
    assert_eq!(l.node("b").unwrap().row, fork);
    assert_eq!(l.node("c").unwrap().row, fork - 1);
    assert_eq!(l.node("join").unwrap().row, fork);
}

#[test]
fn pixel_coordinates_follow_the_cell() {
    let config = LayoutConfig::default();
    for (name, g) in fixtures() {
        let l = compute_layout(&g, &config).unwrap();
        for n in &l.nodes {
            assert_eq!(n.x, f64::from(n.column) * 150.0 + 50.0, "{name}: {}", n.id);
            assert_eq!(n.y, f64::from(n.row) * 100.0 + 50.0, "{name}: {}", n.id);
            assert_eq!((n.width, n.height), (100.0, 100.0));
        }
    }
}

#[test]
fn waypoints_start_and_end_on_their_nodes() {
    for (name, g) in fixtures() {
        let l = compute_layout(&g, &LayoutConfig::default()).unwrap();
        assert_eq!(l.flows.len(), g.flow_count());
        for f in g.flows() {
            let route = &l.flow(&f.id).unwrap().waypoints;
            assert!(route.len() >= 2, "{name}: {}", f.id);
            let first = route[0];
            let last = route[route.len() - 1];
            assert!(
                on_box(first, l.node(&f.source).unwrap()),
                "{name}: {} starts off its source",
                f.id
            );
            assert!(
                on_box(last, l.node(&f.target).unwrap()),
                "{name}: {} ends off its target",
                f.id
            );
        }
    }
}

#[test]
fn layout_is_deterministic() {
    for (name, g) in fixtures() {
        let first = compute_layout(&g, &LayoutConfig::default()).unwrap();
        let second = compute_layout(&g.clone(), &LayoutConfig::default()).unwrap();
        assert_eq!(first, second, "{name}");

        let mut laid_out = g.clone();
        layout(&mut laid_out, &LayoutConfig::default()).unwrap();
        let again = compute_layout(&laid_out, &LayoutConfig::default()).unwrap();
        assert_eq!(first, again, "{name}: relayout of a positioned graph differs");
    }
}

#[test]
fn compute_layout_leaves_the_graph_untouched() {
    let g = split_join();
    let before = g.clone();
    compute_layout(&g, &LayoutConfig::default()).unwrap();
    assert_eq!(g, before);
    assert!(g.nodes().all(|n| !n.is_positioned()));
}

#[test]
fn layout_writes_positions_and_waypoints_back() {
    let mut g = split_join();
    let summary = layout(&mut g, &LayoutConfig::default()).unwrap();
    assert_eq!(
        summary,
        LayoutSummary {
            node_count: 7,
            flow_count: 7,
            backward_flows: vec![],
            min_row: 0,
            max_row: 2,
            max_column: 6,
        }
    );

    let a = g.node("task_a").unwrap();
    assert!(a.is_positioned());
    assert_eq!((a.row, a.column), (Some(2), Some(4)));
    assert_eq!((a.x, a.y), (Some(650.0), Some(250.0)));
    assert_eq!((a.width, a.height), (100.0, 100.0));
    assert!(g.flows().all(|f| f.waypoints.len() >= 2));

    g.clear_layout();
    assert!(g.nodes().all(|n| !n.is_positioned()));
    assert!(g.flows().all(|f| f.waypoints.is_empty()));
}

#[test]
fn apply_commits_a_computed_layout() {
    let mut g = gateway_cycle();
    let l: Layout = compute_layout(&g, &LayoutConfig::default()).unwrap();
    l.apply(&mut g).unwrap();
    assert_eq!(g.node("gateway").unwrap().x, Some(350.0));
    assert_eq!(
        g.flow("f2").unwrap().waypoints,
        l.flow("f2").unwrap().waypoints
    );
    assert_eq!(l.summary().backward_flows, vec!["f3"]);
}

#[test]
fn custom_geometry_scales_coordinates() {
    let config = LayoutConfig {
        column_pitch: 200.0,
        row_pitch: 150.0,
        margin: 0.0,
        row_stride: 2,
        node_width: 120.0,
        node_height: 80.0,
    };
    let l = compute_layout(&split_join(), &config).unwrap();
    let fork = l.node("fork").unwrap();
    let a = l.node("task_a").unwrap();
    assert_eq!((fork.row, fork.column), (2, 3));
    assert_eq!((fork.x, fork.y), (600.0, 300.0));
    assert_eq!((a.row, a.y), (4, 600.0));
    assert_eq!(
        l.flow("f3").unwrap().waypoints,
        pts(&[(660.0, 340.0), (660.0, 640.0), (800.0, 640.0)])
    );
}

#[test]
fn missing_flow_endpoint_is_a_malformed_graph() {
    let doc = serde_json::json!({
        "nodes": [
            { "id": "a", "type": "task", "outgoing": ["f1"] }
        ],
        "flows": [
            { "id": "f1", "source": "a", "target": "ghost" }
        ]
    });
    let mut g: ProcessGraph = serde_json::from_value(doc).unwrap();
    let before = g.clone();

    let err = layout(&mut g, &LayoutConfig::default()).unwrap_err();
    assert_eq!(
        err,
        LayoutError::MalformedGraph(GraphError::MissingEndpoint {
            flow_id: "f1".to_string(),
            node_id: "ghost".to_string()
        })
    );
    assert_eq!(g, before);
}

#[test]
fn invalid_config_is_rejected_before_layout() {
    let mut g = linear_chain();
    let config = LayoutConfig {
        row_stride: 0,
        ..Default::default()
    };
    assert!(matches!(
        layout(&mut g, &config),
        Err(LayoutError::InvalidConfig { .. })
    ));
    assert!(g.nodes().all(|n| !n.is_positioned()));
}

#[test]
fn oversized_stride_is_an_invalid_config() {
    let mut g = ProcessGraph::new();
    g.add_node("only", NodeType::Task).unwrap();
    let config = LayoutConfig {
        row_stride: 1_500_000_000,
        ..Default::default()
    };
    assert!(matches!(
        compute_layout(&g, &config),
        Err(LayoutError::InvalidConfig { .. })
    ));
}

#[test]
fn rows_past_the_grid_range_are_an_error() {
    // 32768 independent chains at the largest stride need row 2^31.
    let mut g = ProcessGraph::new();
    for i in 0..32_768 {
        g.add_node(format!("n{i}"), NodeType::Task).unwrap();
    }
    let config = LayoutConfig {
        row_stride: bpmn_layout::config::MAX_ROW_STRIDE,
        ..Default::default()
    };
    let mut laid_out = g.clone();
    let err = layout(&mut laid_out, &config).unwrap_err();
    assert_eq!(
        err,
        LayoutError::RowOverflow {
            node_id: "n32766".to_string()
        }
    );
    assert_eq!(laid_out, g);
}

#[test]
fn apply_rejects_a_graph_missing_layout_ids() {
    let l = compute_layout(&split_join(), &LayoutConfig::default()).unwrap();
    let mut other = linear_chain();
    let before = other.clone();

    let err = l.apply(&mut other).unwrap_err();
    assert_eq!(
        err,
        LayoutError::LayoutMismatch {
            id: "task1".to_string()
        }
    );
    assert_eq!(other, before);
}

#[test]
fn cycle_break_failure_commits_nothing() {
    let mut g = graph(
        &[
            ("start", NodeType::StartEvent),
            ("a", NodeType::Task),
            ("b", NodeType::Task),
        ],
        &[("f2", "a", "b"), ("f3", "b", "a")],
    );
    let before = g.clone();

    let err = layout(&mut g, &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, LayoutError::CycleBreakFailure { .. }));
    assert_eq!(g, before);
    assert!(g.nodes().all(|n| !n.is_positioned()));
    assert!(g.flows().all(|f| f.waypoints.is_empty()));
}

#[test]
fn empty_graph_lays_out_to_nothing() {
    let mut g = ProcessGraph::new();
    let summary = layout(&mut g, &LayoutConfig::default()).unwrap();
    assert_eq!(summary.node_count, 0);
    assert_eq!(summary.flow_count, 0);
    assert_eq!((summary.min_row, summary.max_row, summary.max_column), (0, 0, 0));
}
