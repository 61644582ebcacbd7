//! Layout entry points.
//!
//! [`compute_layout`] runs every stage against a read-only graph and returns a [`Layout`];
//! nothing is written back until [`Layout::apply`]. [`layout`] does both.

use crate::classify::Classification;
use crate::config::LayoutConfig;
use crate::coordinate::{NodeBox, map_grid};
use crate::error::{LayoutError, Result};
use crate::graph::{Point, ProcessGraph};
use crate::index::ProcessIndex;
use crate::{grid, route, sequence};

const TRACING_TARGET: &str = "bpmn_layout::pipeline";

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub row: i32,
    pub column: i32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowRoute {
    pub id: String,
    pub waypoints: Vec<Point>,
}

/// Result of one layout run, in graph insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub nodes: Vec<NodeLayout>,
    pub flows: Vec<FlowRoute>,
    /// Node ids in sequencing order.
    pub order: Vec<String>,
    /// Flows dropped to break cycles, in the order they were dropped.
    pub backward_flows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSummary {
    pub node_count: usize,
    pub flow_count: usize,
    pub backward_flows: Vec<String>,
    pub min_row: i32,
    pub max_row: i32,
    pub max_column: i32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn flow(&self, id: &str) -> Option<&FlowRoute> {
        self.flows.iter().find(|f| f.id == id)
    }

    pub fn is_backward(&self, flow_id: &str) -> bool {
        self.backward_flows.iter().any(|f| f == flow_id)
    }

    /// Writes cells, coordinates, sizes and waypoints into `graph`.
    ///
    /// `graph` must contain every node and flow of the layout, normally because it is the graph
    /// the layout was computed from. Otherwise nothing is written and
    /// [`LayoutError::LayoutMismatch`] names the first missing id.
    pub fn apply(&self, graph: &mut ProcessGraph) -> Result<()> {
        let missing = self
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .find(|id| !graph.has_node(id))
            .or_else(|| {
                self.flows
                    .iter()
                    .map(|f| f.id.as_str())
                    .find(|id| !graph.has_flow(id))
            });
        if let Some(id) = missing {
            return Err(LayoutError::LayoutMismatch { id: id.to_string() });
        }

        for n in &self.nodes {
            if let Some(node) = graph.node_mut(&n.id) {
                node.row = Some(n.row);
                node.column = Some(n.column);
                node.x = Some(n.x);
                node.y = Some(n.y);
                node.width = n.width;
                node.height = n.height;
            }
        }
        for f in &self.flows {
            if let Some(flow) = graph.flow_mut(&f.id) {
                flow.waypoints = f.waypoints.clone();
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> LayoutSummary {
        let rows = self.nodes.iter().map(|n| n.row);
        LayoutSummary {
            node_count: self.nodes.len(),
            flow_count: self.flows.len(),
            backward_flows: self.backward_flows.clone(),
            min_row: rows.clone().min().unwrap_or(0),
            max_row: rows.max().unwrap_or(0),
            max_column: self.nodes.iter().map(|n| n.column).max().unwrap_or(0),
        }
    }
}

/// Computes a layout without modifying `graph`.
pub fn compute_layout(graph: &ProcessGraph, config: &LayoutConfig) -> Result<Layout> {
    config.validate()?;
    graph.validate()?;

    let index = ProcessIndex::build(graph)?;
    let classification = Classification::from_index(&index);
    let sequence = sequence::sequence(&index, &classification)?;
    let grid = grid::place(&index, &classification, &sequence, config)?;
    let placed = map_grid(&index, &grid, config)?;

    let nodes = placed
        .iter()
        .enumerate()
        .map(|(node, (cell, b))| NodeLayout {
            id: index.node_id(node).to_string(),
            row: cell.row,
            column: cell.column,
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        })
        .collect();
    let boxes: Vec<NodeBox> = placed.iter().map(|&(_, b)| b).collect();

    let flows = index
        .flows
        .iter()
        .map(|f| FlowRoute {
            id: f.id.to_string(),
            waypoints: route_flow(&index, &boxes, f.source, f.target),
        })
        .collect();

    let layout = Layout {
        nodes,
        flows,
        order: sequence
            .order_ids(&index)
            .into_iter()
            .map(str::to_string)
            .collect(),
        backward_flows: sequence
            .backward_flow_ids(&index)
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    tracing::debug!(
        target: TRACING_TARGET,
        nodes = layout.nodes.len(),
        flows = layout.flows.len(),
        backward_flows = layout.backward_flows.len(),
        "Computed layout"
    );
    Ok(layout)
}

fn route_flow(
    index: &ProcessIndex<'_>,
    boxes: &[NodeBox],
    source: usize,
    target: usize,
) -> Vec<Point> {
    route::route(
        &boxes[source],
        index.nodes[source].node_type,
        &boxes[target],
        index.nodes[target].node_type,
    )
}

/// Lays out `graph` in place. On error the graph is left untouched.
pub fn layout(graph: &mut ProcessGraph, config: &LayoutConfig) -> Result<LayoutSummary> {
    let layout = compute_layout(graph, config)?;
    layout.apply(graph)?;
    Ok(layout.summary())
}
