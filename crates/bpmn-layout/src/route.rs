//! Orthogonal waypoint routing for sequence flows.
//!
//! Routes depend only on the two endpoint boxes and node kinds. Flows are not routed around
//! other nodes, so overlapping routes are possible.

use crate::coordinate::NodeBox;
use crate::graph::{NodeType, Point};

/// Polyline for a flow from `source` to `target`, always at least two points.
pub fn route(
    source: &NodeBox,
    source_type: NodeType,
    target: &NodeBox,
    target_type: NodeType,
) -> Vec<Point> {
    if source_type.is_branching_gateway() {
        // Leave the gateway vertically, then turn into the target's left edge.
        let start = source.center();
        let end = target.left_center();
        return vec![start, Point::new(start.x, end.y), end];
    }

    if source.y == target.y {
        return vec![source.right_center(), target.left_center()];
    }

    if target_type.is_branching_gateway() {
        // Leave the source horizontally, then turn into the gateway's top or bottom edge.
        let start = source.center();
        let end = if target.y > source.y {
            target.top_center()
        } else {
            target.bottom_center()
        };
        return vec![start, Point::new(end.x, start.y), end];
    }

    vec![source.right_center(), target.left_center()]
}
