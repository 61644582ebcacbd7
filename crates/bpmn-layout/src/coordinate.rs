//! Grid cell to pixel mapping.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::graph::Point;
use crate::grid::{Grid, GridCell};
use crate::index::ProcessIndex;

/// A node's rectangle in diagram coordinates; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn left_center(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    pub fn right_center(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height)
    }
}

/// `x = column * column_pitch + margin`, `y = row * row_pitch + margin`.
pub fn map_cell(row: i32, column: i32, config: &LayoutConfig) -> (f64, f64) {
    (
        f64::from(column) * config.column_pitch + config.margin,
        f64::from(row) * config.row_pitch + config.margin,
    )
}

/// Cell and box of every node, by node index.
pub fn map_grid(
    index: &ProcessIndex<'_>,
    grid: &Grid,
    config: &LayoutConfig,
) -> Result<Vec<(GridCell, NodeBox)>> {
    (0..index.node_count())
        .map(|node| {
            let cell = *grid.cell_of(node).ok_or_else(|| LayoutError::Unplaced {
                node_id: index.node_id(node).to_string(),
            })?;
            let (x, y) = map_cell(cell.row, cell.column, config);
            let bounds = NodeBox {
                x,
                y,
                width: config.node_width,
                height: config.node_height,
            };
            Ok((cell, bounds))
        })
        .collect()
}
