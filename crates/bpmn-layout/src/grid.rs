//! Grid placement: assigns every node an integer `(row, column)` cell.
//!
//! Nodes are visited in sequencer order. A Split fans its successors out symmetrically around
//! its own row; those successors are placed immediately (depth first) with a forced row, through
//! an explicit work stack of [`PlacementRequest`]s.

use crate::classify::Classification;
use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::index::ProcessIndex;
use crate::sequence::Sequence;
use rustc_hash::FxHashMap;

const TRACING_TARGET: &str = "bpmn_layout::grid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: i32,
    pub column: i32,
    pub node: usize,
}

/// Placed cells, at most one node per `(row, column)`.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: Vec<GridCell>,
    by_node: FxHashMap<usize, usize>,
    occupied: FxHashMap<(i32, i32), usize>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `node` at `(row, column)`. If the cell is taken, every cell at or below `row` is
    /// first shifted down by `stride`. Returns whether a shift happened, or `None` (grid
    /// unchanged) if a shifted row would leave the `i32` range.
    pub fn insert(&mut self, row: i32, column: i32, node: usize, stride: i32) -> Option<bool> {
        let shifted = self.occupied.contains_key(&(row, column));
        if shifted {
            let rows: Vec<i32> = self
                .cells
                .iter()
                .map(|c| {
                    if c.row >= row {
                        c.row.checked_add(stride)
                    } else {
                        Some(c.row)
                    }
                })
                .collect::<Option<_>>()?;
            for (cell, row) in self.cells.iter_mut().zip(rows) {
                cell.row = row;
            }
            self.occupied = self
                .cells
                .iter()
                .enumerate()
                .map(|(i, c)| ((c.row, c.column), i))
                .collect();
        }

        let slot = self.cells.len();
        self.cells.push(GridCell { row, column, node });
        self.by_node.insert(node, slot);
        self.occupied.insert((row, column), slot);
        Some(shifted)
    }

    pub fn cell_of(&self, node: usize) -> Option<&GridCell> {
        self.by_node.get(&node).map(|&i| &self.cells[i])
    }

    pub fn is_placed(&self, node: usize) -> bool {
        self.by_node.contains_key(&node)
    }

    pub fn is_occupied(&self, row: i32, column: i32) -> bool {
        self.occupied.contains_key(&(row, column))
    }

    /// Cells in placement order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `(min_row, max_row, max_column)`, or `None` for an empty grid.
    pub fn extents(&self) -> Option<(i32, i32, i32)> {
        let first = self.cells.first()?;
        Some(self.cells.iter().fold(
            (first.row, first.row, first.column),
            |(lo, hi, col), c| (lo.min(c.row), hi.max(c.row), col.max(c.column)),
        ))
    }
}

/// One pending placement. `forced_row` overrides the row the node's own rule would pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRequest {
    pub node: usize,
    pub forced_row: Option<i32>,
}

/// Rows for the successors of a Split placed at `split_row`, in successor order.
///
/// With an odd count the middle successor keeps the split's row; earlier successors go to
/// increasing rows and later ones to decreasing rows, one `stride` apart. `None` if a row falls
/// outside the `i32` range.
pub fn fan_out_rows(split_row: i32, count: usize, stride: i32) -> Option<Vec<i32>> {
    let centre = count / 2;
    (0..count)
        .map(|i| {
            let offset = if i < centre {
                i64::try_from(i + 1).ok()?
            } else if count % 2 == 1 {
                -i64::try_from(i - centre).ok()?
            } else {
                -i64::try_from(i - centre + 1).ok()?
            };
            let row = i64::from(split_row).checked_add(offset.checked_mul(i64::from(stride))?)?;
            i32::try_from(row).ok()
        })
        .collect()
}

pub struct GridPlacer<'p, 'a> {
    index: &'p ProcessIndex<'a>,
    classification: &'p Classification,
    sequence: &'p Sequence,
    stride: i32,
    grid: Grid,
    next_row: i32,
    stack: Vec<PlacementRequest>,
}

impl<'p, 'a> GridPlacer<'p, 'a> {
    pub fn new(
        index: &'p ProcessIndex<'a>,
        classification: &'p Classification,
        sequence: &'p Sequence,
        config: &LayoutConfig,
    ) -> Self {
        Self {
            index,
            classification,
            sequence,
            stride: config.row_stride,
            grid: Grid::new(),
            next_row: config.row_stride,
            stack: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Grid> {
        let sequence = self.sequence;
        for &node in &sequence.order {
            if self.grid.is_placed(node) {
                continue;
            }
            self.stack.push(PlacementRequest {
                node,
                forced_row: None,
            });
            while let Some(request) = self.stack.pop() {
                if self.grid.is_placed(request.node) {
                    continue;
                }
                self.place(request)?;
            }
        }

        if let Some((min_row, max_row, max_column)) = self.grid.extents() {
            tracing::debug!(
                target: TRACING_TARGET,
                cells = self.grid.len(),
                min_row,
                max_row,
                max_column,
                "Placed nodes on grid"
            );
        }
        Ok(self.grid)
    }

    fn place(&mut self, request: PlacementRequest) -> Result<()> {
        let node = request.node;
        let roles = self.classification.at(node);
        let predecessors = self.forward_predecessors(node);

        let (row, column) = if predecessors.is_empty() {
            let row = self.next_row;
            self.next_row = row
                .checked_add(self.stride)
                .ok_or_else(|| self.row_overflow(node))?;
            (row, 1)
        } else if roles.is_join() {
            self.join_cell(node, &predecessors)?
        } else {
            let cell = self.predecessor_cell(node, predecessors[0])?;
            (cell.row, cell.column + 1)
        };
        let row = request.forced_row.unwrap_or(row);

        let shifted = self
            .grid
            .insert(row, column, node, self.stride)
            .ok_or_else(|| self.row_overflow(node))?;
        tracing::trace!(
            target: TRACING_TARGET,
            node_id = self.index.node_id(node),
            row,
            column,
            forced = request.forced_row.is_some(),
            shifted,
            "Placed node"
        );

        if roles.is_split() {
            self.fan_out(node, row)?;
        }
        Ok(())
    }

    /// Queues the successors of a Split so they are placed next, in flow order.
    fn fan_out(&mut self, split: usize, split_row: i32) -> Result<()> {
        let successors: Vec<usize> = self.index.nodes[split]
            .outgoing
            .iter()
            .map(|&f| self.index.flows[f].target)
            .collect();
        let rows = fan_out_rows(split_row, successors.len(), self.stride)
            .ok_or_else(|| self.row_overflow(split))?;
        for (&node, &row) in successors.iter().zip(&rows).rev() {
            if self.grid.is_placed(node) {
                continue;
            }
            self.stack.push(PlacementRequest {
                node,
                forced_row: Some(row),
            });
        }
        Ok(())
    }

    /// Sources of `node`'s incoming flows, skipping backward flows and repeated sources.
    fn forward_predecessors(&self, node: usize) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for &f in &self.index.nodes[node].incoming {
            if self.sequence.is_backward(f) {
                continue;
            }
            let source = self.index.flows[f].source;
            if !out.contains(&source) {
                out.push(source);
            }
        }
        out
    }

    /// Column right of the rightmost placed predecessor; row is the floored mean of the placed
    /// predecessors' rows.
    fn join_cell(&self, node: usize, predecessors: &[usize]) -> Result<(i32, i32)> {
        let placed: Vec<&GridCell> = predecessors
            .iter()
            .filter_map(|&p| self.grid.cell_of(p))
            .collect();
        if placed.is_empty() {
            return Err(self.missing_predecessor(node, predecessors[0]));
        }
        let row_sum: i64 = placed.iter().map(|c| i64::from(c.row)).sum();
        let row = row_sum.div_euclid(placed.len() as i64) as i32;
        let column = placed.iter().map(|c| c.column).max().unwrap_or(0) + 1;
        Ok((row, column))
    }

    fn predecessor_cell(&self, node: usize, predecessor: usize) -> Result<GridCell> {
        self.grid
            .cell_of(predecessor)
            .copied()
            .ok_or_else(|| self.missing_predecessor(node, predecessor))
    }

    fn row_overflow(&self, node: usize) -> LayoutError {
        LayoutError::RowOverflow {
            node_id: self.index.node_id(node).to_string(),
        }
    }

    fn missing_predecessor(&self, node: usize, predecessor: usize) -> LayoutError {
        LayoutError::MissingPredecessorCell {
            node_id: self.index.node_id(node).to_string(),
            predecessor_id: self.index.node_id(predecessor).to_string(),
        }
    }
}

pub fn place(
    index: &ProcessIndex<'_>,
    classification: &Classification,
    sequence: &Sequence,
    config: &LayoutConfig,
) -> Result<Grid> {
    GridPlacer::new(index, classification, sequence, config).run()
}
