//! Cycle-tolerant topological ordering of flow nodes.
//!
//! Kahn's algorithm over per-run copies of the adjacency lists. When every remaining node still
//! has an incoming flow, all incoming flows of the remaining Join nodes are dropped and recorded
//! as backward flows, which frees at least those Joins for the next round.

use crate::classify::Classification;
use crate::error::{LayoutError, Result};
use crate::index::ProcessIndex;

const TRACING_TARGET: &str = "bpmn_layout::sequence";

/// Total node order plus the flows that were excluded to break cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Node indices in sequencing order.
    pub order: Vec<usize>,
    /// Position of each node index within `order`.
    pub position: Vec<usize>,
    /// Backward flow indices, in the order they were dropped.
    pub backward: Vec<usize>,
    is_backward: Vec<bool>,
}

impl Sequence {
    pub fn is_backward(&self, flow: usize) -> bool {
        self.is_backward.get(flow).copied().unwrap_or(false)
    }

    pub fn order_ids<'a>(&self, index: &ProcessIndex<'a>) -> Vec<&'a str> {
        self.order.iter().map(|&n| index.node_id(n)).collect()
    }

    pub fn backward_flow_ids<'a>(&self, index: &ProcessIndex<'a>) -> Vec<&'a str> {
        self.backward.iter().map(|&f| index.flow_id(f)).collect()
    }
}

enum Step {
    Ready(Vec<usize>),
    Stuck,
    Finished,
}

struct SequencerState<'i, 'a> {
    index: &'i ProcessIndex<'a>,
    remaining: Vec<bool>,
    remaining_count: usize,
    working_in: Vec<Vec<usize>>,
    working_out: Vec<Vec<usize>>,
    /// Remaining nodes with no working incoming flow, ascending by node index.
    frontier: Vec<usize>,
    order: Vec<usize>,
    backward: Vec<usize>,
    is_backward: Vec<bool>,
}

impl<'i, 'a> SequencerState<'i, 'a> {
    fn new(index: &'i ProcessIndex<'a>) -> Self {
        let n = index.node_count();
        let working_in: Vec<Vec<usize>> = index.nodes.iter().map(|v| v.incoming.clone()).collect();
        let frontier = (0..n).filter(|&v| working_in[v].is_empty()).collect();
        Self {
            index,
            remaining: vec![true; n],
            remaining_count: n,
            working_in,
            working_out: index.nodes.iter().map(|v| v.outgoing.clone()).collect(),
            frontier,
            order: Vec::with_capacity(n),
            backward: Vec::new(),
            is_backward: vec![false; index.flow_count()],
        }
    }

    fn step(&mut self) -> Step {
        if self.remaining_count == 0 {
            return Step::Finished;
        }
        if self.frontier.is_empty() {
            Step::Stuck
        } else {
            Step::Ready(std::mem::take(&mut self.frontier))
        }
    }

    /// Sequences one ready round. Nodes freed by it wait for the next round.
    fn emit(&mut self, ready: Vec<usize>) {
        let mut freed = Vec::new();
        for v in ready {
            self.order.push(v);
            self.remaining[v] = false;
            self.remaining_count -= 1;
            for f in std::mem::take(&mut self.working_out[v]) {
                let target = self.index.flows[f].target;
                let incoming = &mut self.working_in[target];
                incoming.retain(|&x| x != f);
                if incoming.is_empty() && self.remaining[target] {
                    freed.push(target);
                }
            }
        }
        freed.sort_unstable();
        self.frontier = freed;
    }

    /// Drops every working incoming flow of the remaining Joins. Returns `false` when there was
    /// nothing to drop.
    fn strip_join_edges(&mut self, classification: &Classification) -> bool {
        let mut stripped = false;
        for v in 0..self.remaining.len() {
            if !self.remaining[v] || !classification.at(v).is_join() {
                continue;
            }
            let incoming = std::mem::take(&mut self.working_in[v]);
            if incoming.is_empty() {
                continue;
            }
            for f in incoming {
                let source = self.index.flows[f].source;
                self.working_out[source].retain(|&x| x != f);
                self.is_backward[f] = true;
                self.backward.push(f);
                stripped = true;
                tracing::trace!(
                    target: TRACING_TARGET,
                    flow_id = self.index.flow_id(f),
                    join_id = self.index.node_id(v),
                    "Dropped backward flow"
                );
            }
            self.frontier.push(v);
        }
        stripped
    }

    fn failure(&self) -> LayoutError {
        let remaining: Vec<String> = (0..self.remaining.len())
            .filter(|&v| self.remaining[v])
            .map(|v| self.index.node_id(v).to_string())
            .collect();
        tracing::warn!(
            target: TRACING_TARGET,
            remaining = ?remaining,
            "Cycle cannot be broken: no ready node and no Join edge to drop"
        );
        LayoutError::CycleBreakFailure { remaining }
    }

    fn finish(self) -> Sequence {
        let mut position = vec![0; self.order.len()];
        for (i, &v) in self.order.iter().enumerate() {
            position[v] = i;
        }
        Sequence {
            order: self.order,
            position,
            backward: self.backward,
            is_backward: self.is_backward,
        }
    }
}

/// Orders all nodes so that every non-backward flow points from an earlier node to a later one.
pub fn sequence(index: &ProcessIndex<'_>, classification: &Classification) -> Result<Sequence> {
    let mut state = SequencerState::new(index);

    // Every Ready round removes a node and every Stuck round removes a flow.
    let max_rounds = index.node_count() + index.flow_count() + 1;
    let mut rounds = 0;
    loop {
        if rounds >= max_rounds {
            return Err(state.failure());
        }
        rounds += 1;

        match state.step() {
            Step::Finished => break,
            Step::Ready(ready) => state.emit(ready),
            Step::Stuck => {
                if !state.strip_join_edges(classification) {
                    return Err(state.failure());
                }
            }
        }
    }

    let sequence = state.finish();
    tracing::debug!(
        target: TRACING_TARGET,
        nodes = sequence.order.len(),
        backward_flows = sequence.backward.len(),
        rounds,
        "Sequenced process graph"
    );
    Ok(sequence)
}
