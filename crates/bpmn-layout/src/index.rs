//! Index-based view of a [`ProcessGraph`] for a single layout run.
//!
//! Nodes and flows are addressed by their insertion position in the graph, so every stage can
//! keep its own per-run state in plain vectors without touching the caller's adjacency lists.

use crate::error::Result;
use crate::graph::{Error as GraphError, NodeType, ProcessGraph};

#[derive(Debug, Clone)]
pub struct IndexedNode<'a> {
    pub id: &'a str,
    pub node_type: NodeType,
    /// Flow indices, in the node's `incoming` order.
    pub incoming: Vec<usize>,
    /// Flow indices, in the node's `outgoing` order.
    pub outgoing: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct IndexedFlow<'a> {
    pub id: &'a str,
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone)]
pub struct ProcessIndex<'a> {
    pub nodes: Vec<IndexedNode<'a>>,
    pub flows: Vec<IndexedFlow<'a>>,
}

impl<'a> ProcessIndex<'a> {
    /// Builds the index. The graph is expected to have passed [`ProcessGraph::validate`];
    /// dangling references are still reported rather than skipped.
    pub fn build(graph: &'a ProcessGraph) -> Result<Self> {
        let mut flows = Vec::with_capacity(graph.flow_count());
        for flow in graph.flows() {
            let source = graph
                .node_index(&flow.source)
                .ok_or_else(|| GraphError::MissingEndpoint {
                    flow_id: flow.id.clone(),
                    node_id: flow.source.clone(),
                })?;
            let target = graph
                .node_index(&flow.target)
                .ok_or_else(|| GraphError::MissingEndpoint {
                    flow_id: flow.id.clone(),
                    node_id: flow.target.clone(),
                })?;
            flows.push(IndexedFlow {
                id: flow.id.as_str(),
                source,
                target,
            });
        }

        let mut nodes = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let resolve = |ids: &[String]| -> Result<Vec<usize>> {
                ids.iter()
                    .map(|flow_id| {
                        graph.flow_index(flow_id).ok_or_else(|| {
                            GraphError::UnknownFlowReference {
                                node_id: node.id.clone(),
                                flow_id: flow_id.clone(),
                            }
                            .into()
                        })
                    })
                    .collect()
            };
            nodes.push(IndexedNode {
                id: node.id.as_str(),
                node_type: node.node_type,
                incoming: resolve(&node.incoming)?,
                outgoing: resolve(&node.outgoing)?,
            });
        }

        Ok(Self { nodes, flows })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn node_id(&self, node: usize) -> &'a str {
        self.nodes[node].id
    }

    pub fn flow_id(&self, flow: usize) -> &'a str {
        self.flows[flow].id
    }
}
