#![forbid(unsafe_code)]

//! Process graph container used by `bpmn-layout`.
//!
//! A [`ProcessGraph`] stores flow nodes and sequence flows in insertion order. Node adjacency
//! (`incoming` / `outgoing` flow ids) is kept on the nodes themselves, the way BPMN 2.0 XML
//! carries it, and is maintained by [`ProcessGraph::add_flow`] / [`ProcessGraph::remove_flow`].

pub mod error;
pub mod flow;
pub mod node;

pub use error::{Error, Result};
pub use flow::{Flow, Point};
pub use node::{Node, NodeType};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct ProcessGraph {
    nodes: IndexMap<String, Node>,
    flows: IndexMap<String, Flow>,
}

impl ProcessGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: impl Into<String>, node_type: NodeType) -> Result<&mut Node> {
        self.insert_node(Node::new(id, node_type))
    }

    /// Inserts a fully built node as-is, including whatever adjacency lists it carries.
    pub fn insert_node(&mut self, node: Node) -> Result<&mut Node> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode { node_id: node.id });
        }
        let entry = self.nodes.entry(node.id.clone());
        Ok(entry.or_insert(node))
    }

    /// Adds a sequence flow and records it on both endpoints.
    pub fn add_flow(
        &mut self,
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<&mut Flow> {
        let flow = Flow::new(id, source, target);
        if self.flows.contains_key(&flow.id) {
            return Err(Error::DuplicateFlow { flow_id: flow.id });
        }
        for endpoint in [&flow.source, &flow.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(Error::UnknownNode {
                    node_id: endpoint.clone(),
                });
            }
        }

        if let Some(source) = self.nodes.get_mut(&flow.source) {
            source.outgoing.push(flow.id.clone());
        }
        if let Some(target) = self.nodes.get_mut(&flow.target) {
            target.incoming.push(flow.id.clone());
        }

        let entry = self.flows.entry(flow.id.clone());
        Ok(entry.or_insert(flow))
    }

    /// Removes a flow and detaches it from its endpoints' adjacency lists.
    pub fn remove_flow(&mut self, id: &str) -> Option<Flow> {
        let flow = self.flows.shift_remove(id)?;
        if let Some(source) = self.nodes.get_mut(&flow.source) {
            source.outgoing.retain(|f| f != id);
        }
        if let Some(target) = self.nodes.get_mut(&flow.target) {
            target.incoming.retain(|f| f != id);
        }
        Some(flow)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_flow(&self, id: &str) -> bool {
        self.flows.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn flow(&self, id: &str) -> Option<&Flow> {
        self.flows.get(id)
    }

    pub fn flow_mut(&mut self, id: &str) -> Option<&mut Flow> {
        self.flows.get_mut(id)
    }

    /// Position of a node in insertion order. Stable until the graph is modified.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, n)| n)
    }

    pub fn flow_index(&self, id: &str) -> Option<usize> {
        self.flows.get_index_of(id)
    }

    pub fn flow_at(&self, index: usize) -> Option<&Flow> {
        self.flows.get_index(index).map(|(_, f)| f)
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl ExactSizeIterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn flows(&self) -> impl ExactSizeIterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn flows_mut(&mut self) -> impl ExactSizeIterator<Item = &mut Flow> {
        self.flows.values_mut()
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source node ids of `id`'s incoming flows, in flow-list order.
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        node.incoming
            .iter()
            .filter_map(|f| self.flows.get(f))
            .map(|f| f.source.as_str())
            .collect()
    }

    /// Target node ids of `id`'s outgoing flows, in flow-list order.
    pub fn successors(&self, id: &str) -> Vec<&str> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        node.outgoing
            .iter()
            .filter_map(|f| self.flows.get(f))
            .map(|f| f.target.as_str())
            .collect()
    }

    /// Checks that flow endpoints and node adjacency lists agree with each other.
    pub fn validate(&self) -> Result<()> {
        for flow in self.flows.values() {
            let Some(source) = self.nodes.get(&flow.source) else {
                return Err(Error::MissingEndpoint {
                    flow_id: flow.id.clone(),
                    node_id: flow.source.clone(),
                });
            };
            let Some(target) = self.nodes.get(&flow.target) else {
                return Err(Error::MissingEndpoint {
                    flow_id: flow.id.clone(),
                    node_id: flow.target.clone(),
                });
            };
            if source.outgoing.iter().filter(|f| **f == flow.id).count() != 1 {
                return Err(Error::AdjacencyMismatch {
                    flow_id: flow.id.clone(),
                    node_id: source.id.clone(),
                });
            }
            if target.incoming.iter().filter(|f| **f == flow.id).count() != 1 {
                return Err(Error::AdjacencyMismatch {
                    flow_id: flow.id.clone(),
                    node_id: target.id.clone(),
                });
            }
        }

        for node in self.nodes.values() {
            for flow_id in &node.incoming {
                let flow = self.lookup_listed_flow(node, flow_id)?;
                if flow.target != node.id {
                    return Err(Error::AdjacencyMismatch {
                        flow_id: flow_id.clone(),
                        node_id: node.id.clone(),
                    });
                }
            }
            for flow_id in &node.outgoing {
                let flow = self.lookup_listed_flow(node, flow_id)?;
                if flow.source != node.id {
                    return Err(Error::AdjacencyMismatch {
                        flow_id: flow_id.clone(),
                        node_id: node.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resets every layout output (grid cells, coordinates, sizes, waypoints).
    pub fn clear_layout(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_layout();
        }
        for flow in self.flows.values_mut() {
            flow.waypoints.clear();
        }
    }

    fn lookup_listed_flow(&self, node: &Node, flow_id: &str) -> Result<&Flow> {
        self.flows
            .get(flow_id)
            .ok_or_else(|| Error::UnknownFlowReference {
                node_id: node.id.clone(),
                flow_id: flow_id.to_string(),
            })
    }
}

/// Serialized shape of a [`ProcessGraph`]: plain node and flow lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    flows: Vec<Flow>,
}

impl TryFrom<GraphDocument> for ProcessGraph {
    type Error = Error;

    fn try_from(doc: GraphDocument) -> Result<Self> {
        let mut g = ProcessGraph::new();
        for node in doc.nodes {
            g.insert_node(node)?;
        }
        for flow in doc.flows {
            if g.flows.contains_key(&flow.id) {
                return Err(Error::DuplicateFlow { flow_id: flow.id });
            }
            g.flows.insert(flow.id.clone(), flow);
        }
        Ok(g)
    }
}

impl From<ProcessGraph> for GraphDocument {
    fn from(g: ProcessGraph) -> Self {
        Self {
            nodes: g.nodes.into_values().collect(),
            flows: g.flows.into_values().collect(),
        }
    }
}
