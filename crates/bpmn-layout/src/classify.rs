//! Structural roles of flow nodes, derived from node type and flow degree.

use crate::graph::{Node, NodeType, ProcessGraph};
use crate::index::ProcessIndex;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Element,
    StartEvent,
    EndEvent,
    /// Two or more incoming flows.
    Join,
    /// Two or more outgoing flows.
    Split,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Element,
        Role::StartEvent,
        Role::EndEvent,
        Role::Join,
        Role::Split,
    ];

    const fn bit(self) -> u8 {
        match self {
            Role::Element => 1,
            Role::StartEvent => 1 << 1,
            Role::EndEvent => 1 << 2,
            Role::Join => 1 << 3,
            Role::Split => 1 << 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Element => "Element",
            Role::StartEvent => "Start Event",
            Role::EndEvent => "End Event",
            Role::Join => "Join",
            Role::Split => "Split",
        }
    }
}

/// Set of roles carried by one node. Join and Split are not exclusive of each other or of the
/// event roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Roles(u8);

impl Roles {
    pub fn from_degree(node_type: NodeType, incoming: usize, outgoing: usize) -> Self {
        let mut roles = Roles::default().with(Role::Element);
        if node_type.is_start_event() {
            roles = roles.with(Role::StartEvent);
        }
        if node_type.is_end_event() {
            roles = roles.with(Role::EndEvent);
        }
        if incoming >= 2 {
            roles = roles.with(Role::Join);
        }
        if outgoing >= 2 {
            roles = roles.with(Role::Split);
        }
        roles
    }

    pub fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_join(self) -> bool {
        self.contains(Role::Join)
    }

    pub fn is_split(self) -> bool {
        self.contains(Role::Split)
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

pub fn classify(node: &Node) -> Roles {
    Roles::from_degree(node.node_type, node.incoming.len(), node.outgoing.len())
}

/// Roles for every node of a graph, in node insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    roles: IndexMap<String, Roles>,
}

impl Classification {
    pub(crate) fn from_index(index: &ProcessIndex<'_>) -> Self {
        let roles = index
            .nodes
            .iter()
            .map(|n| {
                (
                    n.id.to_string(),
                    Roles::from_degree(n.node_type, n.incoming.len(), n.outgoing.len()),
                )
            })
            .collect();
        Self { roles }
    }

    pub fn get(&self, node_id: &str) -> Option<Roles> {
        self.roles.get(node_id).copied()
    }

    /// Roles of the node at insertion index `node`.
    pub(crate) fn at(&self, node: usize) -> Roles {
        self.roles[node]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Roles)> {
        self.roles.iter().map(|(id, roles)| (id.as_str(), *roles))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Classifies every node of `graph` from its current adjacency lists.
pub fn classify_graph(graph: &ProcessGraph) -> Classification {
    let roles = graph.nodes().map(|n| (n.id.clone(), classify(n))).collect();
    Classification { roles }
}
