use serde::{Deserialize, Serialize};

/// BPMN flow-node kinds, serialized as their BPMN 2.0 element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Task,
    SubProcess,
    StartEvent,
    EndEvent,
    IntermediateThrowEvent,
    IntermediateCatchEvent,
    BoundaryEvent,
    ExclusiveGateway,
    InclusiveGateway,
    ParallelGateway,
    EventBasedGateway,
    ComplexGateway,
    DataObject,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Task => "task",
            NodeType::SubProcess => "subProcess",
            NodeType::StartEvent => "startEvent",
            NodeType::EndEvent => "endEvent",
            NodeType::IntermediateThrowEvent => "intermediateThrowEvent",
            NodeType::IntermediateCatchEvent => "intermediateCatchEvent",
            NodeType::BoundaryEvent => "boundaryEvent",
            NodeType::ExclusiveGateway => "exclusiveGateway",
            NodeType::InclusiveGateway => "inclusiveGateway",
            NodeType::ParallelGateway => "parallelGateway",
            NodeType::EventBasedGateway => "eventBasedGateway",
            NodeType::ComplexGateway => "complexGateway",
            NodeType::DataObject => "dataObject",
        }
    }

    pub fn is_start_event(self) -> bool {
        matches!(self, NodeType::StartEvent)
    }

    pub fn is_end_event(self) -> bool {
        matches!(self, NodeType::EndEvent)
    }

    pub fn is_event(self) -> bool {
        matches!(
            self,
            NodeType::StartEvent
                | NodeType::EndEvent
                | NodeType::IntermediateThrowEvent
                | NodeType::IntermediateCatchEvent
                | NodeType::BoundaryEvent
        )
    }

    pub fn is_gateway(self) -> bool {
        matches!(
            self,
            NodeType::ExclusiveGateway
                | NodeType::InclusiveGateway
                | NodeType::ParallelGateway
                | NodeType::EventBasedGateway
                | NodeType::ComplexGateway
        )
    }

    /// Gateways whose flows get an elbow route (exclusive, inclusive, parallel).
    ///
    /// Event-based and complex gateways are laid out like any other node.
    pub fn is_branching_gateway(self) -> bool {
        matches!(
            self,
            NodeType::ExclusiveGateway | NodeType::InclusiveGateway | NodeType::ParallelGateway
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flow node plus its adjacency lists and layout outputs.
///
/// `incoming` / `outgoing` hold flow ids in the order flows were attached. Layout outputs are
/// `None` (or zero-sized) until a layout run commits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub incoming: Vec<String>,
    #[serde(default)]
    pub outgoing: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: None,
            node_type,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            row: None,
            column: None,
            x: None,
            y: None,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_positioned(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    pub(crate) fn clear_layout(&mut self) {
        self.row = None;
        self.column = None;
        self.x = None;
        self.y = None;
        self.width = 0.0;
        self.height = 0.0;
    }
}
