#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// No node is free of incoming flows and no Join has an edge left to strip.
    #[error("cannot break cycle through nodes: {}", remaining.join(", "))]
    CycleBreakFailure { remaining: Vec<String> },

    #[error("predecessor {predecessor_id} of node {node_id} has no grid cell")]
    MissingPredecessorCell {
        node_id: String,
        predecessor_id: String,
    },

    /// A grid row left the `i32` range while placing `node_id`.
    #[error("grid row out of range while placing node {node_id}")]
    RowOverflow { node_id: String },

    #[error("node {node_id} was never assigned a grid cell")]
    Unplaced { node_id: String },

    /// A computed layout was applied to a graph that lacks one of its nodes or flows.
    #[error("layout does not match the graph: {id} is missing")]
    LayoutMismatch { id: String },

    #[error("malformed process graph: {0}")]
    MalformedGraph(#[from] bpmn_graph::Error),

    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
