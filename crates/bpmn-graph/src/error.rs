#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("node id is already in use: {node_id}")]
    DuplicateNode { node_id: String },

    #[error("flow id is already in use: {flow_id}")]
    DuplicateFlow { flow_id: String },

    #[error("unknown node: {node_id}")]
    UnknownNode { node_id: String },

    #[error("flow {flow_id} references a missing node: {node_id}")]
    MissingEndpoint { flow_id: String, node_id: String },

    #[error("node {node_id} lists an unknown flow: {flow_id}")]
    UnknownFlowReference { node_id: String, flow_id: String },

    #[error("flow {flow_id} is not listed exactly once on its endpoint {node_id}")]
    AdjacencyMismatch { flow_id: String, node_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
