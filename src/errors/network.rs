//! Errors raised while building or mutating a network topology.

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
/// Errors relative to the network structure and its node registry.
pub enum NetworkError {
    /// No node with the given name is registered.
    #[error("Unknown node name `{0}`")]
    NodeNotFound(String),
    /// No node with the given dense identifier exists.
    #[error("Unknown node identifier `{0}`")]
    IdNotFound(usize),
    /// The identifier from the topology file was never registered.
    #[error("Unknown original identifier `{0}`")]
    OriginalIdNotFound(usize),
    /// The node exists but has no value with the given label.
    #[error("Node `{node}` has no value named `{value}`")]
    ValueNotFound {
        /// Name of the node whose alphabet was searched.
        node: String,
        /// The value label that could not be found.
        value: String,
    },
    /// A node name or original identifier was registered twice.
    #[error("Duplicate node `{0}`")]
    DuplicateNode(String),
    /// The parent relation contains a cycle, so the graph is no DAG.
    #[error("The network contains a cycle and cannot be used for inference")]
    CycleDetected,
    /// The sample matrix has no row for a registered node.
    #[error("No sample row found for node `{0}`")]
    MissingSampleRow(String),
    /// An observation table disagrees with the node alphabets.
    #[error(
        "Observation table of node `{node}` has {actual} rows, but the parent alphabets require {expected}"
    )]
    ShapeMismatch {
        /// Name of the node whose table is malformed.
        node: String,
        /// Row count implied by the parent alphabets.
        expected: usize,
        /// Row count actually present.
        actual: usize,
    },
}
