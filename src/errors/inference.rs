//! Errors raised inside the inference kernel.

use crate::errors::NetworkError;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
/// Errors that may occur while answering a probabilistic query. They are
/// fatal to the current query only; the network is left unchanged.
pub enum InferenceError {
    /// A conditional probability was requested with a zero-mass denominator.
    #[error("Conditional probability with zero-mass denominator")]
    DegenerateCondition,
    /// A value index lies outside the node's non-NA alphabet.
    #[error("Value index {value} is outside the alphabet of node `{node}` (size {size})")]
    OutOfDomain {
        /// Name of the node whose alphabet was exceeded.
        node: String,
        /// The rejected value index.
        value: usize,
        /// Size of the node's non-NA alphabet.
        size: usize,
    },
    /// The query referenced an unknown node or value.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
