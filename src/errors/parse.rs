//! Errors raised while parsing topology files, sample matrices, the
//! discretisation control file and textual queries.

use crate::errors::NetworkError;

#[derive(Debug, thiserror::Error)]
/// Errors produced by the loaders and by the query parser.
pub enum ParseError {
    /// The underlying file could not be read.
    #[error("I/O error while reading `{path}`: {source}")]
    Io {
        /// Path of the offending file.
        path: String,
        /// The operating-system error.
        #[source]
        source: std::io::Error,
    },
    /// The file extension maps to no known topology format.
    #[error("Cannot determine the file type of `{0}`")]
    UnknownExtension(String),
    /// A line did not match the expected shape of its format.
    #[error("Malformed {kind} line {line}: `{content}`")]
    MalformedLine {
        /// Short format name, e.g. `tgf` or `sample`.
        kind: &'static str,
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
    /// A TGF file contained no edge section.
    #[error("No edges read from file; either the `#` separator is missing or no edges are encoded")]
    NoEdges,
    /// A SIF file was read before any node alphabet was loaded.
    #[error("A .na node file has to be read before a .sif edge file")]
    MissingNodeFile,
    /// The discretisation control file is not valid JSON.
    #[error("Malformed discretisation control file: {0}")]
    Control(#[from] serde_json::Error),
    /// The control file names a method this engine does not implement.
    #[error("Unknown discretisation method `{0}`")]
    UnknownMethod(String),
    /// The named method needs a parameter the control file did not provide.
    #[error("Discretisation method `{method}` requires a `{parameter}` parameter")]
    MissingParameter {
        /// The discretisation method.
        method: String,
        /// Name of the missing parameter.
        parameter: &'static str,
    },
    /// The named method received a parameter outside its domain.
    #[error("Discretisation method `{method}` got an invalid `{parameter}` parameter")]
    InvalidParameter {
        /// The discretisation method.
        method: String,
        /// Name of the rejected parameter.
        parameter: &'static str,
    },
    /// A query token appeared where the grammar does not allow it.
    #[error("Unexpected token `{token}` at position {position} in query")]
    UnexpectedToken {
        /// The offending token.
        token: String,
        /// Zero-based token position.
        position: usize,
    },
    /// The query ended although the grammar required more tokens.
    #[error("Query ended unexpectedly; expected {expected}")]
    UnexpectedEnd {
        /// Description of what should have followed.
        expected: &'static str,
    },
    /// A name used in the input is not registered in the network.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
