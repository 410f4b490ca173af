//! Error types for loading and saving graphs.

use thiserror::Error;

use crate::graph::ConnectionError;

/// Errors that can occur while turning documents or files into graphs.
///
/// These are all fatal: a definition that cannot be represented exactly would
/// otherwise lose audio or sequencing behaviour without anyone noticing.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The definition has none of the keys the loader understands.
    #[error("unknown instrument definition: {0}")]
    UnknownDefinition(String),

    /// A filter definition names no known filter mode.
    #[error("unknown filter definition: {0}")]
    UnknownFilter(String),

    /// A saved node names a unit kind that is not registered.
    #[error("unknown unit kind: {0}")]
    UnknownKind(String),

    /// A patch between two sockets could not be made.
    #[error("invalid connection {from} → {to}: {source}")]
    InvalidConnection {
        from: String,
        to: String,
        #[source]
        source: ConnectionError,
    },

    /// The same two sockets are listed twice. Replaying the second entry
    /// would remove the patch the first one made.
    #[error("duplicate connection {from} → {to}")]
    DuplicateConnection { from: String, to: String },

    /// A graph file holds the other flavour of graph.
    #[error("file holds a {found} graph, expected {expected}")]
    GraphKindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A saved connection refers to a node index that does not exist.
    #[error("connection refers to missing node {0}")]
    MissingModule(usize),

    /// Failed to read or write a file.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or produce JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file was written by a newer version of the format.
    #[error("incompatible file version: found {found}, expected <= {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::SignalType;
    use std::error::Error as _;

    #[test]
    fn test_unknown_definition_names_offender() {
        let err = DefinitionError::UnknownDefinition("{\"organ\":{}}".to_string());
        assert_eq!(err.to_string(), "unknown instrument definition: {\"organ\":{}}");
    }

    #[test]
    fn test_invalid_connection_has_source() {
        let err = DefinitionError::InvalidConnection {
            from: "0.FREQ".to_string(),
            to: "1.IN".to_string(),
            source: ConnectionError::IncompatibleTypes {
                from_type: SignalType::Frequency,
                to_type: SignalType::Audio,
            },
        };
        assert!(err.to_string().starts_with("invalid connection 0.FREQ → 1.IN"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_version_message() {
        let err = DefinitionError::IncompatibleVersion {
            found: 9,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "incompatible file version: found 9, expected <= 1"
        );
    }
}
