//! Connection validation for patch graphs.
//!
//! Every rejected patch attempt maps to one [`ConnectionError`]. The graph
//! is never modified when one is returned.

use thiserror::Error;

use super::patchable::ModuleId;
use crate::dsp::{PortDirection, SignalType};

/// What a successful `connect` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchChange {
    /// A new patch was added.
    Connected,
    /// An existing patch between the same two sockets was removed.
    Disconnected,
}

/// Errors that can occur when attempting to connect sockets.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// One of the modules is not part of the graph.
    #[error("module {0} does not exist")]
    ModuleNotFound(ModuleId),
    /// The module's unit has no socket with that name.
    #[error("module {module} has no socket named '{socket}'")]
    UnknownSocket { module: ModuleId, socket: String },
    /// Both ends name the same socket on the same module.
    #[error("cannot connect a socket to itself")]
    SelfConnection,
    /// The sockets carry different signal types.
    #[error("cannot connect {from_type} to {to_type}")]
    IncompatibleTypes {
        from_type: SignalType,
        to_type: SignalType,
    },
    /// Both sockets are inputs, or both are outputs.
    #[error("cannot connect two {} sockets", .direction.name())]
    DirectionMismatch { direction: PortDirection },
}

impl ConnectionError {
    /// Returns a short message for the editor's warning line.
    pub fn message(&self) -> &'static str {
        match self {
            ConnectionError::ModuleNotFound(_) => "Module no longer exists",
            ConnectionError::UnknownSocket { .. } => "Unknown socket",
            ConnectionError::SelfConnection => "Cannot connect a socket to itself",
            ConnectionError::IncompatibleTypes { from_type, to_type } => {
                match (from_type, to_type) {
                    (SignalType::Clock, SignalType::Trigger) => {
                        "Clock needs a pulse before it can trigger notes"
                    }
                    (SignalType::Frequency, SignalType::Panning) => {
                        "Frequency needs a panning unit before it can pan"
                    }
                    (SignalType::Audio, _) | (_, SignalType::Audio) => {
                        "Audio can only be patched into audio inputs"
                    }
                    _ => "Incompatible signal types",
                }
            }
            ConnectionError::DirectionMismatch { direction } => match direction {
                PortDirection::Input => "Cannot connect two inputs",
                PortDirection::Output => "Cannot connect two outputs",
            },
        }
    }
}

/// Checks whether a patch may join two socket types.
pub fn validate_connection(
    from_type: SignalType,
    to_type: SignalType,
) -> Result<(), ConnectionError> {
    if from_type.can_connect_to(to_type) {
        Ok(())
    } else {
        Err(ConnectionError::IncompatibleTypes { from_type, to_type })
    }
}
