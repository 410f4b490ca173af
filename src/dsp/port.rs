//! Socket definitions for units.
//!
//! Sockets are the named connection points on a unit. They carry no state:
//! which sockets are connected is recorded by the graph's patches.

use super::SignalType;

/// Direction of a socket on a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// A socket that consumes a signal.
    Input,
    /// A socket that produces a signal.
    Output,
}

impl PortDirection {
    /// Returns a human-readable name for the port direction.
    pub fn name(&self) -> &'static str {
        match self {
            PortDirection::Input => "Input",
            PortDirection::Output => "Output",
        }
    }
}

/// Definition of a socket on a unit.
///
/// The name is unique within its unit and is what patches refer to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDefinition {
    /// Socket name, e.g. "IN", "FREQ IN", "TRIG".
    pub name: &'static str,
    /// Whether this is an input or output socket.
    pub direction: PortDirection,
    /// The type of signal this socket accepts or produces.
    pub signal_type: SignalType,
}

impl PortDefinition {
    /// Creates a new input socket definition.
    pub const fn input(name: &'static str, signal_type: SignalType) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            signal_type,
        }
    }

    /// Creates a new output socket definition.
    pub const fn output(name: &'static str, signal_type: SignalType) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            signal_type,
        }
    }

    /// Returns true if this is an input socket.
    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    /// Returns true if this is an output socket.
    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_direction_names() {
        assert_eq!(PortDirection::Input.name(), "Input");
        assert_eq!(PortDirection::Output.name(), "Output");
    }

    #[test]
    fn test_input_port_creation() {
        let port = PortDefinition::input("FREQ IN", SignalType::Frequency);
        assert_eq!(port.name, "FREQ IN");
        assert!(port.is_input());
        assert!(!port.is_output());
        assert_eq!(port.signal_type, SignalType::Frequency);
    }

    #[test]
    fn test_output_port_creation() {
        let port = PortDefinition::output("OUT", SignalType::Audio);
        assert!(port.is_output());
        assert!(!port.is_input());
    }
}
