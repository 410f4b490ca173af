//! Signal types carried by patch cables.
//!
//! Every socket declares exactly one signal type and a cable may only join
//! two sockets of the same type.

use std::fmt;

/// The kind of signal flowing through a patch.
///
/// - **Audio**: Sample streams produced by generators and filters
/// - **Frequency**: Pitch information (the played note, transposed pitch)
/// - **Panning**: Stereo placement derived from a frequency source
/// - **Clock**: The sequencer clock driving pulses
/// - **Trigger**: Note triggers emitted by pulses
/// - **Integer**: Integer automations such as note and velocity ranges
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalType {
    Audio,
    Frequency,
    Panning,
    Clock,
    Trigger,
    Integer,
}

impl SignalType {
    /// All signal types, in declaration order.
    pub const ALL: [SignalType; 6] = [
        SignalType::Audio,
        SignalType::Frequency,
        SignalType::Panning,
        SignalType::Clock,
        SignalType::Trigger,
        SignalType::Integer,
    ];

    /// Checks if a connection from this signal type to another is valid.
    ///
    /// Unlike voltage-style modular systems there are no implicit
    /// conversions: the two ends must carry the same type.
    pub fn can_connect_to(&self, target: SignalType) -> bool {
        *self == target
    }

    /// Returns a human-readable name for the signal type.
    pub fn name(&self) -> &'static str {
        match self {
            SignalType::Audio => "Audio",
            SignalType::Frequency => "Frequency",
            SignalType::Panning => "Panning",
            SignalType::Clock => "Clock",
            SignalType::Trigger => "Trigger",
            SignalType::Integer => "Integer",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
