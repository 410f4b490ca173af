//! Graph boundary units.
//!
//! Every instrument graph has an `input` (the played note's frequency) and an
//! `output` (the audio handed to the channel). Sequence graphs only have an
//! `input`, the sequencer clock.

use crate::dsp::{Connections, Emission, PortDefinition, SignalType};

/// The note frequency entering an instrument.
///
/// # Ports
///
/// - **FREQ** (Frequency, Output): The frequency of the note being played.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelInput;

impl ChannelInput {
    pub const KIND: &'static str = "input";

    const PORTS: &'static [PortDefinition] =
        &[PortDefinition::output("FREQ", SignalType::Frequency)];

    pub fn ports(&self) -> &'static [PortDefinition] {
        Self::PORTS
    }

    /// Pitch follows the played note, so there is nothing to declare.
    pub fn compile(&self) -> Emission {
        Emission::Nothing
    }
}

/// The audio leaving an instrument. Its resolved input is the instrument.
///
/// # Ports
///
/// - **IN** (Audio, Input): Everything that should be heard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelOutput;

impl ChannelOutput {
    pub const KIND: &'static str = "output";

    const PORTS: &'static [PortDefinition] = &[PortDefinition::input("IN", SignalType::Audio)];

    pub fn ports(&self) -> &'static [PortDefinition] {
        Self::PORTS
    }

    /// Resolves `IN`: one producer is used directly, several are combined.
    pub fn compile(&self, connections: &Connections) -> Emission {
        match connections.resolve("IN") {
            Some(doc) => Emission::Document(doc),
            None => Emission::Nothing,
        }
    }
}

/// The sequencer clock entering a sequence.
///
/// # Ports
///
/// - **CLOCK** (Clock, Output): One tick per sequencer step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClockInput;

impl ClockInput {
    pub const KIND: &'static str = "input";

    const PORTS: &'static [PortDefinition] = &[PortDefinition::output("CLOCK", SignalType::Clock)];

    pub fn ports(&self) -> &'static [PortDefinition] {
        Self::PORTS
    }

    pub fn compile(&self) -> Emission {
        Emission::Nothing
    }
}
