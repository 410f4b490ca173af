//! Units deriving control signals from the played frequency.

use serde_json::Map;

use crate::dsp::{
    emission::{keyed, merge_keys},
    number, Connections, Dial, Dials, Emission, PortDefinition, SignalType,
};

/// Shifts an incoming frequency by a number of semitones.
///
/// # Ports
///
/// - **FREQ IN** (Frequency, Input)
/// - **FREQ** (Frequency, Output)
///
/// # Dials
///
/// - **semitones** (-24 to 24)
#[derive(Clone, Debug, PartialEq)]
pub struct Transpose {
    dials: Dials,
}

impl Transpose {
    pub const KIND: &'static str = "transpose";

    const PORTS: &'static [PortDefinition] = &[
        PortDefinition::input("FREQ IN", SignalType::Frequency),
        PortDefinition::output("FREQ", SignalType::Frequency),
    ];

    pub fn new() -> Self {
        Self {
            dials: Dials::new(vec![Dial::new("semitones", -24.0, 24.0, 0.0)]),
        }
    }

    pub fn ports(&self) -> &'static [PortDefinition] {
        Self::PORTS
    }

    pub fn dials(&self) -> &Dials {
        &self.dials
    }

    pub fn dials_mut(&mut self) -> &mut Dials {
        &mut self.dials
    }

    pub fn compile(&self, connections: &Connections) -> Emission {
        let mut body = Map::new();
        body.insert("semitones".to_string(), number(self.dials.value("semitones")));
        if let Some(upstream) = connections.resolve("FREQ IN") {
            merge_keys(&mut body, upstream);
        }
        Emission::Document(keyed(Self::KIND, body))
    }
}

impl Default for Transpose {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a stereo position from a frequency.
///
/// # Ports
///
/// - **FREQ** (Frequency, Input)
/// - **PAN** (Panning, Output)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Panning {
    dials: Dials,
}

impl Panning {
    pub const KIND: &'static str = "panning";

    const PORTS: &'static [PortDefinition] = &[
        PortDefinition::input("FREQ", SignalType::Frequency),
        PortDefinition::output("PAN", SignalType::Panning),
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn ports(&self) -> &'static [PortDefinition] {
        Self::PORTS
    }

    pub fn dials(&self) -> &Dials {
        &self.dials
    }

    pub fn dials_mut(&mut self) -> &mut Dials {
        &mut self.dials
    }

    pub fn compile(&self, connections: &Connections) -> Emission {
        let mut body = Map::new();
        if let Some(upstream) = connections.resolve("FREQ") {
            merge_keys(&mut body, upstream);
        }
        Emission::Document(keyed(Self::KIND, body))
    }
}
