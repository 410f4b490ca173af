//! Filter units.
//!
//! Every filter has one audio input and one audio output. Its compiled
//! document wraps the filter's own parameter block around the keys of
//! whatever arrives on `IN`:
//!
//! ```text
//! {"filter": {"lpf": {"cutoff": 2000}, "sine": {..}}}
//! ```

use serde_json::Map;

use crate::dsp::{
    emission::{keyed, merge_keys},
    number, Connections, Dial, Dials, Emission, PortDefinition, SignalType,
};

/// The effect a filter applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    LowPass,
    HighPass,
    Delay,
    Flanger,
    Distortion,
    Overdrive,
    Average,
}

impl FilterMode {
    /// All modes, in catalog order.
    pub const ALL: [FilterMode; 7] = [
        FilterMode::LowPass,
        FilterMode::HighPass,
        FilterMode::Delay,
        FilterMode::Flanger,
        FilterMode::Distortion,
        FilterMode::Overdrive,
        FilterMode::Average,
    ];

    /// Unit kind tag shown in the editor.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterMode::LowPass => "low pass filter",
            FilterMode::HighPass => "high pass filter",
            FilterMode::Delay => "delay",
            FilterMode::Flanger => "flanger",
            FilterMode::Distortion => "distortion",
            FilterMode::Overdrive => "overdrive",
            FilterMode::Average => "average",
        }
    }

    /// Key of the parameter block inside a `filter` document.
    pub fn key(&self) -> &'static str {
        match self {
            FilterMode::LowPass => "lpf",
            FilterMode::HighPass => "hpf",
            FilterMode::Delay => "delay",
            FilterMode::Flanger => "flanger",
            FilterMode::Distortion => "distortion",
            FilterMode::Overdrive => "overdrive",
            FilterMode::Average => "average",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.kind() == kind)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    fn dials(&self) -> Dials {
        match self {
            FilterMode::LowPass | FilterMode::HighPass => {
                Dials::new(vec![Dial::new("cutoff", 1.0, 22000.0, 5000.0)])
            }
            FilterMode::Delay => Dials::new(vec![
                Dial::new("time", 0.00001, 4.0, 1.0),
                Dial::new("factor", 0.0, 2.0, 1.0),
                Dial::new("feedback", 0.0, 2.0, 0.0),
            ]),
            _ => Dials::default(),
        }
    }
}

/// An audio filter or effect.
///
/// # Ports
///
/// - **IN** (Audio, Input): The signal to filter.
/// - **OUT** (Audio, Output): The filtered signal.
///
/// # Dials
///
/// - **cutoff** (1-22000 Hz): Low and high pass filters only.
/// - **time** (0.00001-4 s), **factor** (0-2), **feedback** (0-2): Delay only.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    mode: FilterMode,
    dials: Dials,
}

impl Filter {
    const PORTS: &'static [PortDefinition] = &[
        PortDefinition::input("IN", SignalType::Audio),
        PortDefinition::output("OUT", SignalType::Audio),
    ];

    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            dials: mode.dials(),
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
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
        let mut params = Map::new();
        for dial in self.dials.as_slice() {
            params.insert(dial.id.to_string(), number(dial.value));
        }

        let mut body = Map::new();
        body.insert(self.mode.key().to_string(), params.into());
        if let Some(upstream) = connections.resolve("IN") {
            merge_keys(&mut body, upstream);
        }

        Emission::Document(keyed("filter", body))
    }
}
