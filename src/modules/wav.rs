//! Sample file generator.

use serde_json::{Map, Value};

use super::generator::{generator_dials, GENERATOR_PORTS};
use crate::dsp::{emission::keyed, number, Dials, Emission, PortDefinition};

/// Plays a sample file, optionally repitched relative to `base_pitch`.
///
/// Shares the sockets and dials of the waveform generators, but only the gain
/// ends up in the compiled document.
#[derive(Clone, Debug, PartialEq)]
pub struct WavGenerator {
    /// Path of the sample as known to the engine.
    pub file: String,
    /// Whether the sample follows the played note.
    pub pitched: bool,
    /// The pitch the sample was recorded at.
    pub base_pitch: f64,
    dials: Dials,
}

impl WavGenerator {
    pub const KIND: &'static str = "wav";

    pub fn new() -> Self {
        Self {
            file: String::new(),
            pitched: false,
            base_pitch: 440.0,
            dials: generator_dials(),
        }
    }

    pub fn ports(&self) -> &'static [PortDefinition] {
        GENERATOR_PORTS
    }

    pub fn dials(&self) -> &Dials {
        &self.dials
    }

    pub fn dials_mut(&mut self) -> &mut Dials {
        &mut self.dials
    }

    pub fn compile(&self) -> Emission {
        let mut body = Map::new();
        body.insert("file".to_string(), Value::String(self.file.clone()));
        body.insert("gain".to_string(), number(self.dials.value("gain")));
        body.insert("pitched".to_string(), Value::Bool(self.pitched));
        body.insert("base_pitch".to_string(), number(self.base_pitch));
        Emission::Document(keyed(Self::KIND, body))
    }
}

impl Default for WavGenerator {
    fn default() -> Self {
        Self::new()
    }
}
