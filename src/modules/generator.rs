//! Sample generator units.
//!
//! Generators are the sound sources of an instrument: a waveform with a gain,
//! a stereo position and an ADSR envelope. Their pitch is either a fixed dial
//! or whatever frequency document is patched into `FREQ`.

use serde_json::Map;

use crate::dsp::{emission::keyed, number, Connections, Dial, Dials, Emission, PortDefinition, SignalType};

/// Waveform shapes available as generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
    WhiteNoise,
    Pulse,
}

impl Waveform {
    /// All waveforms, in catalog order.
    pub const ALL: [Waveform; 6] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
        Waveform::WhiteNoise,
        Waveform::Pulse,
    ];

    /// Unit kind tag shown in the editor.
    pub fn kind(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
            Waveform::Triangle => "triangle",
            Waveform::WhiteNoise => "white_noise",
            Waveform::Pulse => "pulse",
        }
    }

    /// Key used in instrument documents. Only the saw differs from its kind.
    pub fn document_key(&self) -> &'static str {
        match self {
            Waveform::Saw => "sawtooth",
            other => other.kind(),
        }
    }

    /// Looks a waveform up by document key, accepting the editor's `saw` too.
    pub fn from_document_key(key: &str) -> Option<Self> {
        match key {
            "sawtooth" => Some(Waveform::Saw),
            _ => Self::ALL.into_iter().find(|w| w.kind() == key),
        }
    }
}

/// The dials shared by every generator, with their editor ranges.
pub(crate) fn generator_dials() -> Dials {
    Dials::new(vec![
        Dial::new("pitch", 0.0, 22000.0, 0.0),
        Dial::new("gain", 0.0, 4.0, 1.0),
        Dial::new("panning", 0.0, 1.0, 0.5),
        Dial::new("attack", 0.0, 10.0, 0.1),
        Dial::new("decay", 0.0, 10.0, 0.1),
        Dial::new("sustain", 0.0, 1.0, 0.8),
        Dial::new("release", 0.0, 10.0, 0.1),
    ])
}

/// Sockets shared by every generator.
pub(crate) const GENERATOR_PORTS: &[PortDefinition] = &[
    PortDefinition::input("FREQ", SignalType::Frequency),
    PortDefinition::input("PAN", SignalType::Panning),
    PortDefinition::output("OUT", SignalType::Audio),
];

/// A waveform generator.
///
/// # Ports
///
/// - **FREQ** (Frequency, Input): Pitch source; replaces the pitch dial.
/// - **PAN** (Panning, Input): Stereo position source.
/// - **OUT** (Audio, Output): The generated sound.
///
/// # Dials
///
/// - **pitch** (0-22000 Hz): Fixed pitch, used only while FREQ is unpatched.
/// - **gain** (0-4)
/// - **panning** (0-1)
/// - **attack**, **decay**, **release** (0-10 s) and **sustain** (0-1)
#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    waveform: Waveform,
    dials: Dials,
}

impl Generator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            dials: generator_dials(),
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
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

    /// Folds the dials into `{<waveform>: {..}}`.
    ///
    /// A patched `FREQ` suppresses the static pitch; if its producer
    /// contributed a document that document becomes `auto_pitch`. A patch
    /// from the instrument input contributes nothing, so the generator
    /// simply follows the played note.
    pub fn compile(&self, connections: &Connections) -> Emission {
        let mut body = Map::new();
        for id in ["gain", "panning", "attack", "decay", "sustain", "release"] {
            body.insert(id.to_string(), number(self.dials.value(id)));
        }

        if connections.is_connected("FREQ") {
            if let Some(pitch) = connections.resolve("FREQ") {
                body.insert("auto_pitch".to_string(), pitch);
            }
        } else {
            body.insert("pitch".to_string(), number(self.dials.value("pitch")));
        }

        Emission::Document(keyed(self.waveform.document_key(), body))
    }
}
