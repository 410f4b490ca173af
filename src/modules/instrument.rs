//! The instrument unit catalog.

use super::boundary::{ChannelInput, ChannelOutput};
use super::derived::{Panning, Transpose};
use super::filter::{Filter, FilterMode};
use super::generator::{Generator, Waveform};
use super::wav::WavGenerator;
use crate::dsp::{Connections, Dial, Dials, Emission, PortDefinition, Unit, UnitRegistry};

/// Every kind of unit an instrument graph can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum InstrumentUnit {
    Input(ChannelInput),
    Output(ChannelOutput),
    Generator(Generator),
    Wav(WavGenerator),
    Filter(Filter),
    Transpose(Transpose),
    Panning(Panning),
}

impl InstrumentUnit {
    /// Builds the registry of every instrument kind.
    pub fn registry() -> UnitRegistry<Self> {
        let mut registry = UnitRegistry::new();
        registry.register(|| InstrumentUnit::Input(ChannelInput));
        registry.register(|| InstrumentUnit::Output(ChannelOutput));
        registry.register(|| InstrumentUnit::Generator(Generator::new(Waveform::Sine)));
        registry.register(|| InstrumentUnit::Generator(Generator::new(Waveform::Square)));
        registry.register(|| InstrumentUnit::Generator(Generator::new(Waveform::Saw)));
        registry.register(|| InstrumentUnit::Generator(Generator::new(Waveform::Triangle)));
        registry.register(|| InstrumentUnit::Generator(Generator::new(Waveform::WhiteNoise)));
        registry.register(|| InstrumentUnit::Generator(Generator::new(Waveform::Pulse)));
        registry.register(|| InstrumentUnit::Wav(WavGenerator::new()));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::LowPass)));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::HighPass)));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::Delay)));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::Flanger)));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::Distortion)));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::Overdrive)));
        registry.register(|| InstrumentUnit::Filter(Filter::new(FilterMode::Average)));
        registry.register(|| InstrumentUnit::Transpose(Transpose::new()));
        registry.register(|| InstrumentUnit::Panning(Panning::new()));
        registry
    }

    /// Returns true for the sound sources (waveforms and samples).
    pub fn is_generator(&self) -> bool {
        matches!(self, InstrumentUnit::Generator(_) | InstrumentUnit::Wav(_))
    }

    fn dial_set(&self) -> Option<&Dials> {
        match self {
            InstrumentUnit::Input(_) | InstrumentUnit::Output(_) => None,
            InstrumentUnit::Generator(g) => Some(g.dials()),
            InstrumentUnit::Wav(w) => Some(w.dials()),
            InstrumentUnit::Filter(f) => Some(f.dials()),
            InstrumentUnit::Transpose(t) => Some(t.dials()),
            InstrumentUnit::Panning(p) => Some(p.dials()),
        }
    }

    fn dial_set_mut(&mut self) -> Option<&mut Dials> {
        match self {
            InstrumentUnit::Input(_) | InstrumentUnit::Output(_) => None,
            InstrumentUnit::Generator(g) => Some(g.dials_mut()),
            InstrumentUnit::Wav(w) => Some(w.dials_mut()),
            InstrumentUnit::Filter(f) => Some(f.dials_mut()),
            InstrumentUnit::Transpose(t) => Some(t.dials_mut()),
            InstrumentUnit::Panning(p) => Some(p.dials_mut()),
        }
    }
}

impl Unit for InstrumentUnit {
    type Context = ();

    fn kind(&self) -> &'static str {
        match self {
            InstrumentUnit::Input(_) => ChannelInput::KIND,
            InstrumentUnit::Output(_) => ChannelOutput::KIND,
            InstrumentUnit::Generator(g) => g.waveform().kind(),
            InstrumentUnit::Wav(_) => WavGenerator::KIND,
            InstrumentUnit::Filter(f) => f.mode().kind(),
            InstrumentUnit::Transpose(_) => Transpose::KIND,
            InstrumentUnit::Panning(_) => Panning::KIND,
        }
    }

    fn ports(&self) -> &'static [PortDefinition] {
        match self {
            InstrumentUnit::Input(i) => i.ports(),
            InstrumentUnit::Output(o) => o.ports(),
            InstrumentUnit::Generator(g) => g.ports(),
            InstrumentUnit::Wav(w) => w.ports(),
            InstrumentUnit::Filter(f) => f.ports(),
            InstrumentUnit::Transpose(t) => t.ports(),
            InstrumentUnit::Panning(p) => p.ports(),
        }
    }

    fn dials(&self) -> &[Dial] {
        self.dial_set().map(Dials::as_slice).unwrap_or(&[])
    }

    fn set_dial(&mut self, id: &str, value: f64) -> bool {
        self.dial_set_mut()
            .map(|dials| dials.set(id, value))
            .unwrap_or(false)
    }

    fn compile(&self, _context: &(), connections: &Connections) -> Emission {
        match self {
            InstrumentUnit::Input(i) => i.compile(),
            InstrumentUnit::Output(o) => o.compile(connections),
            InstrumentUnit::Generator(g) => g.compile(connections),
            InstrumentUnit::Wav(w) => w.compile(),
            InstrumentUnit::Filter(f) => f.compile(connections),
            InstrumentUnit::Transpose(t) => t.compile(connections),
            InstrumentUnit::Panning(p) => p.compile(connections),
        }
    }
}
