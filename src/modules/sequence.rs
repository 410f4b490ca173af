//! The sequence unit catalog.

use super::boundary::ClockInput;
use super::play_note::PlayNote;
use super::pulse::Pulse;
use super::range::{Range, RangeKind};
use crate::dsp::{Connections, Dial, Emission, PortDefinition, Unit, UnitRegistry};

/// What every sequence unit is compiled against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceContext {
    /// MIDI-style channel the notes are played on.
    pub channel: u8,
}

/// Every kind of unit a sequence graph can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum SequenceUnit {
    Input(ClockInput),
    Pulse(Pulse),
    Range(Range),
    PlayNote(PlayNote),
}

impl SequenceUnit {
    /// Builds the registry of every sequence kind.
    pub fn registry() -> UnitRegistry<Self> {
        let mut registry = UnitRegistry::new();
        registry.register(|| SequenceUnit::Input(ClockInput));
        registry.register(|| SequenceUnit::Pulse(Pulse::new()));
        registry.register(|| SequenceUnit::Range(Range::new(RangeKind::Range)));
        registry.register(|| SequenceUnit::Range(Range::new(RangeKind::Sweep)));
        registry.register(|| SequenceUnit::Range(Range::new(RangeKind::FadeIn)));
        registry.register(|| SequenceUnit::PlayNote(PlayNote::new()));
        registry
    }

    /// Returns true for the terminal `play_note` kind.
    pub fn is_sink(&self) -> bool {
        matches!(self, SequenceUnit::PlayNote(_))
    }
}

impl Unit for SequenceUnit {
    type Context = SequenceContext;

    fn kind(&self) -> &'static str {
        match self {
            SequenceUnit::Input(_) => ClockInput::KIND,
            SequenceUnit::Pulse(_) => Pulse::KIND,
            SequenceUnit::Range(r) => r.kind().kind(),
            SequenceUnit::PlayNote(_) => PlayNote::KIND,
        }
    }

    fn ports(&self) -> &'static [PortDefinition] {
        match self {
            SequenceUnit::Input(i) => i.ports(),
            SequenceUnit::Pulse(p) => p.ports(),
            SequenceUnit::Range(r) => r.ports(),
            SequenceUnit::PlayNote(n) => n.ports(),
        }
    }

    fn dials(&self) -> &[Dial] {
        match self {
            SequenceUnit::Input(_) => &[],
            SequenceUnit::Pulse(p) => p.dials().as_slice(),
            SequenceUnit::Range(r) => r.dials().as_slice(),
            SequenceUnit::PlayNote(n) => n.dials().as_slice(),
        }
    }

    fn set_dial(&mut self, id: &str, value: f64) -> bool {
        match self {
            SequenceUnit::Input(_) => false,
            SequenceUnit::Pulse(p) => p.dials_mut().set(id, value),
            SequenceUnit::Range(r) => r.dials_mut().set(id, value),
            SequenceUnit::PlayNote(n) => n.dials_mut().set(id, value),
        }
    }

    fn compile(&self, context: &SequenceContext, connections: &Connections) -> Emission {
        match self {
            SequenceUnit::Input(i) => i.compile(),
            SequenceUnit::Pulse(p) => p.compile(),
            SequenceUnit::Range(r) => r.compile(),
            SequenceUnit::PlayNote(n) => n.compile(context.channel, connections),
        }
    }
}
