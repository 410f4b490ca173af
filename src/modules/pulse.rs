//! Clock divider.

use std::rc::Rc;

use serde_json::Map;

use crate::dsp::{
    emission::{keyed, merge_keys},
    number, Dial, Dials, Emission, PortDefinition, SignalType, Transform,
};

/// Fires a trigger every N clock ticks.
///
/// A pulse does not produce a document of its own. It compiles to a
/// transform that wraps the note a `play_note` builds:
///
/// ```text
/// {"play_note": {..}}  ->  {"repeat": {"every": 2, "play_note": {..}}}
/// ```
///
/// # Ports
///
/// - **CLOCK** (Clock, Input)
/// - **TRIG** (Trigger, Output)
///
/// # Dials
///
/// - **every** (0-10): Ticks between triggers.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    dials: Dials,
}

impl Pulse {
    pub const KIND: &'static str = "pulse";

    const PORTS: &'static [PortDefinition] = &[
        PortDefinition::input("CLOCK", SignalType::Clock),
        PortDefinition::output("TRIG", SignalType::Trigger),
    ];

    pub fn new() -> Self {
        Self {
            dials: Dials::new(vec![Dial::new("every", 0.0, 10.0, 1.0)]),
        }
    }

    /// Creates a pulse firing every `every` ticks.
    pub fn every(every: f64) -> Self {
        let mut pulse = Self::new();
        pulse.dials.set("every", every);
        pulse
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

    pub fn compile(&self) -> Emission {
        let every = number(self.dials.value("every"));
        let wrap: Transform = Rc::new(move |note| {
            let mut body = Map::new();
            body.insert("every".to_string(), every.clone());
            merge_keys(&mut body, note);
            keyed("repeat", body)
        });
        Emission::Transform(wrap)
    }
}

impl Default for Pulse {
    fn default() -> Self {
        Self::new()
    }
}
