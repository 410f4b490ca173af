//! Note trigger, the terminal unit of a sequence.

use serde_json::{Map, Value};

use crate::dsp::{emission::keyed, number, Connections, Dial, Dials, Emission, PortDefinition, SignalType};

/// Plays a note on the sequence's channel whenever it is triggered.
///
/// Each transform arriving on `TRIG` wraps its own copy of the note, so a
/// note fed by two pulses yields two documents.
///
/// # Ports
///
/// - **TRIG** (Trigger, Input): Pulses deciding when the note plays.
/// - **NOTE** (Integer, Input): Replaces the note dial with an automation.
/// - **VEL** (Integer, Input): Replaces the velocity dial with an automation.
///
/// # Dials
///
/// - **note** (0-128)
/// - **velocity** (0-10)
/// - **duration** (0-10)
#[derive(Clone, Debug, PartialEq)]
pub struct PlayNote {
    dials: Dials,
}

impl PlayNote {
    pub const KIND: &'static str = "play_note";

    const PORTS: &'static [PortDefinition] = &[
        PortDefinition::input("TRIG", SignalType::Trigger),
        PortDefinition::input("NOTE", SignalType::Integer),
        PortDefinition::input("VEL", SignalType::Integer),
    ];

    pub fn new() -> Self {
        Self {
            dials: Dials::new(vec![
                Dial::new("note", 0.0, 128.0, 1.0),
                Dial::new("velocity", 0.0, 10.0, 1.0),
                Dial::new("duration", 0.0, 10.0, 1.0),
            ]),
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

    /// Builds the bare note for `channel`, before any trigger wraps it.
    ///
    /// Automations take precedence over dials; only the first one patched
    /// into a socket is used.
    pub fn note(&self, channel: u8, connections: &Connections) -> Value {
        let mut body = Map::new();
        body.insert("duration".to_string(), number(self.dials.value("duration")));
        body.insert("channel".to_string(), Value::from(channel));

        match connections.documents("NOTE").next() {
            Some(auto) => body.insert("auto_note".to_string(), auto.clone()),
            None => body.insert("note".to_string(), number(self.dials.value("note"))),
        };
        match connections.documents("VEL").next() {
            Some(auto) => body.insert("auto_velocity".to_string(), auto.clone()),
            None => body.insert("velocity".to_string(), number(self.dials.value("velocity"))),
        };

        keyed(Self::KIND, body)
    }

    pub fn compile(&self, channel: u8, connections: &Connections) -> Emission {
        let note = self.note(channel, connections);
        let events = connections
            .transforms("TRIG")
            .map(|wrap| wrap(note.clone()))
            .collect();
        Emission::Events(events)
    }
}

impl Default for PlayNote {
    fn default() -> Self {
        Self::new()
    }
}
