//! Integer automations.

use serde_json::Map;

use crate::dsp::{emission::keyed, number, Dial, Dials, Emission, PortDefinition, SignalType};

/// How a range walks from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RangeKind {
    /// Cycles through every value in the range.
    Range,
    /// Sweeps up and back down.
    Sweep,
    /// Walks up once and holds.
    FadeIn,
}

impl RangeKind {
    pub const ALL: [RangeKind; 3] = [RangeKind::Range, RangeKind::Sweep, RangeKind::FadeIn];

    pub fn kind(&self) -> &'static str {
        match self {
            RangeKind::Range => "range",
            RangeKind::Sweep => "sweep",
            RangeKind::FadeIn => "fade_in",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.kind() == kind)
    }
}

/// Produces an integer automation, typically patched into a note or velocity.
///
/// # Ports
///
/// - **OUT** (Integer, Output)
///
/// # Dials
///
/// - **from**, **to** (0-127)
/// - **change_every** (0-128): Steps between value changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    kind: RangeKind,
    dials: Dials,
}

impl Range {
    const PORTS: &'static [PortDefinition] = &[PortDefinition::output("OUT", SignalType::Integer)];

    pub fn new(kind: RangeKind) -> Self {
        Self {
            kind,
            dials: Dials::new(vec![
                Dial::new("from", 0.0, 127.0, 0.0),
                Dial::new("to", 0.0, 127.0, 127.0),
                Dial::new("change_every", 0.0, 128.0, 1.0),
            ]),
        }
    }

    pub fn kind(&self) -> RangeKind {
        self.kind
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
        let mut body = Map::new();
        for dial in self.dials.as_slice() {
            body.insert(dial.id.to_string(), number(dial.value));
        }
        Emission::Document(keyed(self.kind.kind(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_kinds() {
        assert_eq!(RangeKind::from_kind("fade_in"), Some(RangeKind::FadeIn));
        assert_eq!(RangeKind::from_kind("cycle"), None);
    }

    #[test]
    fn test_range_document() {
        let mut sweep = Range::new(RangeKind::Sweep);
        sweep.dials_mut().set("from", 40.0);
        sweep.dials_mut().set("to", 80.0);

        assert_eq!(
            sweep.compile().into_document(),
            Some(json!({"sweep": {"from": 40, "to": 80, "change_every": 1}}))
        );
    }
}
