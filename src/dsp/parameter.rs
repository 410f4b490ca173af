//! Dial (parameter) definitions for units.
//!
//! Dials are the named numeric values on a unit. The user and the definition
//! loader write them; compilation only reads them.

/// A single named dial with its valid range and current value.
#[derive(Clone, Debug, PartialEq)]
pub struct Dial {
    /// Dial name, unique within its unit (e.g. "cutoff", "semitones").
    pub id: &'static str,
    /// Minimum value of the dial.
    pub min: f64,
    /// Maximum value of the dial.
    pub max: f64,
    /// Current value.
    pub value: f64,
}

impl Dial {
    /// Creates a dial holding its default value.
    pub const fn new(id: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            id,
            min,
            max,
            value: default,
        }
    }

    /// Clamps a value to this dial's valid range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Sets the value, clamped to the dial's range.
    pub fn set(&mut self, value: f64) {
        self.value = self.clamp(value);
    }
}

/// The ordered set of dials belonging to one unit instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dials {
    dials: Vec<Dial>,
}

impl Dials {
    /// Creates a dial set from its definitions.
    pub fn new(dials: Vec<Dial>) -> Self {
        Self { dials }
    }

    /// Returns the current value of a dial, if it exists.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.dials.iter().find(|d| d.id == id).map(|d| d.value)
    }

    /// Returns the current value of a dial, or 0.0 for an unknown id.
    ///
    /// Units only ask for dials they declare, so the fallback is never
    /// observed in practice.
    pub fn value(&self, id: &str) -> f64 {
        self.get(id).unwrap_or(0.0)
    }

    /// Sets a dial value (clamped). Returns false if no such dial exists.
    pub fn set(&mut self, id: &str, value: f64) -> bool {
        match self.dials.iter_mut().find(|d| d.id == id) {
            Some(dial) => {
                dial.set(value);
                true
            }
            None => false,
        }
    }

    /// Returns the dials as a slice.
    pub fn as_slice(&self) -> &[Dial] {
        &self.dials
    }

    /// Returns the number of dials.
    pub fn len(&self) -> usize {
        self.dials.len()
    }

    /// Returns true if the unit has no dials.
    pub fn is_empty(&self) -> bool {
        self.dials.is_empty()
    }
}
