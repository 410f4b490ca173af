//! The core Unit trait.
//!
//! A unit is the behaviour a graph module wraps: a kind tag, a fixed set of
//! sockets and dials, and the rule that turns upstream documents into its
//! own contribution to the compiled definition.

use super::emission::{Connections, Emission};
use super::parameter::Dial;
use super::port::PortDefinition;

/// The interface every unit catalog implements.
///
/// Catalogs are closed enums (one per graph flavour), so adding a kind is an
/// exhaustive-match change rather than a new string comparison.
///
/// # Purity
///
/// `compile` must be a pure function of the unit's dial values and the
/// connections it is given. The compilers call it on a snapshot of the
/// graph, never on the live modules.
pub trait Unit: Clone {
    /// Extra information the compile pass hands to every unit.
    type Context;

    /// Returns the kind tag (e.g. "sine", "low pass filter", "play_note").
    fn kind(&self) -> &'static str;

    /// Returns the socket definitions for this unit.
    fn ports(&self) -> &'static [PortDefinition];

    /// Returns the dials for this unit, in declaration order.
    fn dials(&self) -> &[Dial];

    /// Sets a dial value (clamped to its range).
    ///
    /// Returns false if the unit has no dial with that id.
    fn set_dial(&mut self, id: &str, value: f64) -> bool;

    /// Produces this unit's contribution from its upstream emissions.
    fn compile(&self, context: &Self::Context, connections: &Connections) -> Emission;

    /// Looks up a socket by name.
    fn port(&self, name: &str) -> Option<&'static PortDefinition> {
        self.ports().iter().find(|p| p.name == name)
    }

    /// Returns the input sockets.
    fn inputs(&self) -> impl Iterator<Item = &'static PortDefinition> {
        self.ports().iter().filter(|p| p.is_input())
    }

    /// Returns the current value of a dial.
    fn dial(&self, id: &str) -> Option<f64> {
        self.dials().iter().find(|d| d.id == id).map(|d| d.value)
    }
}
