//! The patch graph.
//!
//! A [`Patchable`] owns an ordered list of modules and the patches between
//! their sockets. It is the one place where patches are created or removed,
//! so the graph invariants hold after every call:
//!
//! - every patch names two live modules and two existing sockets
//! - both ends of a patch carry the same signal type
//! - `from` is the output socket and `to` the input socket
//! - at most one patch joins any pair of sockets

use std::fmt;

use super::patch::{Endpoint, Patch};
use super::validation::{validate_connection, ConnectionError, PatchChange};
use crate::dsp::Unit;

/// Stable identity of a module within its graph.
///
/// Ids are handed out in increasing order and never reused, so removing a
/// module cannot make a patch point at a different one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Returns the raw id.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit placed in a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Module<U> {
    id: ModuleId,
    /// Editor position, carried through save and load.
    pub position: [f32; 2],
    pub unit: U,
}

impl<U> Module<U> {
    pub fn id(&self) -> ModuleId {
        self.id
    }
}

/// An ordered collection of modules plus the patches between them.
#[derive(Clone, Debug)]
pub struct Patchable<U: Unit> {
    modules: Vec<Module<U>>,
    patches: Vec<Patch>,
    next_id: usize,
}

impl<U: Unit> Patchable<U> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            patches: Vec::new(),
            next_id: 0,
        }
    }

    /// Returns the modules in insertion order.
    pub fn modules(&self) -> &[Module<U>] {
        &self.modules
    }

    /// Returns every patch, in the order they were made.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Returns the number of modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Returns the number of patches.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Returns a module by id.
    pub fn module(&self, id: ModuleId) -> Option<&Module<U>> {
        self.index_of(id).map(|ix| &self.modules[ix])
    }

    /// Returns a mutable module by id.
    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut Module<U>> {
        let ix = self.index_of(id)?;
        Some(&mut self.modules[ix])
    }

    /// Returns the unit of a module.
    pub fn unit(&self, id: ModuleId) -> Option<&U> {
        self.module(id).map(|m| &m.unit)
    }

    /// Returns the position of a module in insertion order.
    pub fn index_of(&self, id: ModuleId) -> Option<usize> {
        // Ids grow with insertion order, so the list is sorted by id.
        self.modules.binary_search_by_key(&id, |m| m.id).ok()
    }

    /// Returns the first module of the given kind.
    pub fn find_kind(&self, kind: &str) -> Option<ModuleId> {
        self.modules_of_kind(kind).next()
    }

    /// Returns every module of the given kind, in insertion order.
    pub fn modules_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = ModuleId> + 'a {
        self.modules
            .iter()
            .filter(move |m| m.unit.kind() == kind)
            .map(|m| m.id)
    }

    // ========================================================================
    // Module Management
    // ========================================================================

    /// Appends a module at the origin.
    pub fn add_module(&mut self, unit: U) -> ModuleId {
        self.add_module_at(unit, [0.0, 0.0])
    }

    /// Appends a module at an editor position.
    pub fn add_module_at(&mut self, unit: U, position: [f32; 2]) -> ModuleId {
        let id = ModuleId(self.next_id);
        self.next_id += 1;
        tracing::debug!("graph_add: {} module {id}", unit.kind());
        self.modules.push(Module { id, position, unit });
        id
    }

    /// Removes a module and every patch touching it.
    ///
    /// Returns the removed unit, or `None` if the id is unknown.
    pub fn remove_module(&mut self, id: ModuleId) -> Option<U> {
        let ix = self.index_of(id)?;
        let module = self.modules.remove(ix);
        let before = self.patches.len();
        self.patches.retain(|p| !p.involves(id));
        tracing::debug!(
            "graph_remove: module {id}, {} patches dropped",
            before - self.patches.len()
        );
        Some(module.unit)
    }

    /// Sets a dial on a module (clamped to the dial's range).
    ///
    /// Returns false if the module or the dial does not exist.
    pub fn set_parameter(&mut self, id: ModuleId, dial: &str, value: f64) -> bool {
        match self.module_mut(id) {
            Some(module) => module.unit.set_dial(dial, value),
            None => false,
        }
    }

    // ========================================================================
    // Patching
    // ========================================================================

    /// Toggles the patch between two sockets.
    ///
    /// The sockets may be given in either order. If a patch already joins
    /// them it is removed, otherwise a new one is added. On error the graph
    /// is left unchanged; a type mismatch is also reported as a warning.
    pub fn connect(
        &mut self,
        a: ModuleId,
        b: ModuleId,
        socket_a: &str,
        socket_b: &str,
    ) -> Result<PatchChange, ConnectionError> {
        let candidate = match self.candidate(a, b, socket_a, socket_b) {
            Ok(patch) => patch,
            Err(err) => {
                match &err {
                    ConnectionError::IncompatibleTypes { .. } => {
                        tracing::warn!("graph_connect: {a}.{socket_a} ↔ {b}.{socket_b}: {err}")
                    }
                    _ => tracing::debug!("graph_connect: ignored, {err}"),
                }
                return Err(err);
            }
        };

        match self.patches.iter().position(|p| p.is_isomorphic(&candidate)) {
            Some(ix) => {
                self.patches.remove(ix);
                tracing::debug!("graph_disconnect: {candidate}");
                Ok(PatchChange::Disconnected)
            }
            None => {
                self.patches.push(candidate);
                tracing::debug!("graph_connect: {candidate}");
                Ok(PatchChange::Connected)
            }
        }
    }

    /// Builds the normalized patch `connect` would toggle.
    fn candidate(
        &self,
        a: ModuleId,
        b: ModuleId,
        socket_a: &str,
        socket_b: &str,
    ) -> Result<Patch, ConnectionError> {
        let unit_a = self.unit(a).ok_or(ConnectionError::ModuleNotFound(a))?;
        let unit_b = self.unit(b).ok_or(ConnectionError::ModuleNotFound(b))?;

        if a == b && socket_a == socket_b {
            return Err(ConnectionError::SelfConnection);
        }

        let port_a = unit_a.port(socket_a).ok_or_else(|| ConnectionError::UnknownSocket {
            module: a,
            socket: socket_a.to_string(),
        })?;
        let port_b = unit_b.port(socket_b).ok_or_else(|| ConnectionError::UnknownSocket {
            module: b,
            socket: socket_b.to_string(),
        })?;

        validate_connection(port_a.signal_type, port_b.signal_type)?;

        if port_a.direction == port_b.direction {
            return Err(ConnectionError::DirectionMismatch {
                direction: port_a.direction,
            });
        }

        let end_a = Endpoint::new(a, port_a.name);
        let end_b = Endpoint::new(b, port_b.name);
        let (from, to) = if port_a.is_output() {
            (end_a, end_b)
        } else {
            (end_b, end_a)
        };
        Ok(Patch::new(from, to, port_a.signal_type))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns every patch touching `socket` on `module`.
    pub fn patches_into<'a>(
        &'a self,
        module: ModuleId,
        socket: &'a str,
    ) -> impl Iterator<Item = &'a Patch> + 'a {
        self.patches.iter().filter(move |p| p.touches(module, socket))
    }

    /// Returns true if at least one patch touches `socket` on `module`.
    pub fn is_connected(&self, module: ModuleId, socket: &str) -> bool {
        self.patches_into(module, socket).next().is_some()
    }

    /// Returns true if some patch joins the two sockets, in either order.
    pub fn has_patch(&self, a: ModuleId, socket_a: &str, b: ModuleId, socket_b: &str) -> bool {
        self.patches.iter().any(|p| {
            (p.from.is(a, socket_a) && p.to.is(b, socket_b))
                || (p.from.is(b, socket_b) && p.to.is(a, socket_a))
        })
    }
}

impl<U: Unit> Default for Patchable<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::SignalType;
    use crate::modules::{
        ChannelOutput, Filter, FilterMode, Generator, InstrumentUnit, Transpose, Waveform,
    };

    fn sine() -> InstrumentUnit {
        InstrumentUnit::Generator(Generator::new(Waveform::Sine))
    }

    fn output() -> InstrumentUnit {
        InstrumentUnit::Output(ChannelOutput)
    }

    #[test]
    fn test_add_module_ids_increase() {
        let mut graph = Patchable::new();
        let a = graph.add_module(sine());
        let b = graph.add_module(output());
        assert!(a < b);
        assert_eq!(graph.module_count(), 2);
        assert_eq!(graph.find_kind("output"), Some(b));
        assert_eq!(graph.find_kind("square"), None);
    }

    #[test]
    fn test_connect_then_toggle_off() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let out = graph.add_module(output());

        assert_eq!(graph.connect(osc, out, "OUT", "IN"), Ok(PatchChange::Connected));
        assert_eq!(graph.patch_count(), 1);
        assert_eq!(graph.connect(osc, out, "OUT", "IN"), Ok(PatchChange::Disconnected));
        assert_eq!(graph.patch_count(), 0);
    }

    #[test]
    fn test_reversed_request_is_same_patch() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let out = graph.add_module(output());

        graph.connect(osc, out, "OUT", "IN").unwrap();
        assert_eq!(graph.connect(out, osc, "IN", "OUT"), Ok(PatchChange::Disconnected));
        assert_eq!(graph.patch_count(), 0);
    }

    #[test]
    fn test_patch_normalized_to_output_first() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let out = graph.add_module(output());

        graph.connect(out, osc, "IN", "OUT").unwrap();
        let patch = graph.patches()[0];
        assert_eq!(patch.from, Endpoint::new(osc, "OUT"));
        assert_eq!(patch.to, Endpoint::new(out, "IN"));
        assert_eq!(patch.signal_type, SignalType::Audio);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let transpose = graph.add_module(InstrumentUnit::Transpose(Transpose::new()));

        let result = graph.connect(osc, transpose, "OUT", "FREQ IN");
        assert_eq!(
            result,
            Err(ConnectionError::IncompatibleTypes {
                from_type: SignalType::Audio,
                to_type: SignalType::Frequency,
            })
        );
        assert_eq!(graph.patch_count(), 0);
    }

    #[test]
    fn test_missing_module_is_noop() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let ghost = ModuleId(99);

        assert_eq!(
            graph.connect(osc, ghost, "OUT", "IN"),
            Err(ConnectionError::ModuleNotFound(ghost))
        );
        assert_eq!(graph.patch_count(), 0);
    }

    #[test]
    fn test_self_connection_rejected() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        assert_eq!(
            graph.connect(osc, osc, "OUT", "OUT"),
            Err(ConnectionError::SelfConnection)
        );
    }

    #[test]
    fn test_unknown_socket_rejected() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let out = graph.add_module(output());
        assert!(matches!(
            graph.connect(osc, out, "OUT", "SIDECHAIN"),
            Err(ConnectionError::UnknownSocket { .. })
        ));
    }

    #[test]
    fn test_two_inputs_rejected() {
        let mut graph = Patchable::new();
        let lpf = graph.add_module(InstrumentUnit::Filter(Filter::new(FilterMode::LowPass)));
        let out = graph.add_module(output());
        assert!(matches!(
            graph.connect(lpf, out, "IN", "IN"),
            Err(ConnectionError::DirectionMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_module_drops_patches() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        let lpf = graph.add_module(InstrumentUnit::Filter(Filter::new(FilterMode::LowPass)));
        let out = graph.add_module(output());
        graph.connect(osc, lpf, "OUT", "IN").unwrap();
        graph.connect(lpf, out, "OUT", "IN").unwrap();

        assert!(graph.remove_module(lpf).is_some());
        assert_eq!(graph.patch_count(), 0);
        assert!(graph.module(lpf).is_none());
        assert!(graph.module(out).is_some());

        // Ids are not reused after removal
        let again = graph.add_module(sine());
        assert_ne!(again, lpf);
        assert_eq!(graph.connect(lpf, out, "OUT", "IN"), Err(ConnectionError::ModuleNotFound(lpf)));
    }

    #[test]
    fn test_patch_queries() {
        let mut graph = Patchable::new();
        let a = graph.add_module(sine());
        let b = graph.add_module(sine());
        let out = graph.add_module(output());
        graph.connect(a, out, "OUT", "IN").unwrap();
        graph.connect(b, out, "OUT", "IN").unwrap();

        assert_eq!(graph.patches_into(out, "IN").count(), 2);
        assert!(graph.is_connected(a, "OUT"));
        assert!(!graph.is_connected(a, "FREQ"));
        assert!(graph.has_patch(out, "IN", b, "OUT"));
    }

    #[test]
    fn test_set_parameter() {
        let mut graph = Patchable::new();
        let osc = graph.add_module(sine());
        assert!(graph.set_parameter(osc, "gain", 10.0));
        assert_eq!(graph.unit(osc).and_then(|u| u.dial("gain")), Some(4.0));
        assert!(!graph.set_parameter(osc, "cutoff", 1.0));
        assert!(!graph.set_parameter(ModuleId(42), "gain", 1.0));
    }
}
