//! Patch cables between module sockets.

use std::fmt;

use super::patchable::ModuleId;
use crate::dsp::SignalType;

/// One end of a patch: a socket on a specific module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub module: ModuleId,
    pub socket: &'static str,
}

impl Endpoint {
    pub fn new(module: ModuleId, socket: &'static str) -> Self {
        Self { module, socket }
    }

    /// Returns true if this endpoint is `socket` on `module`.
    pub fn is(&self, module: ModuleId, socket: &str) -> bool {
        self.module == module && self.socket == socket
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.socket)
    }
}

/// A typed cable between two sockets.
///
/// `from` is always the output-side socket and `to` the input side, no matter
/// which end the user started dragging from. Both ends carry `signal_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Patch {
    pub from: Endpoint,
    pub to: Endpoint,
    pub signal_type: SignalType,
}

impl Patch {
    pub fn new(from: Endpoint, to: Endpoint, signal_type: SignalType) -> Self {
        Self {
            from,
            to,
            signal_type,
        }
    }

    /// Returns true if both patches join the same two sockets, in either
    /// orientation.
    pub fn is_isomorphic(&self, other: &Patch) -> bool {
        (self.from == other.from && self.to == other.to)
            || (self.from == other.to && self.to == other.from)
    }

    /// Returns true if one end of this patch is `socket` on `module`.
    pub fn touches(&self, module: ModuleId, socket: &str) -> bool {
        self.from.is(module, socket) || self.to.is(module, socket)
    }

    /// Returns true if either end sits on `module`.
    pub fn involves(&self, module: ModuleId) -> bool {
        self.from.module == module || self.to.module == module
    }

    /// Returns the far end, seen from `socket` on `module`.
    ///
    /// Returns `None` when the patch does not touch that socket.
    pub fn opposite(&self, module: ModuleId, socket: &str) -> Option<Endpoint> {
        if self.from.is(module, socket) {
            Some(self.to)
        } else if self.to.is(module, socket) {
            Some(self.from)
        } else {
            None
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} ({})", self.from, self.to, self.signal_type)
    }
}
