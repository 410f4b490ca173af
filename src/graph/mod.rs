//! Graph module
//!
//! The typed patch graph: modules, patches between their sockets, and the
//! toggle-aware connect operation that keeps the two consistent.

mod patch;
mod patchable;
mod validation;

pub use patch::{Endpoint, Patch};
pub use patchable::{Module, ModuleId, Patchable};
pub use validation::{validate_connection, ConnectionError, PatchChange};
