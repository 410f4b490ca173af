//! Unit contract
//!
//! Core traits and types shared by every unit: signal types, sockets,
//! dials, compile emissions, and the kind registry.

pub mod emission;
pub mod module_trait;
pub mod parameter;
pub mod port;
pub mod registry;
pub mod signal;

pub use emission::{number, Connections, Document, Emission, Transform};
pub use module_trait::Unit;
pub use parameter::{Dial, Dials};
pub use port::{PortDefinition, PortDirection};
pub use registry::{UnitFactory, UnitRegistry};
pub use signal::SignalType;
