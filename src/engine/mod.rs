//! Engine module
//!
//! The graph compilers. Both walk a patch graph backwards from its sinks,
//! compile every module they reach in dependency order, and collect the
//! documents the external engine consumes.

pub mod instrument;
pub mod reducer;
pub mod schedule;
pub mod sequence;

pub use instrument::Instrument;
pub use reducer::Reduction;
pub use schedule::Schedule;
pub use sequence::{Sequence, DEFAULT_CHANNEL};
