//! Modules module
//!
//! Built-in units for both graph flavours.
//! Instruments hold generators, filters and frequency transforms; sequences
//! hold pulses, integer ranges and note triggers.

pub mod boundary;
pub mod derived;
pub mod filter;
pub mod generator;
pub mod instrument;
pub mod play_note;
pub mod pulse;
pub mod range;
pub mod sequence;
pub mod wav;

// Re-export commonly used types
pub use boundary::{ChannelInput, ChannelOutput, ClockInput};
pub use derived::{Panning, Transpose};
pub use filter::{Filter, FilterMode};
pub use generator::{Generator, Waveform};
pub use instrument::InstrumentUnit;
pub use play_note::PlayNote;
pub use pulse::Pulse;
pub use range::{Range, RangeKind};
pub use sequence::{SequenceContext, SequenceUnit};
pub use wav::WavGenerator;
