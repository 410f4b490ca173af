//! Persistence module
//!
//! Everything that turns documents and files into graphs: the instrument
//! definition loader, graph file save/load, and session assembly.

pub mod definition;
pub mod error;
pub mod patch;
pub mod session;

pub use definition::{filter_from_definition, generator_from_definition, load_instrument};
pub use error::DefinitionError;
pub use patch::{
    load_from_file, save_to_file, ConnectionData, GraphFile, GraphKind, NodeData, SampleData,
    FILE_VERSION,
};
pub use session::{Channel, ChannelSettings, Session, PERCUSSION_CHANNEL};
