//! Sequence graphs and their multi-sink compiler.

use super::reducer::Reduction;
use crate::dsp::{Document, Emission};
use crate::graph::{ModuleId, Patchable};
use crate::modules::{ClockInput, SequenceContext, SequenceUnit};

/// Channel used when a sequence does not name one.
pub const DEFAULT_CHANNEL: u8 = 1;

/// A trigger graph playing notes on one channel.
#[derive(Clone, Debug)]
pub struct Sequence {
    pub channel: u8,
    pub graph: Patchable<SequenceUnit>,
}

impl Sequence {
    /// Creates a sequence holding just its clock `input`.
    pub fn new(channel: u8) -> Self {
        let mut graph = Patchable::new();
        graph.add_module_at(SequenceUnit::Input(ClockInput), [10.0, 40.0]);
        Self { channel, graph }
    }

    /// Creates a sequence around an existing graph.
    pub fn from_graph(channel: u8, graph: Patchable<SequenceUnit>) -> Self {
        Self { channel, graph }
    }

    /// Reduces the graph into a flat list of note documents.
    ///
    /// Every `play_note` module is a sink; their documents are concatenated
    /// in compile order. A graph without notes compiles to an empty list.
    pub fn compile(&self) -> Vec<Document> {
        let sinks: Vec<ModuleId> = self
            .graph
            .modules()
            .iter()
            .filter(|m| m.unit.is_sink())
            .map(|m| m.id())
            .collect();
        if sinks.is_empty() {
            return Vec::new();
        }

        let context = SequenceContext {
            channel: self.channel,
        };
        Reduction::run(&self.graph, &sinks, &context)
            .into_steps()
            .into_iter()
            .flat_map(|(_, emission)| match emission {
                Emission::Events(events) => events,
                _ => Vec::new(),
            })
            .collect()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }
}
