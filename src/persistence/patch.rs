//! Graph file serialization for save/load functionality.
//!
//! A graph file captures one instrument or sequence graph exactly as the
//! editor holds it: every node with its position and dial values, and every
//! patch between node sockets. Unlike instrument definitions, nothing is lost
//! on a round trip.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DefinitionError;
use crate::dsp::{Unit, UnitRegistry};
use crate::engine::{Instrument, Sequence, DEFAULT_CHANNEL};
use crate::graph::Patchable;
use crate::modules::{InstrumentUnit, SequenceUnit};

/// Current graph file format version.
/// Increment this when making breaking changes to the format.
pub const FILE_VERSION: u32 = 1;

/// Which compiler a graph is meant for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    Instrument,
    Sequence,
}

impl GraphKind {
    pub fn name(&self) -> &'static str {
        match self {
            GraphKind::Instrument => "instrument",
            GraphKind::Sequence => "sequence",
        }
    }
}

/// A saved graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    /// Human-readable name for the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Format version for future compatibility.
    pub version: u32,
    pub kind: GraphKind,
    /// Instrument bank slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_index: Option<u32>,
    /// Sequence channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    /// All nodes, in graph order. Connections refer to them by position.
    pub nodes: Vec<NodeData>,
    pub connections: Vec<ConnectionData>,
}

/// Serialized data for a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Unit kind (e.g. "sine", "low pass filter", "play_note").
    pub kind: String,
    /// Node position in the editor (x, y).
    #[serde(default)]
    pub position: [f32; 2],
    /// Dial values by dial name.
    #[serde(default)]
    pub dials: BTreeMap<String, f64>,
    /// Sample attributes, for `wav` nodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleData>,
}

/// Attributes of a sample file generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    pub file: String,
    #[serde(default)]
    pub pitched: bool,
    #[serde(default = "default_base_pitch")]
    pub base_pitch: f64,
}

fn default_base_pitch() -> f64 {
    440.0
}

/// Serialized data for a patch between two node sockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub from_node: usize,
    pub from_socket: String,
    pub to_node: usize,
    pub to_socket: String,
}

impl GraphFile {
    /// Captures an instrument graph.
    pub fn from_instrument(instrument: &Instrument) -> Self {
        let (nodes, connections) = to_parts(&instrument.graph, |unit, node| {
            if let InstrumentUnit::Wav(wav) = unit {
                node.sample = Some(SampleData {
                    file: wav.file.clone(),
                    pitched: wav.pitched,
                    base_pitch: wav.base_pitch,
                });
            }
        });
        Self {
            name: instrument.name.clone(),
            version: FILE_VERSION,
            kind: GraphKind::Instrument,
            bank_index: instrument.bank_index,
            channel: None,
            nodes,
            connections,
        }
    }

    /// Captures a sequence graph.
    pub fn from_sequence(name: impl Into<String>, sequence: &Sequence) -> Self {
        let (nodes, connections) = to_parts(&sequence.graph, |_, _| {});
        Self {
            name: Some(name.into()),
            version: FILE_VERSION,
            kind: GraphKind::Sequence,
            bank_index: None,
            channel: Some(sequence.channel),
            nodes,
            connections,
        }
    }

    /// Check if this file version is compatible with the current format.
    pub fn is_compatible(&self) -> bool {
        self.version <= FILE_VERSION
    }

    /// Rebuilds the instrument this file describes.
    pub fn into_instrument(&self) -> Result<Instrument, DefinitionError> {
        self.expect_kind(GraphKind::Instrument)?;
        let graph = from_parts(
            &InstrumentUnit::registry(),
            &self.nodes,
            &self.connections,
            |unit, node| {
                if let (InstrumentUnit::Wav(wav), Some(sample)) = (unit, &node.sample) {
                    wav.file = sample.file.clone();
                    wav.pitched = sample.pitched;
                    wav.base_pitch = sample.base_pitch;
                }
            },
        )?;
        let mut instrument = Instrument::from_graph(graph);
        instrument.name = self.name.clone();
        instrument.bank_index = self.bank_index;
        Ok(instrument)
    }

    /// Rebuilds the sequence this file describes.
    pub fn into_sequence(&self) -> Result<Sequence, DefinitionError> {
        self.expect_kind(GraphKind::Sequence)?;
        let graph = from_parts(
            &SequenceUnit::registry(),
            &self.nodes,
            &self.connections,
            |_, _| {},
        )?;
        Ok(Sequence::from_graph(
            self.channel.unwrap_or(DEFAULT_CHANNEL),
            graph,
        ))
    }

    fn expect_kind(&self, expected: GraphKind) -> Result<(), DefinitionError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(DefinitionError::GraphKindMismatch {
                expected: expected.name(),
                found: self.kind.name(),
            })
        }
    }
}

/// Flattens a graph into nodes and index-based connections.
fn to_parts<U: Unit>(
    graph: &Patchable<U>,
    mut extra: impl FnMut(&U, &mut NodeData),
) -> (Vec<NodeData>, Vec<ConnectionData>) {
    let nodes = graph
        .modules()
        .iter()
        .map(|module| {
            let mut node = NodeData {
                kind: module.unit.kind().to_string(),
                position: module.position,
                dials: module
                    .unit
                    .dials()
                    .iter()
                    .map(|d| (d.id.to_string(), d.value))
                    .collect(),
                sample: None,
            };
            extra(&module.unit, &mut node);
            node
        })
        .collect();

    let connections = graph
        .patches()
        .iter()
        .filter_map(|patch| {
            Some(ConnectionData {
                from_node: graph.index_of(patch.from.module)?,
                from_socket: patch.from.socket.to_string(),
                to_node: graph.index_of(patch.to.module)?,
                to_socket: patch.to.socket.to_string(),
            })
        })
        .collect();

    (nodes, connections)
}

/// Rebuilds a graph from nodes and index-based connections.
fn from_parts<U: Unit>(
    registry: &UnitRegistry<U>,
    nodes: &[NodeData],
    connections: &[ConnectionData],
    mut extra: impl FnMut(&mut U, &NodeData),
) -> Result<Patchable<U>, DefinitionError> {
    let mut graph = Patchable::new();
    let mut ids = Vec::with_capacity(nodes.len());

    for node in nodes {
        let mut unit = registry
            .create(&node.kind)
            .ok_or_else(|| DefinitionError::UnknownKind(node.kind.clone()))?;
        for (id, value) in &node.dials {
            if !unit.set_dial(id, *value) {
                tracing::warn!("load: {} has no dial '{id}', ignoring", node.kind);
            }
        }
        extra(&mut unit, node);
        ids.push(graph.add_module_at(unit, node.position));
    }

    for conn in connections {
        let from = *ids
            .get(conn.from_node)
            .ok_or(DefinitionError::MissingModule(conn.from_node))?;
        let to = *ids
            .get(conn.to_node)
            .ok_or(DefinitionError::MissingModule(conn.to_node))?;
        let endpoints = || {
            (
                format!("{}.{}", conn.from_node, conn.from_socket),
                format!("{}.{}", conn.to_node, conn.to_socket),
            )
        };
        // connect() toggles, so a repeated entry would silently unpatch.
        if graph.has_patch(from, &conn.from_socket, to, &conn.to_socket) {
            let (from, to) = endpoints();
            return Err(DefinitionError::DuplicateConnection { from, to });
        }
        graph
            .connect(from, to, &conn.from_socket, &conn.to_socket)
            .map_err(|source| {
                let (from, to) = endpoints();
                DefinitionError::InvalidConnection { from, to, source }
            })?;
    }

    Ok(graph)
}

/// Save a graph file as JSON.
pub fn save_to_file(file: &GraphFile, path: &Path) -> Result<(), DefinitionError> {
    let json = serde_json::to_string_pretty(file)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a graph file from JSON.
pub fn load_from_file(path: &Path) -> Result<GraphFile, DefinitionError> {
    let json = std::fs::read_to_string(path)?;
    let file: GraphFile = serde_json::from_str(&json)?;

    // Version check
    if !file.is_compatible() {
        return Err(DefinitionError::IncompatibleVersion {
            found: file.version,
            expected: FILE_VERSION,
        });
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        Filter, FilterMode, Generator, PlayNote, Pulse, WavGenerator, Waveform,
    };
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_instrument() -> Instrument {
        let mut instrument = Instrument::new();
        instrument.name = Some("pad".to_string());
        let input = instrument.graph.find_kind("input").unwrap();
        let out = instrument.graph.find_kind("output").unwrap();
        let osc = instrument
            .graph
            .add_module_at(InstrumentUnit::Generator(Generator::new(Waveform::Triangle)), [120.0, 80.0]);
        let lpf = instrument
            .graph
            .add_module(InstrumentUnit::Filter(Filter::new(FilterMode::LowPass)));
        instrument.graph.set_parameter(lpf, "cutoff", 1200.0);
        instrument.graph.connect(input, osc, "FREQ", "FREQ").unwrap();
        instrument.graph.connect(osc, lpf, "OUT", "IN").unwrap();
        instrument.graph.connect(lpf, out, "OUT", "IN").unwrap();
        instrument
    }

    #[test]
    fn test_instrument_file_contents() {
        let file = GraphFile::from_instrument(&sample_instrument());
        assert_eq!(file.name.as_deref(), Some("pad"));
        assert_eq!(file.version, FILE_VERSION);
        assert_eq!(file.kind, GraphKind::Instrument);
        assert_eq!(file.nodes.len(), 4);
        assert_eq!(file.nodes[2].kind, "triangle");
        assert_eq!(file.nodes[2].position, [120.0, 80.0]);
        assert_eq!(file.nodes[3].dials.get("cutoff"), Some(&1200.0));
        assert_eq!(file.connections.len(), 3);
        assert_eq!(file.connections[1].from_node, 2);
        assert_eq!(file.connections[1].to_node, 3);
    }

    #[test]
    fn test_instrument_rebuild_compiles_identically() {
        let instrument = sample_instrument();
        let rebuilt = GraphFile::from_instrument(&instrument).into_instrument().unwrap();
        assert_eq!(rebuilt.compile(), instrument.compile());
        assert_eq!(rebuilt.graph.patch_count(), 3);
    }

    #[test]
    fn test_wav_attributes_survive() {
        let mut instrument = Instrument::new();
        let out = instrument.graph.find_kind("output").unwrap();
        let mut wav = WavGenerator::new();
        wav.file = "hat.wav".to_string();
        wav.pitched = true;
        let id = instrument.graph.add_module(InstrumentUnit::Wav(wav));
        instrument.graph.connect(id, out, "OUT", "IN").unwrap();

        let file = GraphFile::from_instrument(&instrument);
        let rebuilt = file.into_instrument().unwrap();
        let doc = rebuilt.compile().unwrap();
        assert_eq!(doc["wav"]["file"], json!("hat.wav"));
        assert_eq!(doc["wav"]["pitched"], json!(true));
    }

    #[test]
    fn test_sequence_round_trip() {
        let mut sequence = Sequence::new(5);
        let clock = sequence.graph.find_kind("input").unwrap();
        let pulse = sequence.graph.add_module(SequenceUnit::Pulse(Pulse::every(3.0)));
        let note = sequence.graph.add_module(SequenceUnit::PlayNote(PlayNote::new()));
        sequence.graph.connect(clock, pulse, "CLOCK", "CLOCK").unwrap();
        sequence.graph.connect(pulse, note, "TRIG", "TRIG").unwrap();

        let file = GraphFile::from_sequence("groove", &sequence);
        assert_eq!(file.channel, Some(5));
        let rebuilt = file.into_sequence().unwrap();
        assert_eq!(rebuilt.channel, 5);
        assert_eq!(rebuilt.compile(), sequence.compile());
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let file = GraphFile::from_instrument(&sample_instrument());
        assert!(matches!(
            file.into_sequence(),
            Err(DefinitionError::GraphKindMismatch { expected: "sequence", found: "instrument" })
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut file = GraphFile::from_instrument(&sample_instrument());
        file.nodes[2].kind = "theremin".to_string();
        assert!(matches!(
            file.into_instrument(),
            Err(DefinitionError::UnknownKind(kind)) if kind == "theremin"
        ));
    }

    #[test]
    fn test_missing_node_rejected() {
        let mut file = GraphFile::from_instrument(&sample_instrument());
        file.connections[0].to_node = 17;
        assert!(matches!(
            file.into_instrument(),
            Err(DefinitionError::MissingModule(17))
        ));
    }

    #[test]
    fn test_mistyped_connection_rejected() {
        let mut file = GraphFile::from_instrument(&sample_instrument());
        file.connections[0].to_socket = "PAN".to_string();
        assert!(matches!(
            file.into_instrument(),
            Err(DefinitionError::InvalidConnection { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pad.json");
        let file = GraphFile::from_instrument(&sample_instrument());

        save_to_file(&file, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded, file);
    }

    #[test]
    fn test_unnamed_instrument_survives_save_and_load() {
        let mut instrument = Instrument::new();
        let out = instrument.graph.find_kind("output").unwrap();
        let osc = instrument
            .graph
            .add_module(InstrumentUnit::Generator(Generator::new(Waveform::Sine)));
        instrument.graph.connect(osc, out, "OUT", "IN").unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("unnamed.json");
        save_to_file(&GraphFile::from_instrument(&instrument), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("\"name\""));

        let rebuilt = load_from_file(&path).unwrap().into_instrument().unwrap();
        assert_eq!(rebuilt.name, None);
        assert_eq!(rebuilt.compile(), instrument.compile());
        assert!(rebuilt.compile().unwrap().get("name").is_none());
    }

    #[test]
    fn test_named_instrument_keeps_name() {
        let rebuilt = GraphFile::from_instrument(&sample_instrument())
            .into_instrument()
            .unwrap();
        assert_eq!(rebuilt.name.as_deref(), Some("pad"));
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let mut file = GraphFile::from_instrument(&sample_instrument());
        let repeated = file.connections[2].clone();
        file.connections.push(repeated);
        assert!(matches!(
            file.into_instrument(),
            Err(DefinitionError::DuplicateConnection { from, to })
                if from == "3.OUT" && to == "1.IN"
        ));
    }

    #[test]
    fn test_reversed_duplicate_connection_rejected() {
        let mut file = GraphFile::from_instrument(&sample_instrument());
        let first = file.connections[1].clone();
        file.connections.push(ConnectionData {
            from_node: first.to_node,
            from_socket: first.to_socket,
            to_node: first.from_node,
            to_socket: first.from_socket,
        });
        assert!(matches!(
            file.into_instrument(),
            Err(DefinitionError::DuplicateConnection { .. })
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.json");
        let mut file = GraphFile::from_instrument(&sample_instrument());
        file.version = FILE_VERSION + 1;
        save_to_file(&file, &path).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(DefinitionError::IncompatibleVersion { found, expected })
                if found == FILE_VERSION + 1 && expected == FILE_VERSION
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_from_file(&dir.path().join("nope.json")),
            Err(DefinitionError::Io(_))
        ));
    }
}
