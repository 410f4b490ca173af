//! Instrument graphs and their single-sink compiler.

use serde_json::Value;

use super::reducer::Reduction;
use crate::dsp::{Document, Emission};
use crate::graph::Patchable;
use crate::modules::{ChannelInput, ChannelOutput, InstrumentUnit};

/// An audio-synthesis graph feeding one channel.
#[derive(Clone, Debug)]
pub struct Instrument {
    /// Display name, added to the compiled document when set.
    pub name: Option<String>,
    /// Slot in the engine's instrument bank, added as `index` when set.
    pub bank_index: Option<u32>,
    pub graph: Patchable<InstrumentUnit>,
}

impl Instrument {
    /// Creates an instrument holding just its `input` and `output` modules.
    pub fn new() -> Self {
        let mut graph = Patchable::new();
        graph.add_module_at(InstrumentUnit::Input(ChannelInput), [10.0, 40.0]);
        graph.add_module_at(InstrumentUnit::Output(ChannelOutput), [700.0, 40.0]);
        Self {
            name: None,
            bank_index: None,
            graph,
        }
    }

    /// Creates an instrument around an existing graph.
    pub fn from_graph(graph: Patchable<InstrumentUnit>) -> Self {
        Self {
            name: None,
            bank_index: None,
            graph,
        }
    }

    /// Reduces the graph into one nested instrument document.
    ///
    /// Returns `None` when there is no `output` module or nothing is
    /// patched into it.
    pub fn compile(&self) -> Option<Document> {
        let Some(output) = self.graph.find_kind(ChannelOutput::KIND) else {
            tracing::debug!("compile: instrument has no output module");
            return None;
        };

        let reduction = Reduction::run(&self.graph, &[output], &());
        let mut document = reduction.get(output).and_then(Emission::as_document)?.clone();

        if let Value::Object(map) = &mut document {
            if let Some(name) = &self.name {
                map.insert("name".to_string(), Value::String(name.clone()));
            }
            if let Some(index) = self.bank_index {
                map.insert("index".to_string(), Value::from(index));
            }
        }
        Some(document)
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::Unit;
    use crate::graph::ModuleId;
    use crate::modules::{Filter, FilterMode, Generator, Transpose, Waveform};
    use serde_json::json;

    fn output_of(instrument: &Instrument) -> ModuleId {
        instrument.graph.find_kind("output").unwrap()
    }

    fn add_sine(instrument: &mut Instrument, pitch: f64) -> ModuleId {
        let id = instrument
            .graph
            .add_module(InstrumentUnit::Generator(Generator::new(Waveform::Sine)));
        instrument.graph.set_parameter(id, "pitch", pitch);
        id
    }

    #[test]
    fn test_new_instrument_has_boundaries() {
        let instrument = Instrument::new();
        let kinds: Vec<&str> = instrument.graph.modules().iter().map(|m| m.unit.kind()).collect();
        assert_eq!(kinds, vec!["input", "output"]);
        assert_eq!(instrument.compile(), None);
    }

    #[test]
    fn test_no_output_module() {
        let mut graph = Patchable::new();
        graph.add_module(InstrumentUnit::Generator(Generator::new(Waveform::Sine)));
        assert_eq!(Instrument::from_graph(graph).compile(), None);
    }

    #[test]
    fn test_single_generator() {
        let mut instrument = Instrument::new();
        let out = output_of(&instrument);
        let osc = add_sine(&mut instrument, 440.0);
        instrument.graph.connect(osc, out, "OUT", "IN").unwrap();

        assert_eq!(
            instrument.compile(),
            Some(json!({"sine": {
                "gain": 1, "panning": 0.5, "attack": 0.1, "decay": 0.1,
                "sustain": 0.8, "release": 0.1, "pitch": 440
            }}))
        );
    }

    #[test]
    fn test_generator_through_filter() {
        let mut instrument = Instrument::new();
        let out = output_of(&instrument);
        let osc = add_sine(&mut instrument, 440.0);
        let lpf = instrument
            .graph
            .add_module(InstrumentUnit::Filter(Filter::new(FilterMode::LowPass)));
        instrument.graph.set_parameter(lpf, "cutoff", 2000.0);
        instrument.graph.connect(osc, lpf, "OUT", "IN").unwrap();
        instrument.graph.connect(lpf, out, "OUT", "IN").unwrap();

        let doc = instrument.compile().unwrap();
        assert_eq!(doc["filter"]["lpf"], json!({"cutoff": 2000}));
        assert_eq!(doc["filter"]["sine"]["pitch"], json!(440));
        assert_eq!(doc["filter"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_fan_in_combined_in_discovery_order() {
        let mut instrument = Instrument::new();
        let out = output_of(&instrument);
        let first = add_sine(&mut instrument, 220.0);
        let second = add_sine(&mut instrument, 330.0);
        let lpf = instrument
            .graph
            .add_module(InstrumentUnit::Filter(Filter::new(FilterMode::LowPass)));
        instrument.graph.connect(first, lpf, "OUT", "IN").unwrap();
        instrument.graph.connect(second, lpf, "OUT", "IN").unwrap();
        instrument.graph.connect(lpf, out, "OUT", "IN").unwrap();

        let doc = instrument.compile().unwrap();
        let combined = doc["filter"]["combined"].as_array().unwrap();
        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0]["sine"]["pitch"], json!(220));
        assert_eq!(combined[1]["sine"]["pitch"], json!(330));
        assert!(doc["filter"].get("sine").is_none());
    }

    #[test]
    fn test_transposed_pitch() {
        let mut instrument = Instrument::new();
        let input = instrument.graph.find_kind("input").unwrap();
        let out = output_of(&instrument);
        let transpose = instrument.graph.add_module(InstrumentUnit::Transpose(Transpose::new()));
        instrument.graph.set_parameter(transpose, "semitones", 12.0);
        let osc = instrument
            .graph
            .add_module(InstrumentUnit::Generator(Generator::new(Waveform::Saw)));
        instrument.graph.connect(input, transpose, "FREQ", "FREQ IN").unwrap();
        instrument.graph.connect(transpose, osc, "FREQ", "FREQ").unwrap();
        instrument.graph.connect(osc, out, "OUT", "IN").unwrap();

        let doc = instrument.compile().unwrap();
        assert_eq!(doc["sawtooth"]["auto_pitch"], json!({"transpose": {"semitones": 12}}));
        assert!(doc["sawtooth"].get("pitch").is_none());
    }

    #[test]
    fn test_metadata_added() {
        let mut instrument = Instrument::new();
        instrument.name = Some("lead".to_string());
        instrument.bank_index = Some(0);
        let out = output_of(&instrument);
        let osc = add_sine(&mut instrument, 440.0);
        instrument.graph.connect(osc, out, "OUT", "IN").unwrap();

        let doc = instrument.compile().unwrap();
        assert_eq!(doc["name"], json!("lead"));
        assert_eq!(doc["index"], json!(0));
    }

    #[test]
    fn test_compile_leaves_graph_untouched() {
        let mut instrument = Instrument::new();
        let out = output_of(&instrument);
        let osc = add_sine(&mut instrument, 440.0);
        instrument.graph.connect(osc, out, "OUT", "IN").unwrap();

        let before = instrument.graph.patches().to_vec();
        let first = instrument.compile();
        assert_eq!(instrument.compile(), first);
        assert_eq!(instrument.graph.patches(), before.as_slice());
    }
}
