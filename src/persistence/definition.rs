//! Instrument definition loader.
//!
//! The engine describes instruments as nested documents, the same shape the
//! instrument compiler produces. Loading expands such a document back into
//! modules and patches:
//!
//! ```text
//! {"filter": {"lpf": {"cutoff": 2000}, "sine": {"gain": 1}}}
//!
//! input.FREQ ──> sine.FREQ
//!                sine.OUT ──> low pass filter.IN
//!                             low pass filter.OUT ──> output.IN
//! ```
//!
//! The round trip is approximate: panning modules are recreated but do not
//! appear in the compiled document, and vocoders are dropped.

use serde_json::Value;

use super::error::DefinitionError;
use crate::dsp::Unit;
use crate::engine::Instrument;
use crate::graph::ModuleId;
use crate::modules::{
    ChannelInput, ChannelOutput, Filter, FilterMode, Generator, InstrumentUnit, Panning,
    Transpose, WavGenerator, Waveform,
};

/// Generator keys, in the order they are checked.
const GENERATOR_KEYS: &[&str] = &[
    "sine",
    "triangle",
    "square",
    "sawtooth",
    "saw",
    "white_noise",
    "pulse",
];

/// Filter keys, in the order they are checked.
const FILTER_KEYS: &[&str] = &[
    "lpf",
    "hpf",
    "delay",
    "distortion",
    "overdrive",
    "flanger",
    "average",
];

/// Expands an instrument definition document into an instrument graph.
///
/// # Errors
///
/// Returns [`DefinitionError::UnknownDefinition`] or
/// [`DefinitionError::UnknownFilter`] naming the part of the document that
/// could not be understood.
pub fn load_instrument(definition: &Value) -> Result<Instrument, DefinitionError> {
    let mut instrument = Instrument::new();
    let input = instrument
        .graph
        .find_kind(ChannelInput::KIND)
        .ok_or_else(|| DefinitionError::UnknownKind(ChannelInput::KIND.to_string()))?;
    let output = instrument
        .graph
        .find_kind(ChannelOutput::KIND)
        .ok_or_else(|| DefinitionError::UnknownKind(ChannelOutput::KIND.to_string()))?;

    instrument.name = definition
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    instrument.bank_index = definition
        .get("index")
        .and_then(Value::as_u64)
        .and_then(|index| u32::try_from(index).ok());

    let mut loader = Loader {
        instrument: &mut instrument,
    };
    loader.expand(definition, input, output)?;
    loader.patch_unpitched(input)?;

    tracing::debug!(
        "load_instrument: {} modules, {} patches",
        instrument.graph.module_count(),
        instrument.graph.patch_count()
    );
    Ok(instrument)
}

/// Returns a field unless it is missing or null.
fn field<'a>(definition: &'a Value, key: &str) -> Option<&'a Value> {
    definition.get(key).filter(|value| !value.is_null())
}

/// Reads a numeric field.
fn number_field(definition: &Value, key: &str) -> Option<f64> {
    definition.get(key).and_then(Value::as_f64)
}

struct Loader<'a> {
    instrument: &'a mut Instrument,
}

impl Loader<'_> {
    fn add(&mut self, unit: InstrumentUnit) -> ModuleId {
        self.instrument.graph.add_module(unit)
    }

    fn patch(
        &mut self,
        from: ModuleId,
        from_socket: &str,
        to: ModuleId,
        to_socket: &str,
    ) -> Result<(), DefinitionError> {
        self.instrument
            .graph
            .connect(from, to, from_socket, to_socket)
            .map(|_| ())
            .map_err(|source| DefinitionError::InvalidConnection {
                from: format!("{from}.{from_socket}"),
                to: format!("{to}.{to_socket}"),
                source,
            })
    }

    /// Expands one definition whose audio feeds `consumer` and whose pitch
    /// derives from `frequency`. Returns the generators created.
    fn expand(
        &mut self,
        definition: &Value,
        frequency: ModuleId,
        consumer: ModuleId,
    ) -> Result<Vec<ModuleId>, DefinitionError> {
        if let Some(children) = field(definition, "combined") {
            let children = children
                .as_array()
                .ok_or_else(|| DefinitionError::UnknownDefinition(children.to_string()))?;
            let mut generators = Vec::new();
            for child in children {
                generators.extend(self.expand(child, frequency, consumer)?);
            }
            return Ok(generators);
        }

        if let Some(body) = field(definition, "panning") {
            let panning = self.add(InstrumentUnit::Panning(Panning::new()));
            let generators = self.expand(body, frequency, consumer)?;
            for &generator in &generators {
                self.patch(panning, "PAN", generator, "PAN")?;
            }
            self.patch(frequency, "FREQ", panning, "FREQ")?;
            return Ok(generators);
        }

        if let Some(body) = field(definition, "transpose") {
            let mut transpose = Transpose::new();
            transpose
                .dials_mut()
                .set("semitones", number_field(body, "semitones").unwrap_or(0.0));
            let transpose = self.add(InstrumentUnit::Transpose(transpose));
            let generators = self.expand(body, transpose, consumer)?;
            for &generator in &generators {
                // An inner transpose already drives this generator.
                if !self.instrument.graph.is_connected(generator, "FREQ") {
                    self.patch(transpose, "FREQ", generator, "FREQ")?;
                }
            }
            self.patch(frequency, "FREQ", transpose, "FREQ IN")?;
            return Ok(generators);
        }

        if let Some(unit) = generator_from_definition(definition) {
            let generator = self.add(unit);
            self.patch(generator, "OUT", consumer, "IN")?;
            return Ok(vec![generator]);
        }

        if field(definition, "vocoder").is_some() {
            tracing::warn!("load_instrument: vocoder definitions are not supported, skipping");
            return Ok(Vec::new());
        }

        if let Some(body) = field(definition, "filter") {
            let filter = self.add(InstrumentUnit::Filter(filter_from_definition(body)?));
            let generators = self.expand(body, frequency, filter)?;
            self.patch(filter, "OUT", consumer, "IN")?;
            return Ok(generators);
        }

        Err(DefinitionError::UnknownDefinition(definition.to_string()))
    }

    /// Lets every generator without a pitch source follow the played note.
    fn patch_unpitched(&mut self, input: ModuleId) -> Result<(), DefinitionError> {
        let unpitched: Vec<ModuleId> = self
            .instrument
            .graph
            .modules()
            .iter()
            .filter(|m| m.unit.is_generator())
            .map(|m| m.id())
            .filter(|&id| !self.instrument.graph.is_connected(id, "FREQ"))
            .collect();
        for generator in unpitched {
            self.patch(input, "FREQ", generator, "FREQ")?;
        }
        Ok(())
    }
}

/// Builds a generator unit from a definition such as `{"sine": {..}}`.
///
/// Returns `None` when the definition holds no generator key.
pub fn generator_from_definition(definition: &Value) -> Option<InstrumentUnit> {
    if let Some(body) = field(definition, "wav") {
        let mut wav = WavGenerator::new();
        wav.file = body
            .get("file")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        wav.pitched = body.get("pitched").and_then(Value::as_bool).unwrap_or(false);
        wav.base_pitch = number_field(body, "base_pitch").unwrap_or(440.0);
        apply_envelope(wav.dials_mut(), body);
        return Some(InstrumentUnit::Wav(wav));
    }

    let (key, body) = GENERATOR_KEYS
        .iter()
        .find_map(|&key| field(definition, key).map(|body| (key, body)))?;
    let waveform = Waveform::from_document_key(key)?;
    let mut generator = Generator::new(waveform);
    apply_envelope(generator.dials_mut(), body);
    for id in ["pitch", "panning"] {
        if let Some(value) = number_field(body, id) {
            generator.dials_mut().set(id, value);
        }
    }
    Some(InstrumentUnit::Generator(generator))
}

/// Reads gain and the envelope. Missing envelope stages are zero.
fn apply_envelope(dials: &mut crate::dsp::Dials, body: &Value) {
    dials.set("gain", number_field(body, "gain").unwrap_or(1.0));
    for id in ["attack", "decay", "sustain", "release"] {
        dials.set(id, number_field(body, id).unwrap_or(0.0));
    }
}

/// Builds a filter unit from the body of a `filter` definition.
pub fn filter_from_definition(body: &Value) -> Result<Filter, DefinitionError> {
    let (key, params) = FILTER_KEYS
        .iter()
        .find_map(|&key| field(body, key).map(|params| (key, params)))
        .ok_or_else(|| DefinitionError::UnknownFilter(body.to_string()))?;
    let mode = FilterMode::from_key(key).ok_or_else(|| DefinitionError::UnknownFilter(key.to_string()))?;

    let mut filter = Filter::new(mode);
    let ids: Vec<&'static str> = filter.dials().as_slice().iter().map(|d| d.id).collect();
    for id in ids {
        if let Some(value) = number_field(params, id) {
            filter.dials_mut().set(id, value);
        }
    }
    Ok(filter)
}
