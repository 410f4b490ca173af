//! Session assembly: channels, their instruments and their sequences.
//!
//! The external engine hands over one settings record per channel. Each
//! record may carry a generator definition, which is expanded into an
//! editable instrument graph. Sequence definitions the engine already holds
//! are routed to the channel their notes play on and passed back out
//! unchanged. Compiling a session produces the sequencer definition the
//! engine expects back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::definition::load_instrument;
use super::error::DefinitionError;
use crate::dsp::{number, Document};
use crate::engine::{Instrument, Sequence};

/// The General MIDI percussion channel, always present in a session.
pub const PERCUSSION_CHANNEL: u8 = 9;

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_GRANULARITY: u32 = 64;

/// Sequence definition keys that act on a single channel.
const CHANNEL_KEYS: [&str; 6] = [
    "play_note",
    "play_notes",
    "volume",
    "lpf_cutoff",
    "hpf_cutoff",
    "panning",
];

/// Sequence definition keys that wrap an inner `sequence`.
const WRAPPER_KEYS: [&str; 5] = ["repeat", "after", "before", "euclidian", "offset"];

/// Mixer and routing settings of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    #[serde(default)]
    pub channel: u8,
    #[serde(default)]
    pub bank: Option<u32>,
    /// Bank slot of the channel's instrument.
    #[serde(default)]
    pub instrument: Option<u32>,
    #[serde(default)]
    pub reverb: f64,
    #[serde(default)]
    pub reverb_time: f64,
    #[serde(default)]
    pub reverb_feedback: f64,
    #[serde(default)]
    pub tremelo: f64,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_panning")]
    pub panning: f64,
    #[serde(default)]
    pub lpf_cutoff: f64,
    #[serde(default)]
    pub hpf_cutoff: f64,
    #[serde(default)]
    pub grain: Option<Value>,
    /// Instrument definition to load into the channel's graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<Value>,
}

fn default_volume() -> f64 {
    100.0
}

fn default_panning() -> f64 {
    64.0
}

impl ChannelSettings {
    /// Default settings for the given channel.
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            bank: None,
            instrument: None,
            reverb: 0.0,
            reverb_time: 0.0,
            reverb_feedback: 0.0,
            tremelo: 0.0,
            volume: default_volume(),
            panning: default_panning(),
            lpf_cutoff: 0.0,
            hpf_cutoff: 0.0,
            grain: None,
            generator: None,
        }
    }
}

/// One channel of a session.
#[derive(Debug, Clone)]
pub struct Channel {
    pub number: u8,
    pub settings: ChannelSettings,
    pub instrument: Option<Instrument>,
    pub sequences: Vec<Sequence>,
    /// Sequence definitions routed here, emitted as they are.
    pub definitions: Vec<Value>,
}

impl Channel {
    /// An empty channel with default settings and no instrument.
    pub fn new(number: u8) -> Self {
        Self {
            number,
            settings: ChannelSettings::new(number),
            instrument: None,
            sequences: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Builds a channel from its settings, loading the generator definition
    /// when one is given.
    pub fn from_settings(settings: ChannelSettings) -> Result<Self, DefinitionError> {
        let instrument = match &settings.generator {
            Some(def) => {
                tracing::debug!("session: loading generator for channel {}", settings.channel);
                load_instrument(def)?
            }
            None => Instrument::new(),
        };
        Ok(Self {
            number: settings.channel,
            settings,
            instrument: Some(instrument),
            sequences: Vec::new(),
            definitions: Vec::new(),
        })
    }

    /// Appends a new sequence graph playing on this channel.
    pub fn add_sequence(&mut self) -> &mut Sequence {
        self.sequences.push(Sequence::new(self.number));
        let last = self.sequences.len() - 1;
        &mut self.sequences[last]
    }

    /// Compiles the channel definition and its sequences. Routed definitions
    /// come first, followed by the compiled sequence graphs.
    pub fn compile(&self) -> Document {
        let s = &self.settings;
        let generator = self
            .instrument
            .as_ref()
            .and_then(Instrument::compile)
            .unwrap_or(Value::Null);

        let mut channel = Map::new();
        channel.insert("channel".into(), Value::from(self.number));
        channel.insert("generator".into(), generator);
        channel.insert("bank".into(), s.bank.map_or(Value::Null, Value::from));
        channel.insert(
            "instrument".into(),
            s.instrument.map_or(Value::Null, Value::from),
        );
        channel.insert("reverb".into(), number(s.reverb));
        channel.insert("reverb_time".into(), number(s.reverb_time));
        channel.insert("reverb_feedback".into(), number(s.reverb_feedback));
        channel.insert("tremelo".into(), number(s.tremelo));
        channel.insert("volume".into(), number(s.volume));
        channel.insert("panning".into(), number(s.panning));
        channel.insert("lpf_cutoff".into(), number(s.lpf_cutoff));
        channel.insert("hpf_cutoff".into(), number(s.hpf_cutoff));
        channel.insert("grain".into(), s.grain.clone().unwrap_or(Value::Null));

        let sequences: Vec<Document> = self
            .definitions
            .iter()
            .cloned()
            .chain(self.sequences.iter().flat_map(Sequence::compile))
            .collect();

        serde_json::json!({
            "channel": Value::Object(channel),
            "sequences": sequences,
        })
    }
}

/// All channels of a song plus its timing.
#[derive(Debug, Clone)]
pub struct Session {
    pub bpm: f64,
    pub granularity: u32,
    pub channels: Vec<Channel>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            granularity: DEFAULT_GRANULARITY,
            channels: Vec::new(),
        }
    }

    /// Builds a session from the engine's channel records.
    ///
    /// The percussion channel is appended, without an instrument, when no
    /// record names it.
    pub fn from_definitions(defs: Vec<ChannelSettings>) -> Result<Self, DefinitionError> {
        let mut session = Self::new();
        for settings in defs {
            session.channels.push(Channel::from_settings(settings)?);
        }
        if session.channel(PERCUSSION_CHANNEL).is_none() {
            session.channels.push(Channel::new(PERCUSSION_CHANNEL));
        }
        tracing::debug!("session: {} channels", session.channels.len());
        Ok(session)
    }

    pub fn channel(&self, number: u8) -> Option<&Channel> {
        self.channels.iter().find(|c| c.number == number)
    }

    pub fn channel_mut(&mut self, number: u8) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.number == number)
    }

    /// Routes existing sequence definitions to their channels, replacing any
    /// routed earlier.
    ///
    /// A definition lands on the channel named by its note or mixer key.
    /// Wrappers such as `repeat` are followed to their inner sequence, and a
    /// `combine` is split so each part lands on its own channel, still inside
    /// the wrappers around it. Returns how many definitions were dropped
    /// because they name no known channel or cannot be read.
    pub fn assign_sequences(&mut self, defs: Vec<Value>) -> usize {
        for channel in &mut self.channels {
            channel.definitions.clear();
        }
        let known: Vec<u8> = self.channels.iter().map(|c| c.number).collect();
        let mut dropped = 0;
        for def in &defs {
            for (number, routed) in route(def, &known, &mut dropped) {
                if let Some(channel) = self.channel_mut(number) {
                    channel.definitions.push(routed);
                }
            }
        }
        tracing::debug!(
            "session: routed {} sequence definitions, dropped {dropped}",
            defs.len()
        );
        dropped
    }

    /// Compiles the sequencer definition for the whole session.
    pub fn compile(&self) -> Document {
        let mut channels = Vec::with_capacity(self.channels.len());
        let mut sequences = Vec::new();
        for channel in &self.channels {
            let Value::Object(mut compiled) = channel.compile() else {
                continue;
            };
            if let Some(def) = compiled.remove("channel") {
                channels.push(def);
            }
            if let Some(Value::Array(seqs)) = compiled.remove("sequences") {
                sequences.extend(seqs);
            }
        }

        serde_json::json!({
            "bpm": number(self.bpm),
            "granularity": self.granularity,
            "channels": channels,
            "sequences": sequences,
        })
    }
}

fn present<'a>(def: &'a Value, key: &str) -> Option<&'a Value> {
    def.get(key).filter(|v| !v.is_null())
}

/// Splits a sequence definition into per-channel parts.
fn route(def: &Value, known: &[u8], dropped: &mut usize) -> Vec<(u8, Value)> {
    if let Some(key) = CHANNEL_KEYS.iter().find(|k| present(def, k).is_some()) {
        let channel = def[*key]
            .get("channel")
            .and_then(Value::as_u64)
            .and_then(|c| u8::try_from(c).ok());
        return match channel {
            Some(number) if known.contains(&number) => vec![(number, def.clone())],
            _ => {
                tracing::warn!("session: missing channel for {key} sequence, dropping");
                *dropped += 1;
                Vec::new()
            }
        };
    }

    if let Some(key) = WRAPPER_KEYS.iter().find(|k| present(def, k).is_some()) {
        let Some(inner) = present(&def[*key], "sequence") else {
            tracing::warn!("session: {key} has no sequence, dropping");
            *dropped += 1;
            return Vec::new();
        };
        return route(inner, known, dropped)
            .into_iter()
            .map(|(number, part)| {
                let mut wrapped = def.clone();
                wrapped[*key]["sequence"] = part;
                (number, wrapped)
            })
            .collect();
    }

    if let Some(parts) = present(def, "combine") {
        let Some(parts) = parts.as_array() else {
            tracing::warn!("session: combine is not a list, dropping");
            *dropped += 1;
            return Vec::new();
        };
        return parts
            .iter()
            .flat_map(|part| route(part, known, dropped))
            .collect();
    }

    tracing::warn!("session: unknown sequence definition {def}, dropping");
    *dropped += 1;
    Vec::new()
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
