//! Values passed between units while a graph is compiled.
//!
//! Where an audio engine moves sample buffers from module to module, the
//! compilers move engine-facing documents: each unit turns the documents
//! arriving on its input sockets into its own contribution.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// A plain nested document as consumed by the external engine.
pub type Document = Value;

/// A function wrapping a downstream document, produced by sequencing units.
pub type Transform = Rc<dyn Fn(Document) -> Document>;

/// What a single unit contributes to a compile pass.
#[derive(Clone)]
pub enum Emission {
    /// Pass-through kinds (graph inputs) contribute nothing.
    Nothing,
    /// A keyed document describing the unit and everything upstream of it.
    Document(Document),
    /// A document transformer, applied by a terminal unit to its own document.
    Transform(Transform),
    /// Fully formed output documents from a terminal unit.
    Events(Vec<Document>),
}

impl Emission {
    /// Returns the document, if this emission is one.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Emission::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the transform, if this emission is one.
    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            Emission::Transform(f) => Some(f),
            _ => None,
        }
    }

    /// Consumes the emission, returning its document.
    pub fn into_document(self) -> Option<Document> {
        match self {
            Emission::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Consumes the emission, returning its output documents.
    pub fn into_events(self) -> Vec<Document> {
        match self {
            Emission::Events(events) => events,
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emission::Nothing => f.write_str("Nothing"),
            Emission::Document(doc) => f.debug_tuple("Document").field(doc).finish(),
            Emission::Transform(_) => f.write_str("Transform(..)"),
            Emission::Events(events) => f.debug_tuple("Events").field(events).finish(),
        }
    }
}

/// The upstream emissions feeding each input socket of one unit.
///
/// Sockets with no patch are absent and read as an empty slice. Emissions
/// for one socket are ordered by when their producer was discovered.
#[derive(Clone, Debug, Default)]
pub struct Connections {
    inputs: Vec<(&'static str, Vec<Emission>)>,
}

impl Connections {
    /// Creates an empty connection set (every socket unconnected).
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the upstream emissions for a socket.
    pub fn insert(&mut self, socket: &'static str, emissions: Vec<Emission>) {
        match self.inputs.iter_mut().find(|(name, _)| *name == socket) {
            Some((_, existing)) => *existing = emissions,
            None => self.inputs.push((socket, emissions)),
        }
    }

    /// Builder form of [`Connections::insert`].
    pub fn with(mut self, socket: &'static str, emissions: Vec<Emission>) -> Self {
        self.insert(socket, emissions);
        self
    }

    /// Returns every emission patched into a socket.
    pub fn get(&self, socket: &str) -> &[Emission] {
        self.inputs
            .iter()
            .find(|(name, _)| *name == socket)
            .map(|(_, emissions)| emissions.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true if at least one patch feeds the socket, even one whose
    /// producer contributes nothing.
    pub fn is_connected(&self, socket: &str) -> bool {
        !self.get(socket).is_empty()
    }

    /// Returns the documents patched into a socket.
    pub fn documents<'a>(&'a self, socket: &str) -> impl Iterator<Item = &'a Document> + 'a {
        self.get(socket).iter().filter_map(Emission::as_document)
    }

    /// Returns the transforms patched into a socket.
    pub fn transforms<'a>(&'a self, socket: &str) -> impl Iterator<Item = &'a Transform> + 'a {
        self.get(socket).iter().filter_map(Emission::as_transform)
    }

    /// Resolves a socket's documents into one: none yields `None`, one is
    /// returned as is, several are wrapped as `{"combined": [..]}`.
    pub fn resolve(&self, socket: &str) -> Option<Document> {
        let mut docs: Vec<Document> = self.documents(socket).cloned().collect();
        match docs.len() {
            0 => None,
            1 => docs.pop(),
            _ => {
                let mut combined = Map::new();
                combined.insert("combined".to_string(), Value::Array(docs));
                Some(Value::Object(combined))
            }
        }
    }
}

/// Converts a dial value into a JSON number, keeping whole values integral.
///
/// The engine decodes counts such as notes and velocities as integers, so
/// `440.0` is written as `440`.
pub fn number(value: f64) -> Document {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Copies the keys of an object document into `target`.
///
/// Non-object documents have no keys to contribute and are ignored.
pub fn merge_keys(target: &mut Map<String, Value>, source: Document) {
    if let Value::Object(map) = source {
        target.extend(map);
    }
}

/// Builds `{key: body}`.
pub fn keyed(key: &str, body: Map<String, Value>) -> Document {
    let mut doc = Map::new();
    doc.insert(key.to_string(), Value::Object(body));
    Value::Object(doc)
}
