//! Property-based tests for the patch graph and its compilers.
//!
//! Tests toggle behaviour, socket type safety, and schedule completeness on
//! randomly built instrument graphs.

use std::collections::HashSet;

use patchbay::dsp::{PortDirection, Unit};
use patchbay::engine::{Instrument, Schedule};
use patchbay::graph::{ModuleId, Patchable};
use patchbay::modules::{ChannelOutput, Generator, InstrumentUnit, Transpose, Waveform};
use proptest::prelude::*;
use serde_json::Value;

/// Builds a graph from registry indices; a unit kind is picked per index.
fn build_graph(kinds: &[usize]) -> (Patchable<InstrumentUnit>, Vec<ModuleId>) {
    let registry = InstrumentUnit::registry();
    let mut graph = Patchable::new();
    let ids = kinds
        .iter()
        .filter_map(|k| registry.create(registry.kinds()[k % registry.len()]))
        .map(|unit| graph.add_module(unit))
        .collect();
    (graph, ids)
}

/// Resolves a random (module, socket) pick.
fn pick(
    graph: &Patchable<InstrumentUnit>,
    ids: &[ModuleId],
    module: usize,
    socket: usize,
) -> (ModuleId, &'static str) {
    let id = ids[module % ids.len()];
    let ports = graph.unit(id).map(|u| u.ports()).unwrap_or(&[]);
    (id, ports[socket % ports.len()].name)
}

fn transpose_depth(doc: &Value) -> usize {
    match doc.get("transpose") {
        Some(inner) => 1 + transpose_depth(inner),
        None => 0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every patch that survives any sequence of connect attempts joins an
    /// output to an input of the same signal type, and no two patches join
    /// the same sockets.
    #[test]
    fn patches_are_always_well_typed(
        kinds in prop::collection::vec(0usize..64, 1..8),
        attempts in prop::collection::vec((0usize..64, 0usize..8, 0usize..64, 0usize..8), 0..40),
    ) {
        let (mut graph, ids) = build_graph(&kinds);
        for (a, sa, b, sb) in attempts {
            let (ma, pa) = pick(&graph, &ids, a, sa);
            let (mb, pb) = pick(&graph, &ids, b, sb);
            let before = graph.patches().to_vec();
            if graph.connect(ma, mb, pa, pb).is_err() {
                prop_assert_eq!(graph.patches(), &before[..], "failed connect changed the graph");
            }
        }

        for (i, patch) in graph.patches().iter().enumerate() {
            let from = graph.unit(patch.from.module).and_then(|u| u.port(patch.from.socket));
            let to = graph.unit(patch.to.module).and_then(|u| u.port(patch.to.socket));
            prop_assert!(from.is_some() && to.is_some(), "dangling patch {}", patch);
            let (from, to) = (from.unwrap(), to.unwrap());
            prop_assert_eq!(from.direction, PortDirection::Output);
            prop_assert_eq!(to.direction, PortDirection::Input);
            prop_assert_eq!(from.signal_type, patch.signal_type);
            prop_assert_eq!(to.signal_type, patch.signal_type);
            for other in &graph.patches()[i + 1..] {
                prop_assert!(!patch.is_isomorphic(other), "{} duplicated", patch);
            }
        }
    }

    /// Connecting the same two sockets twice, in either order, restores the
    /// original patch set.
    #[test]
    fn connect_toggles(
        kinds in prop::collection::vec(0usize..64, 2..6),
        a in 0usize..64, sa in 0usize..8,
        b in 0usize..64, sb in 0usize..8,
        reversed in any::<bool>(),
    ) {
        let (mut graph, ids) = build_graph(&kinds);
        let (ma, pa) = pick(&graph, &ids, a, sa);
        let (mb, pb) = pick(&graph, &ids, b, sb);

        if graph.connect(ma, mb, pa, pb).is_ok() {
            prop_assert_eq!(graph.patch_count(), 1);
            prop_assert!(graph.has_patch(ma, pa, mb, pb));
            prop_assert!(graph.has_patch(mb, pb, ma, pa));
            let undo = if reversed {
                graph.connect(mb, ma, pb, pa)
            } else {
                graph.connect(ma, mb, pa, pb)
            };
            prop_assert!(undo.is_ok());
        }
        prop_assert_eq!(graph.patch_count(), 0);
    }

    /// On acyclic graphs every reachable module is emitted exactly once, and
    /// after everything patched into it.
    #[test]
    fn schedule_respects_every_patch(
        kinds in prop::collection::vec(0usize..64, 1..10),
        attempts in prop::collection::vec((0usize..64, 0usize..8, 0usize..64, 0usize..8), 0..40),
    ) {
        let (mut graph, mut ids) = build_graph(&kinds);
        let output = graph.add_module(InstrumentUnit::Output(ChannelOutput));
        ids.push(output);

        // Only patch forwards in insertion order, which keeps the graph acyclic.
        for (a, sa, b, sb) in attempts {
            let (ma, pa) = pick(&graph, &ids, a, sa);
            let (mb, pb) = pick(&graph, &ids, b, sb);
            let out_a = graph.unit(ma).and_then(|u| u.port(pa)).map(|p| p.is_output());
            let forwards = match out_a {
                Some(true) => ma < mb,
                _ => mb < ma,
            };
            if forwards && !graph.has_patch(ma, pa, mb, pb) {
                let _ = graph.connect(ma, mb, pa, pb);
            }
        }

        let schedule = Schedule::new(&graph, &[output]);
        let emitted: HashSet<ModuleId> = schedule.emission().iter().copied().collect();
        prop_assert_eq!(emitted.len(), schedule.emission().len(), "module emitted twice");
        prop_assert_eq!(schedule.emission().len(), schedule.discovery().len());
        prop_assert_eq!(schedule.emission().last(), Some(&output));

        let position = |id: ModuleId| schedule.emission().iter().position(|m| *m == id);
        for patch in graph.patches() {
            if let (Some(from), Some(to)) = (position(patch.from.module), position(patch.to.module)) {
                prop_assert!(from < to, "{} emitted out of order", patch);
            }
        }
    }

    /// A chain of transposes nests exactly as deep as it is long.
    #[test]
    fn transpose_chain_nests_by_length(
        semitones in prop::collection::vec(-24i32..=24, 1..8),
    ) {
        let mut instrument = Instrument::new();
        let input = instrument.graph.find_kind("input").unwrap();
        let out = instrument.graph.find_kind("output").unwrap();
        let osc = instrument.graph.add_module(InstrumentUnit::Generator(Generator::new(Waveform::Sine)));
        instrument.graph.connect(osc, out, "OUT", "IN").unwrap();

        let mut source = (input, "FREQ");
        for s in &semitones {
            let t = instrument.graph.add_module(InstrumentUnit::Transpose(Transpose::new()));
            instrument.graph.set_parameter(t, "semitones", f64::from(*s));
            instrument.graph.connect(source.0, t, source.1, "FREQ IN").unwrap();
            source = (t, "FREQ");
        }
        instrument.graph.connect(source.0, osc, source.1, "FREQ").unwrap();

        let doc = instrument.compile().unwrap();
        let pitch = &doc["sine"]["auto_pitch"];
        prop_assert_eq!(transpose_depth(pitch), semitones.len());
        prop_assert_eq!(&pitch["transpose"]["semitones"], &Value::from(*semitones.last().unwrap()));
        prop_assert!(doc["sine"].get("pitch").is_none());
    }
}
