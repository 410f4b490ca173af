//! The shared reduction pass behind both compilers.

use std::collections::HashMap;

use super::schedule::Schedule;
use crate::dsp::{Connections, Emission, Unit};
use crate::graph::{ModuleId, Patchable};

/// Everything a compile pass produced, in compile order.
#[derive(Debug)]
pub struct Reduction {
    steps: Vec<(ModuleId, Emission)>,
}

impl Reduction {
    /// Compiles every module the sinks depend on.
    ///
    /// The units are copied out of the graph before anything is compiled,
    /// so the pass reads one consistent set of dial values.
    pub fn run<U: Unit>(graph: &Patchable<U>, sinks: &[ModuleId], context: &U::Context) -> Self {
        let schedule = Schedule::new(graph, sinks);
        if schedule.is_empty() {
            tracing::debug!("compile: nothing reachable from {} sinks", sinks.len());
            return Self { steps: Vec::new() };
        }
        let snapshot: HashMap<ModuleId, U> = schedule
            .discovery()
            .iter()
            .filter_map(|&id| graph.unit(id).map(|unit| (id, unit.clone())))
            .collect();
        let mut cache: HashMap<ModuleId, Emission> = HashMap::with_capacity(schedule.len());
        let mut steps = Vec::with_capacity(schedule.len());

        for &id in schedule.emission() {
            let Some(unit) = snapshot.get(&id) else {
                continue;
            };

            let mut connections = Connections::new();
            for port in unit.inputs() {
                let mut producers: Vec<ModuleId> = graph
                    .patches_into(id, port.name)
                    .filter_map(|patch| patch.opposite(id, port.name))
                    .map(|end| end.module)
                    .collect();
                producers.sort_by_key(|&producer| schedule.rank(producer).unwrap_or(usize::MAX));

                let mut upstream = Vec::with_capacity(producers.len());
                for producer in producers {
                    match cache.get(&producer) {
                        Some(emission) => upstream.push(emission.clone()),
                        None => tracing::warn!(
                            "compile: {producer} feeds {id}.{} before it was compiled",
                            port.name
                        ),
                    }
                }
                if !upstream.is_empty() {
                    connections.insert(port.name, upstream);
                }
            }

            let emission = unit.compile(context, &connections);
            cache.insert(id, emission.clone());
            steps.push((id, emission));
        }

        tracing::debug!(
            "compile: {} sinks, {} modules reduced",
            sinks.len(),
            steps.len()
        );
        Self { steps }
    }

    /// Returns the emission of one module, if it was compiled.
    pub fn get(&self, id: ModuleId) -> Option<&Emission> {
        self.steps.iter().find(|(m, _)| *m == id).map(|(_, e)| e)
    }

    /// Modules in the order they were compiled.
    #[cfg(test)]
    pub(crate) fn order(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.steps.iter().map(|(id, _)| *id)
    }

    /// Number of modules compiled.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consumes the reduction, returning every emission in compile order.
    pub fn into_steps(self) -> Vec<(ModuleId, Emission)> {
        self.steps
    }
}
