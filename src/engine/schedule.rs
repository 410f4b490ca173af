//! Compile scheduling.
//!
//! A compile pass starts from its sink modules, walks patches backwards from
//! consumers to producers to find everything the sinks depend on, and then
//! orders that set so every producer is compiled before its consumers.

use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::dsp::Unit;
use crate::graph::{ModuleId, Patchable};

/// The modules a compile pass visits, in two orders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Breadth-first discovery order, sinks first.
    discovery: Vec<ModuleId>,
    /// Compile order: producers before consumers.
    emission: Vec<ModuleId>,
    /// Discovery position of every reachable module.
    rank: HashMap<ModuleId, usize>,
}

impl Schedule {
    /// Computes the schedule for the given sinks.
    pub fn new<U: Unit>(graph: &Patchable<U>, sinks: &[ModuleId]) -> Self {
        let discovery = discover(graph, sinks);
        let emission = emission_order(graph, &discovery);
        let rank = discovery
            .iter()
            .enumerate()
            .map(|(rank, &id)| (id, rank))
            .collect();
        Self {
            discovery,
            emission,
            rank,
        }
    }

    /// Modules in discovery order (sinks first).
    pub fn discovery(&self) -> &[ModuleId] {
        &self.discovery
    }

    /// Modules in the order they must be compiled.
    pub fn emission(&self) -> &[ModuleId] {
        &self.emission
    }

    /// Position of a module in discovery order.
    pub fn rank(&self, id: ModuleId) -> Option<usize> {
        self.rank.get(&id).copied()
    }

    /// Number of modules reachable from the sinks.
    pub fn len(&self) -> usize {
        self.discovery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discovery.is_empty()
    }
}

/// Breadth-first walk from the sinks towards their producers.
///
/// A neighbour is reached through a patch whose input end sits on the module
/// being visited. Each module is enqueued once.
pub fn discover<U: Unit>(graph: &Patchable<U>, sinks: &[ModuleId]) -> Vec<ModuleId> {
    let mut seen: HashSet<ModuleId> = HashSet::new();
    let mut queue: VecDeque<ModuleId> = VecDeque::new();
    let mut order = Vec::new();

    for &sink in sinks {
        if graph.module(sink).is_some() && seen.insert(sink) {
            queue.push_back(sink);
        }
    }

    while let Some(current) = queue.pop_front() {
        order.push(current);
        for patch in graph.patches() {
            if patch.to.module == current && seen.insert(patch.from.module) {
                queue.push_back(patch.from.module);
            }
        }
    }

    order
}

/// Orders the discovered modules with Kahn's algorithm.
///
/// Among the modules whose producers are all compiled, the one discovered
/// last goes first. For tree-shaped graphs this is exactly the reverse of
/// discovery order; graphs where one producer feeds branches of different
/// depth still get every producer ahead of its consumers.
///
/// Modules on a cycle can never become ready. They are appended in reverse
/// discovery order, and their unresolved inputs are left empty.
pub fn emission_order<U: Unit>(graph: &Patchable<U>, discovery: &[ModuleId]) -> Vec<ModuleId> {
    let rank: HashMap<ModuleId, usize> = discovery
        .iter()
        .enumerate()
        .map(|(rank, &id)| (id, rank))
        .collect();

    // Count incoming patches for each reachable module
    let mut in_degree: Vec<usize> = vec![0; discovery.len()];
    for patch in graph.patches() {
        if let (Some(_), Some(&to)) = (rank.get(&patch.from.module), rank.get(&patch.to.module)) {
            in_degree[to] += 1;
        }
    }

    let mut ready: BinaryHeap<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(rank, _)| rank)
        .collect();

    let mut order = Vec::with_capacity(discovery.len());
    let mut emitted = vec![false; discovery.len()];

    while let Some(next) = ready.pop() {
        let id = discovery[next];
        order.push(id);
        emitted[next] = true;

        for patch in graph.patches() {
            if patch.from.module != id {
                continue;
            }
            if let Some(&to) = rank.get(&patch.to.module) {
                in_degree[to] -= 1;
                if in_degree[to] == 0 {
                    ready.push(to);
                }
            }
        }
    }

    if order.len() < discovery.len() {
        tracing::warn!(
            "graph_sort: cycle detected, {} of {} modules compiled out of order",
            discovery.len() - order.len(),
            discovery.len()
        );
        for rank in (0..discovery.len()).rev() {
            if !emitted[rank] {
                order.push(discovery[rank]);
            }
        }
    }

    tracing::debug!("graph_sort: {} modules in compile order", order.len());
    order
}
