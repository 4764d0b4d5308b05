//! Field dependency graph built on `petgraph`.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use stencil_template::Rule;

/// A directed graph from each rule's condition fields to its target fields.
///
/// Edges from a field to itself are left out: a rule that reads and writes
/// the same field models a default value, not a dependency.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index_map: HashMap<String, NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    /// Build the graph for `rules`. Nodes appear in first-mention order.
    #[must_use]
    pub fn from_rules(rules: &[Rule]) -> Self {
        let mut this = Self::default();
        for rule in rules {
            for condition in &rule.conditions {
                let from = this.node(&condition.name);
                for target in &rule.targets {
                    if target.name == condition.name {
                        continue;
                    }
                    let to = this.node(&target.name);
                    this.graph.update_edge(from, to, ());
                }
            }
            for target in &rule.targets {
                this.node(&target.name);
            }
        }
        this
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index_map.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_owned());
        self.index_map.insert(name.to_owned(), idx);
        idx
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct condition→target edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `name` appears in any rule.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_map.contains_key(name)
    }

    /// Returns `true` if the graph contains at least one cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Fields whose state decides whether `name` is targeted.
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Fields targeted by rules that read `name`.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index_map.get(name) else {
            return Vec::new();
        };
        self.ordered_neighbors(idx, direction)
            .into_iter()
            .map(|i| self.graph[i].as_str())
            .collect()
    }

    // petgraph yields the most recently added edge first.
    fn ordered_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        out.reverse();
        out
    }

    /// Every cycle found by a depth-first walk, each path ending with its
    /// first node repeated.
    ///
    /// Components are walked once each, starting from nodes in first-mention
    /// order. A cycle is reported for every back edge met, so overlapping
    /// loops may share nodes.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut cycles = Vec::new();

        for start in self.graph.node_indices() {
            if marks[start.index()] != Mark::Unvisited {
                continue;
            }
            marks[start.index()] = Mark::OnStack;
            let mut path = vec![start];
            let mut frames = vec![(self.ordered_neighbors(start, Direction::Outgoing), 0usize)];

            while let Some((successors, cursor)) = frames.last_mut() {
                let Some(&next) = successors.get(*cursor) else {
                    frames.pop();
                    if let Some(done) = path.pop() {
                        marks[done.index()] = Mark::Done;
                    }
                    continue;
                };
                *cursor += 1;

                match marks[next.index()] {
                    Mark::OnStack => {
                        let pos = path.iter().position(|&p| p == next).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[pos..].iter().map(|&i| self.graph[i].clone()).collect();
                        cycle.push(self.graph[next].clone());
                        cycles.push(cycle);
                    }
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnStack;
                        path.push(next);
                        frames.push((self.ordered_neighbors(next, Direction::Outgoing), 0));
                    }
                    Mark::Done => {}
                }
            }
        }

        cycles
    }
}
