// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Edge;
use std::collections::btree_map::{BTreeMap, Entry};

/// Represents a road network as a set of named locations
/// and [Edges](Edge) between them.
///
/// Nodes are kept sorted by name, which makes every iteration
/// over the graph (and thus route search) deterministic.
///
/// Edges are directed. Two-way roads are represented by two edges of equal cost;
/// this is a convention of whoever builds the graph and is not enforced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<String, Vec<Edge>>);

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all node names, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Checks whether a node with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Ensures a node with the provided name exists.
    ///
    /// Outgoing edges of an existing node are preserved.
    pub fn set_node<S: Into<String>>(&mut self, name: S) {
        self.0.entry(name.into()).or_default();
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given name.
    pub fn get_edges(&self, from: &str) -> &[Edge] {
        self.0.get(from).map(Vec::as_slice).unwrap_or_default()
    }

    /// Gets the cost of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f32::INFINITY].
    pub fn get_edge(&self, from: &str, to: &str) -> f32 {
        self.get_edges(from)
            .iter()
            .find_map(|edge| if edge.to == to { Some(edge.cost) } else { None })
            .unwrap_or(f32::INFINITY)
    }

    /// Creates or updates an [Edge] from a node with a given name,
    /// creating the `from` node if necessary.
    ///
    /// The edge cost must be finite and not negative.
    pub fn set_edge<S: Into<String>>(&mut self, from: S, edge: Edge) {
        assert!(
            edge.cost.is_finite() && edge.cost >= 0.0,
            "edge cost must be finite and not negative, got {}",
            edge.cost
        );

        let edges = match self.0.entry(from.into()) {
            Entry::Vacant(e) => e.insert(Vec::default()),
            Entry::Occupied(e) => e.into_mut(),
        };

        if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
            *candidate = edge;
        } else {
            edges.push(edge);
        }
    }

    /// Creates or updates a pair of [Edges](Edge) of equal cost
    /// between two nodes, creating both nodes if necessary.
    pub fn set_road(&mut self, a: &str, b: &str, cost: f32) {
        self.set_edge(a, Edge::new(b, cost));
        self.set_edge(b, Edge::new(a, cost));
    }
}

impl<S: Into<String>> FromIterator<(S, S, f32)> for Graph {
    /// Builds a graph of two-way roads from `(a, b, cost)` triples.
    fn from_iter<I: IntoIterator<Item = (S, S, f32)>>(roads: I) -> Self {
        let mut g = Self::default();
        for (a, b, cost) in roads {
            let (a, b) = (a.into(), b.into());
            g.set_road(&a, &b, cost);
        }
        g
    }
}
