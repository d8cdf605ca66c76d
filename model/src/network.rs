pub mod demand;


use std::collections::BTreeMap;

use derive_more::Display;
use smt::Value;

use crate::base_types::{Color, EdgeKey, NodeName};

/// Attributes of one parallel edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub color: Color,
    pub capacity: Option<f64>,
    /// Concrete ticket price, or the solver variable standing in for it.
    pub price: Option<Value>,
    /// Congestion coefficient.
    pub k: f64,
    /// The `f_e` slot; allocated before solving, concrete afterwards.
    pub flow: Option<Value>,
}

impl Edge {
    pub fn new(color: &str, capacity: Option<f64>, price: Option<Value>, k: f64) -> Edge {
        Edge {
            color: color.to_string(),
            capacity,
            price,
            k,
            flow: None,
        }
    }
}

/// Oriented reference to one parallel edge, the way a route traverses it.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display(fmt = "{}-{}-{}", from, to, key)]
pub struct EdgeRef {
    pub from: NodeName,
    pub to: NodeName,
    pub key: EdgeKey,
}

impl EdgeRef {
    pub fn new(from: &str, to: &str, key: &str) -> EdgeRef {
        EdgeRef {
            from: from.to_string(),
            to: to.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether this reference and `other` address the same undirected edge.
    pub fn same_edge(&self, other: &EdgeRef) -> bool {
        self.key == other.key
            && ((self.from == other.from && self.to == other.to)
                || (self.from == other.to && self.to == other.from))
    }
}

/// Undirected multigraph. Parallel edges between a node pair are told apart
/// by their key; `(u, v, key)` and `(v, u, key)` address the same edge.
///
/// Storage is ordered so that iteration over nodes, neighbors and parallel
/// edges is deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct Network {
    edges: BTreeMap<(NodeName, NodeName, EdgeKey), Edge>,
    adjacency: BTreeMap<NodeName, BTreeMap<NodeName, Vec<EdgeKey>>>,
}

// methods
impl Network {
    pub fn contains_node(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeName> {
        self.adjacency.keys()
    }

    pub fn number_of_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a NodeName> + 'a {
        self.adjacency.get(node).into_iter().flat_map(|n| n.keys())
    }

    /// Keys of all parallel edges between `u` and `v`, in insertion order.
    pub fn parallel_edges<'a>(&'a self, u: &str, v: &str) -> impl Iterator<Item = &'a EdgeKey> + 'a {
        self.adjacency
            .get(u)
            .and_then(|n| n.get(v))
            .into_iter()
            .flatten()
    }

    pub fn edge(&self, reference: &EdgeRef) -> Option<&Edge> {
        self.edges.get(&Self::canonical(reference))
    }

    pub fn edge_mut(&mut self, reference: &EdgeRef) -> Option<&mut Edge> {
        self.edges.get_mut(&Self::canonical(reference))
    }

    /// All edges in canonical orientation.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeRef, &Edge)> {
        self.edges
            .iter()
            .map(|((u, v, key), edge)| (EdgeRef::new(u, v, key), edge))
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = (EdgeRef, &mut Edge)> {
        self.edges
            .iter_mut()
            .map(|((u, v, key), edge)| (EdgeRef::new(u, v, key), edge))
    }

    pub fn add_edge(&mut self, u: &str, v: &str, key: &str, edge: Edge) {
        let reference = EdgeRef::new(u, v, key);
        let canonical = Self::canonical(&reference);
        if self.edges.insert(canonical, edge).is_none() {
            self.adjacency
                .entry(u.to_string())
                .or_default()
                .entry(v.to_string())
                .or_default()
                .push(key.to_string());
            if u != v {
                self.adjacency
                    .entry(v.to_string())
                    .or_default()
                    .entry(u.to_string())
                    .or_default()
                    .push(key.to_string());
            }
        }
    }

    /// Add every edge of `other` to this network (routes extensions).
    pub fn merge(&mut self, other: Network) {
        for ((u, v, key), edge) in other.edges {
            self.add_edge(&u, &v, &key, edge);
        }
    }

    fn canonical(reference: &EdgeRef) -> (NodeName, NodeName, EdgeKey) {
        if reference.from <= reference.to {
            (
                reference.from.clone(),
                reference.to.clone(),
                reference.key.clone(),
            )
        } else {
            (
                reference.to.clone(),
                reference.from.clone(),
                reference.key.clone(),
            )
        }
    }
}
