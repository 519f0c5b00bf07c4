// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{Edge, Graph, Node};
use crate::model::{NodeId, Street, StreetId};

/// Temporary nodes, edges and streets living for the duration of a single query.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Annex {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<NodeId, Vec<Edge>>,
    suppressed: BTreeSet<(NodeId, NodeId, StreetId)>,
    streets: BTreeMap<StreetId, Street>,

    /// Current pieces of every split street, keyed by the id of the street
    /// which was split first.
    pieces: BTreeMap<StreetId, Vec<StreetId>>,
}

impl Annex {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over all temporary edges, together with their source node.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, &Edge)> {
        self.edges
            .iter()
            .flat_map(|(&from, edges)| edges.iter().map(move |e| (from, e)))
    }

    /// Synthetic streets created for this query.
    pub fn streets(&self) -> &BTreeMap<StreetId, Street> {
        &self.streets
    }
}

/// A query-scoped view over a shared, read-only [Graph].
///
/// All modifications (temporary nodes and edges, hidden graph edges) are kept
/// in the session's own [Annex], and are gone once the session is dropped.
/// Synthetic identifiers are handed out from the negative range and are
/// only unique within one session.
#[derive(Debug, Clone)]
pub struct Session<'g> {
    graph: &'g Graph,
    annex: Annex,
    last_node_id: NodeId,
    last_street_id: StreetId,
}

impl<'g> Session<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            annex: Annex::default(),
            last_node_id: 0,
            last_street_id: 0,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn annex(&self) -> &Annex {
        &self.annex
    }

    /// Allocates a new synthetic (negative) node identifier.
    pub fn next_node_id(&mut self) -> NodeId {
        self.last_node_id -= 1;
        self.last_node_id
    }

    /// Allocates a new synthetic (negative) street identifier.
    pub fn next_street_id(&mut self) -> StreetId {
        self.last_street_id -= 1;
        self.last_street_id
    }

    /// Retrieves a [Node] with the provided id, looking at temporary nodes first.
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.annex
            .nodes
            .get(&id)
            .copied()
            .or_else(|| self.graph.get_node(id))
    }

    /// Iterates over all traversable outgoing edges from a node:
    /// graph edges which weren't suppressed, followed by temporary edges.
    /// Edges without a cost are never returned.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.graph
            .get_edges(id)
            .iter()
            .filter(move |e| {
                !self
                    .annex
                    .suppressed
                    .contains(&(id, e.to, e.attrs.street))
            })
            .chain(self.annex.edges.get(&id).into_iter().flatten())
            .filter(|e| e.attrs.cost.is_some())
    }

    pub fn add_temporary_node(&mut self, node: Node) {
        self.annex.nodes.insert(node.id, node);
    }

    pub fn add_temporary_edge(&mut self, from_id: NodeId, edge: Edge) {
        debug_assert!(self.get_node(from_id).is_some());
        debug_assert!(self.get_node(edge.to).is_some());
        self.annex.edges.entry(from_id).or_default().push(edge);
    }

    /// Removes all temporary edges from one node to another.
    pub fn remove_temporary_edge(&mut self, from_id: NodeId, to_id: NodeId) {
        if let Some(edges) = self.annex.edges.get_mut(&from_id) {
            edges.retain(|e| e.to != to_id);
        }
    }

    /// Hides the graph edge from one node to another backed by the given street.
    pub fn suppress_edge(&mut self, from_id: NodeId, to_id: NodeId, street: StreetId) {
        self.annex.suppressed.insert((from_id, to_id, street));
    }

    pub fn add_street(&mut self, street: Street) {
        self.annex.streets.insert(street.id, street);
    }

    pub fn get_street(&self, id: StreetId) -> Option<&Street> {
        self.annex.streets.get(&id)
    }

    /// Returns the current pieces of a split street (identified by
    /// the id of the persisted street), or `None` if it wasn't split.
    pub fn pieces(&self, original: StreetId) -> Option<&[StreetId]> {
        self.annex.pieces.get(&original).map(|p| p.as_slice())
    }

    /// Records that `piece` (or the persisted street `original` itself)
    /// was replaced by `replacements`.
    pub(crate) fn replace_piece(
        &mut self,
        original: StreetId,
        piece: StreetId,
        replacements: [StreetId; 2],
    ) {
        let pieces = self.annex.pieces.entry(original).or_default();
        match pieces.iter().position(|&p| p == piece) {
            Some(idx) => {
                pieces[idx] = replacements[0];
                pieces.insert(idx + 1, replacements[1]);
            }
            None => pieces.extend(replacements),
        }
    }
}
