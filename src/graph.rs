// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};
use std::sync::Arc;

use crate::geometry::Point;
use crate::model::{Intersection, NodeId, RoadClass, Street, StreetId};

/// Represents an element of the [Graph].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub point: Point,
}

impl From<Intersection> for Node {
    fn from(i: Intersection) -> Self {
        Self {
            id: i.id,
            point: i.point,
        }
    }
}

/// Attributes of a traversable [Edge], as seen by cost functions.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAttrs {
    /// Identifier of the [Street] record backing this edge.
    pub street: StreetId,

    /// Base cost of traversing the edge. `None` edges are never offered to the search.
    pub cost: Option<f64>,

    /// Display name of the street.
    pub name: Option<Arc<str>>,

    pub class: RoadClass,
}

impl EdgeAttrs {
    /// Creates attributes for traversing the given street, with an explicit cost.
    pub fn for_street(street: &Street, cost: Option<f64>) -> Self {
        Self {
            street: street.id,
            cost,
            name: street.name.as_ref().map(|n| Arc::from(n.to_string())),
            class: street.class,
        }
    }
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// Due to implementation details, `to` might not exist in the [Graph].
/// Users must silently ignore such edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    pub attrs: EdgeAttrs,
}

/// Represents a street network as a set of [Nodes](Node) and directed
/// [Edges](Edge) between them. Multiple edges between the same pair of nodes
/// are permitted, as long as they are backed by different streets.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<NodeId, (Node, Vec<Edge>)>,
    edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from storage records.
    ///
    /// Every two-way street becomes two edges sharing one cost. Streets with
    /// no cost, invalid costs or referencing unknown intersections are skipped.
    pub fn from_network<I, S>(intersections: I, streets: S) -> Self
    where
        I: IntoIterator<Item = Intersection>,
        S: IntoIterator<Item = Street>,
    {
        let mut g = Self::new();
        intersections
            .into_iter()
            .for_each(|i| g.set_node(Node::from(i)));

        for street in streets {
            let cost = match street.cost {
                Some(cost) if cost.is_finite() && cost > 0.0 => cost,
                Some(cost) => {
                    log::warn!("street {}: skipping invalid cost {}", street.id, cost);
                    continue;
                }
                None => continue,
            };

            if g.get_node(street.start).is_none() || g.get_node(street.end).is_none() {
                log::warn!(
                    "street {}: skipping, references unknown intersection ({} -> {})",
                    street.id,
                    street.start,
                    street.end,
                );
                continue;
            }

            let (forward, backward) = street.direction();
            let attrs = EdgeAttrs::for_street(&street, Some(cost));

            if forward {
                g.set_edge(
                    street.start,
                    Edge {
                        to: street.end,
                        attrs: attrs.clone(),
                    },
                );
            }
            if backward {
                g.set_edge(
                    street.end,
                    Edge {
                        to: street.start,
                        attrs,
                    },
                );
            }
        }

        log::debug!("built graph: {} nodes, {} edges", g.len(), g.edge_count());
        g
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of directed edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved.
    pub fn set_node(&mut self, node: Node) {
        match self.nodes.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: NodeId) -> &[Edge] {
        self.nodes
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the cheapest [Edge] from one node to another, if one exists.
    pub fn get_edge(&self, from_id: NodeId, to_id: NodeId) -> Option<&Edge> {
        self.get_edges(from_id)
            .iter()
            .filter(|e| e.to == to_id)
            .min_by(|a, b| {
                let a = a.attrs.cost.unwrap_or(f64::INFINITY);
                let b = b.attrs.cost.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            })
    }

    /// Creates or updates an [Edge] from a node with a given id.
    /// An existing edge is only replaced if it leads to the same node
    /// and is backed by the same street.
    pub fn set_edge(&mut self, from_id: NodeId, edge: Edge) {
        if let Some((_, edges)) = self.nodes.get_mut(&from_id) {
            if let Some(candidate) = edges
                .iter_mut()
                .find(|e| e.to == edge.to && e.attrs.street == edge.attrs.street)
            {
                *candidate = edge;
            } else {
                edges.push(edge);
                self.edge_count += 1;
            }
        }
    }
}
