// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use super::{Limits, SearchError};
use crate::cost::{CostFunction, Heuristic};
use crate::graph::EdgeAttrs;
use crate::model::NodeId;
use crate::session::Session;

/// Result of a successful path search.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Visited nodes, starting with the start node and ending with the end node.
    pub nodes: Vec<NodeId>,

    /// Traversed edges; `edges[i]` leads from `nodes[i]` to `nodes[i + 1]`.
    pub edges: Vec<EdgeAttrs>,

    /// Total cost of the path, as computed by the cost function.
    pub cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct FlatQueueItem {
    at: NodeId,
    cost: f64,
    score: f64,
    seq: u64,
}

impl PartialEq for FlatQueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl PartialOrd for FlatQueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for FlatQueueItem {}

impl Ord for FlatQueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        // Ties are broken by insertion order, to keep results deterministic.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_flat_path(
    came_from: &HashMap<NodeId, (NodeId, EdgeAttrs)>,
    mut last: NodeId,
    cost: f64,
) -> Path {
    let mut nodes = vec![last];
    let mut edges = Vec::new();

    while let Some((nd, edge)) = came_from.get(&last) {
        nodes.push(*nd);
        edges.push(edge.clone());
        last = *nd;
    }

    nodes.reverse();
    edges.reverse();
    Path { nodes, edges, cost }
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm),
/// or [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) if a [Heuristic] is provided,
/// to find the cheapest path between two nodes of a [Session].
///
/// Edge costs are computed by `cost_fn`, which also receives the edge used to
/// arrive at the current node. Only one label is kept per node, so costs depending
/// on the previous edge are evaluated against the cheapest known way into a node.
///
/// Returns [SearchError::NoPath] if the end node can't be reached. `limits` bound
/// the work performed before giving up with [SearchError::StepLimitExceeded],
/// [SearchError::Timeout] or [SearchError::Cancelled].
pub fn find_path(
    session: &Session<'_>,
    from_id: NodeId,
    to_id: NodeId,
    cost_fn: &dyn CostFunction,
    heuristic: Option<&dyn Heuristic>,
    limits: &Limits,
) -> Result<Path, SearchError> {
    let mut queue: BinaryHeap<FlatQueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<NodeId, (NodeId, EdgeAttrs)> = HashMap::default();
    let mut known_costs: HashMap<NodeId, f64> = HashMap::default();
    let mut steps: usize = 0;
    let mut seq: u64 = 0;

    limits.cancel.check()?;

    let to_node = session
        .get_node(to_id)
        .ok_or(SearchError::InvalidReference(to_id))?;

    let estimate = |at: NodeId| -> f64 {
        match (heuristic, session.get_node(at)) {
            (Some(h), Some(node)) => h.estimate(node.point, to_node.point),
            _ => 0.0,
        }
    };

    {
        session
            .get_node(from_id)
            .ok_or(SearchError::InvalidReference(from_id))?;

        queue.push(FlatQueueItem {
            at: from_id,
            cost: 0.0,
            score: estimate(from_id),
            seq,
        });
        known_costs.insert(from_id, 0.0);
    }

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            log::debug!(
                "path {} -> {} found after {} steps, cost {:.3}",
                from_id,
                to_id,
                steps,
                item.cost,
            );
            return Ok(reconstruct_flat_path(&came_from, to_id, item.cost));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        limits.check(steps)?;

        let previous = came_from.get(&item.at).map(|(_, edge)| edge.clone());

        for edge in session.neighbors(item.at) {
            // Check if the referred node exists
            if session.get_node(edge.to).is_none() {
                continue;
            }

            let edge_cost = match cost_fn.cost(item.at, edge.to, &edge.attrs, previous.as_ref()) {
                Some(c) if c.is_finite() && c >= 0.0 => c,
                _ => continue,
            };

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost
                >= known_costs
                    .get(&edge.to)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            // Push the new item into the queue
            seq += 1;
            came_from.insert(edge.to, (item.at, edge.attrs.clone()));
            known_costs.insert(edge.to, neighbor_cost);
            queue.push(FlatQueueItem {
                at: edge.to,
                cost: neighbor_cost,
                score: neighbor_cost + estimate(edge.to),
                seq,
            });
        }
    }

    log::debug!("no path {} -> {} after {} steps", from_id, to_id, steps);
    Err(SearchError::NoPath {
        from: from_id,
        to: to_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{BaseCost, StraightLine};
    use crate::geometry::Point;
    use crate::graph::{Edge, Graph, Node};
    use crate::model::RoadClass;
    use crate::CancelToken;
    use std::sync::Arc;

    fn attrs(street: i64, cost: f64, name: &str) -> EdgeAttrs {
        EdgeAttrs {
            street,
            cost: Some(cost),
            name: Some(Arc::from(name)),
            class: RoadClass::Residential,
        }
    }

    fn add_edge(g: &mut Graph, from: NodeId, to: NodeId, street: i64, cost: f64, name: &str) {
        g.set_edge(
            from,
            Edge {
                to,
                attrs: attrs(street, cost, name),
            },
        );
    }

    //  1 ──10── 2 ──10── 3
    //  │                 │
    //  └────5── 4 ──20───┘
    //  one-way 5 -> 1
    fn simple_graph() -> Graph {
        let mut g = Graph::new();
        for (id, x, y) in [
            (1, 0.0, 0.0),
            (2, 10.0, 0.0),
            (3, 20.0, 0.0),
            (4, 5.0, -5.0),
            (5, 0.0, 10.0),
        ] {
            g.set_node(Node {
                id,
                point: Point::new(x, y),
            });
        }

        for (a, b, street, cost, name) in [
            (1, 2, 12, 10.0, "Main"),
            (2, 3, 23, 10.0, "Main"),
            (1, 4, 14, 5.0, "Oak"),
            (4, 3, 43, 20.0, "Oak"),
        ] {
            add_edge(&mut g, a, b, street, cost, name);
            add_edge(&mut g, b, a, street, cost, name);
        }
        add_edge(&mut g, 5, 1, 51, 1.0, "Elm");
        g
    }

    #[test]
    fn shortest_path() {
        let g = simple_graph();
        let s = Session::new(&g);
        let p = find_path(&s, 1, 3, &BaseCost, None, &Limits::default()).unwrap();

        assert_eq!(p.nodes, vec![1, 2, 3]);
        assert_eq!(
            p.edges.iter().map(|e| e.street).collect::<Vec<_>>(),
            vec![12, 23]
        );
        assert_eq!(p.cost, 20.0);
    }

    #[test]
    fn shortest_path_with_heuristic() {
        let g = simple_graph();
        let s = Session::new(&g);
        let h = StraightLine { factor: 1.0 };
        let p = find_path(&s, 3, 4, &BaseCost, Some(&h), &Limits::default()).unwrap();
        assert_eq!(p.nodes, vec![3, 4]);
        assert_eq!(p.cost, 20.0);
    }

    #[test]
    fn same_node() {
        let g = simple_graph();
        let s = Session::new(&g);
        let p = find_path(&s, 2, 2, &BaseCost, None, &Limits::default()).unwrap();
        assert_eq!(p.nodes, vec![2]);
        assert!(p.edges.is_empty());
    }

    #[test]
    fn one_way_prevents_path() {
        let g = simple_graph();
        let s = Session::new(&g);
        assert_eq!(
            find_path(&s, 1, 5, &BaseCost, None, &Limits::default()),
            Err(SearchError::NoPath { from: 1, to: 5 })
        );
        assert!(find_path(&s, 5, 3, &BaseCost, None, &Limits::default()).is_ok());
    }

    #[test]
    fn invalid_reference() {
        let g = simple_graph();
        let s = Session::new(&g);
        assert_eq!(
            find_path(&s, 1, 42, &BaseCost, None, &Limits::default()),
            Err(SearchError::InvalidReference(42))
        );
        assert_eq!(
            find_path(&s, 42, 1, &BaseCost, None, &Limits::default()),
            Err(SearchError::InvalidReference(42))
        );
    }

    #[test]
    fn cost_function_sees_previous_edge() {
        struct AvoidTurns;

        impl CostFunction for AvoidTurns {
            fn cost(
                &self,
                _: NodeId,
                _: NodeId,
                edge: &EdgeAttrs,
                previous: Option<&EdgeAttrs>,
            ) -> Option<f64> {
                let turn = match previous {
                    Some(p) if p.name != edge.name => 100.0,
                    _ => 0.0,
                };
                Some(edge.cost? + turn)
            }
        }

        let mut g = simple_graph();
        // Cheaper, but requires switching from Main to Oak
        add_edge(&mut g, 2, 4, 24, 1.0, "Oak");

        let s = Session::new(&g);
        let p = find_path(&s, 2, 4, &AvoidTurns, None, &Limits::default()).unwrap();
        assert_eq!(p.nodes, vec![2, 4]);

        // Main -> Oak via 2 is cheaper by base cost, but the name change makes it pricey
        let p = find_path(&s, 3, 4, &BaseCost, None, &Limits::default()).unwrap();
        assert_eq!(p.nodes, vec![3, 2, 4]);
        let p = find_path(&s, 3, 4, &AvoidTurns, None, &Limits::default()).unwrap();
        assert_eq!(p.nodes, vec![3, 4]);
    }

    #[test]
    fn step_limit() {
        let g = simple_graph();
        let s = Session::new(&g);
        let limits = Limits {
            step_limit: 1,
            ..Limits::default()
        };
        assert_eq!(
            find_path(&s, 4, 2, &BaseCost, None, &limits),
            Err(SearchError::StepLimitExceeded)
        );
    }

    #[test]
    fn cancelled() {
        let g = simple_graph();
        let s = Session::new(&g);
        let cancel = CancelToken::new();
        cancel.cancel();
        let limits = Limits {
            cancel,
            ..Limits::default()
        };
        assert_eq!(
            find_path(&s, 1, 3, &BaseCost, None, &limits),
            Err(SearchError::Cancelled)
        );
    }

    #[test]
    fn deterministic_ties() {
        // Two equally expensive ways from 1 to 3
        let mut g = simple_graph();
        add_edge(&mut g, 1, 3, 13, 20.0, "Diagonal");

        let s = Session::new(&g);
        let first = find_path(&s, 1, 3, &BaseCost, None, &Limits::default()).unwrap();
        for _ in 0..10 {
            assert_eq!(
                find_path(&s, 1, 3, &BaseCost, None, &Limits::default()).unwrap(),
                first
            );
        }
    }
}
