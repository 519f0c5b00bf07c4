// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Lets routes start and end in the middle of a street.

use crate::astar::Path;
use crate::geometry::{Point, Polyline, EPSILON};
use crate::graph::{Edge, EdgeAttrs, Node};
use crate::model::{LocatedObject, LocatedResult, NodeId, Street, StreetId};
use crate::session::Session;

/// Outcome of [split_street]: a synthetic node and two streets
/// replacing the original one.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub node: Node,

    /// Part of the street from its start to the new node.
    pub first: Street,

    /// Part of the street from the new node to its end.
    pub second: Street,
}

/// Scales the cost of `street` by the share of its length covered by `part`.
/// Impassable streets stay impassable.
fn scaled_cost(street: &Street, part: &Polyline) -> Option<f64> {
    let total = street.geometry.length();
    street.cost.map(|cost| {
        if total > 0.0 {
            cost * part.length() / total
        } else {
            cost * 0.5
        }
    })
}

/// Splits a street at the position nearest to `point`.
///
/// Nothing is added to any graph, see [attach] for that. The identifiers
/// for the new node and streets must be provided by the caller.
pub fn split_street(
    street: &Street,
    point: Point,
    node_id: NodeId,
    first_id: StreetId,
    second_id: StreetId,
) -> Split {
    let (first_geometry, second_geometry) = street.geometry.split(point);
    let first_cost = scaled_cost(street, &first_geometry);
    let second_cost = scaled_cost(street, &second_geometry);

    let node = Node {
        id: node_id,
        point: first_geometry.last(),
    };

    let first = Street {
        id: first_id,
        end: node_id,
        geometry: first_geometry,
        cost: first_cost,
        ..street.clone()
    };

    let second = Street {
        id: second_id,
        start: node_id,
        geometry: second_geometry,
        cost: second_cost,
        ..street.clone()
    };

    Split {
        node,
        first,
        second,
    }
}

/// Adds a [Split] of `street` to the session.
///
/// Edges for the new streets are only added in the directions allowed by `street`,
/// and the edges of `street` itself are hidden, so that the search has to go
/// through the new node.
fn graft(session: &mut Session<'_>, original: StreetId, street: &Street, split: Split) {
    let Split {
        node,
        first,
        second,
    } = split;

    session.add_temporary_node(node);

    if street.id >= 0 {
        session.suppress_edge(street.start, street.end, street.id);
        session.suppress_edge(street.end, street.start, street.id);
    } else {
        session.remove_temporary_edge(street.start, street.end);
        session.remove_temporary_edge(street.end, street.start);
    }

    let first_attrs = EdgeAttrs::for_street(&first, first.cost);
    let second_attrs = EdgeAttrs::for_street(&second, second.cost);
    let (forward, backward) = street.direction();

    if forward {
        session.add_temporary_edge(
            first.start,
            Edge {
                to: node.id,
                attrs: first_attrs.clone(),
            },
        );
        session.add_temporary_edge(
            node.id,
            Edge {
                to: second.end,
                attrs: second_attrs.clone(),
            },
        );
    }

    if backward {
        session.add_temporary_edge(
            node.id,
            Edge {
                to: first.start,
                attrs: first_attrs,
            },
        );
        session.add_temporary_edge(
            second.end,
            Edge {
                to: node.id,
                attrs: second_attrs,
            },
        );
    }

    session.replace_piece(original, street.id, [first.id, second.id]);
    session.add_street(first);
    session.add_street(second);
}

/// Finds the node from which routes to or from `located` should be searched.
///
/// Intersections are used directly. Points on a street get a synthetic node,
/// unless they lie at one of the street's ends. If the street was already split in
/// this session, the piece nearest to the point is split again.
pub fn attach(session: &mut Session<'_>, located: &LocatedResult) -> NodeId {
    let street = match located.object {
        LocatedObject::Intersection(ref i) => return i.id,
        LocatedObject::Street(ref street) => street,
    };

    let piece = session
        .pieces(street.id)
        .and_then(|pieces| {
            pieces
                .iter()
                .filter_map(|id| session.get_street(*id))
                .map(|s| (s.geometry.distance_to(located.point), s))
                .min_by(|(a, _), (b, _)| a.total_cmp(b))
                .map(|(_, s)| s.clone())
        })
        .unwrap_or_else(|| street.clone());

    let along = piece.geometry.locate(located.point);
    if along <= EPSILON {
        return piece.start;
    } else if along >= piece.geometry.length() - EPSILON {
        return piece.end;
    }

    let node_id = session.next_node_id();
    let first_id = session.next_street_id();
    let second_id = session.next_street_id();
    let split = split_street(&piece, located.point, node_id, first_id, second_id);

    log::debug!(
        "split street {} (piece {}) at {} into {} and {}",
        street.id,
        piece.id,
        split.node.point,
        first_id,
        second_id,
    );

    graft(session, street.id, &piece, split);
    node_id
}

/// Handles routes which start and end on the same street, if the street may be
/// ridden from `from` to `to`.
///
/// Returns a single-edge [Path] over a synthetic street covering only the part
/// between both points (which is added to the session), or `None` if the one-way
/// rules require a detour. Impassable streets are never trimmed.
pub fn trim_street(session: &mut Session<'_>, street: &Street, from: Point, to: Point) -> Option<Path> {
    let from_along = street.geometry.locate(from);
    let to_along = street.geometry.locate(to);

    let (forward, backward) = street.direction();
    let allowed = if from_along <= to_along {
        forward
    } else {
        backward
    };
    if !allowed {
        return None;
    }

    let geometry = street.geometry.slice(from_along, to_along);
    let cost = scaled_cost(street, &geometry)?;

    let start = Node {
        id: session.next_node_id(),
        point: geometry.first(),
    };
    let end = Node {
        id: session.next_node_id(),
        point: geometry.last(),
    };

    let trimmed = Street {
        id: session.next_street_id(),
        start: start.id,
        end: end.id,
        geometry,
        cost: Some(cost),
        ..street.clone()
    };
    let attrs = EdgeAttrs::for_street(&trimmed, trimmed.cost);

    log::debug!(
        "both ends on street {}, using trimmed street {}",
        street.id,
        trimmed.id
    );

    session.add_temporary_node(start);
    session.add_temporary_node(end);
    session.add_street(trimmed);

    Some(Path {
        nodes: vec![start.id, end.id],
        edges: vec![attrs],
        cost,
    })
}
