// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Turns a path found by the search into turn-by-turn directions.

use std::collections::BTreeMap;

use crate::astar::Path;
use crate::geometry::{distance_along, Point, Polyline, Srid};
use crate::model::{NodeId, Street, StreetId, StreetName};
use crate::route::Distance;
use crate::router::RegionConfig;
use crate::store::{Storage, StorageError};

mod turn;

pub use turn::{classify_turn, turn_between, Heading, Turn};

/// A short, differently named street between two parts of the same street,
/// folded into the [Direction] covering them instead of getting its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Jog {
    /// Turn onto the jog street.
    pub turn: Turn,
    pub street: Option<StreetName>,
    pub distance: f64,
}

/// A single turn-by-turn instruction, covering one stretch of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    pub turn: Turn,

    /// Street followed during this stretch.
    pub street: Option<StreetName>,

    /// First differently named street at the end of this stretch.
    pub toward: Option<StreetName>,

    /// Length of the stretch, in meters.
    pub distance: f64,

    pub start: Point,

    /// Streets making up this stretch, in order of traversal.
    pub streets: Vec<StreetId>,

    pub jogs: Vec<Jog>,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preposition = match self.turn {
            Turn::Start(_) | Turn::Straight => "on",
            _ => "onto",
        };
        match &self.street {
            Some(name) => write!(f, "{} {} {}", self.turn, preposition, name)?,
            None => write!(f, "{} {} an unnamed street", self.turn, preposition)?,
        }
        if let Some(toward) = &self.toward {
            write!(f, " toward {}", toward)?;
        }
        write!(f, " ({})", Distance::from_meters(self.distance))
    }
}

/// Output of [synthesize].
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub directions: Vec<Direction>,
    pub geometry: Polyline,
    pub distance: Distance,
}

/// A single edge of the path, oriented in the direction of travel.
#[derive(Debug)]
struct Leg<'a> {
    street: &'a Street,
    to: NodeId,
    geometry: Polyline,
    length: f64,
    entry: f64,
    exit: f64,
}

impl<'a> Leg<'a> {
    fn new(street: &'a Street, from: NodeId, to: NodeId, srid: Srid) -> Self {
        let geometry = if street.start != from && street.end == from {
            street.geometry.reversed()
        } else {
            street.geometry.clone()
        };

        Self {
            street,
            to,
            length: distance_along(&geometry, srid),
            entry: geometry.start_bearing(),
            exit: geometry.end_bearing(),
            geometry,
        }
    }

    fn name(&self) -> Option<&StreetName> {
        self.street.name.as_ref()
    }
}

/// Retrieves all streets traversed by `path`, persisted ones with a single batch query.
fn resolve_streets<S: Storage + ?Sized>(
    store: &S,
    synthetic: &BTreeMap<StreetId, Street>,
    path: &Path,
) -> Result<Vec<Street>, StorageError> {
    let mut persisted_ids: Vec<StreetId> = path
        .edges
        .iter()
        .map(|e| e.street)
        .filter(|&id| id >= 0)
        .collect();
    persisted_ids.sort_unstable();
    persisted_ids.dedup();

    let persisted: BTreeMap<StreetId, Street> = store
        .get_streets(&persisted_ids)?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    path.edges
        .iter()
        .map(|e| {
            let found = if e.street >= 0 {
                persisted.get(&e.street)
            } else {
                synthetic.get(&e.street)
            };
            found
                .cloned()
                .ok_or_else(|| StorageError::InvalidData(format!("street {} not found", e.street)))
        })
        .collect()
}

/// Checks if leg `i` is a short connector between two legs of the same name.
fn is_jog(legs: &[Leg<'_>], i: usize, jog_length: f64) -> bool {
    if i == 0 || i + 1 >= legs.len() || legs[i].length >= jog_length {
        return false;
    }

    let (before, this, after) = (legs[i - 1].name(), legs[i].name(), legs[i + 1].name());
    this != before && this != after && before == after
}

/// Finds the name of the first street at `node` (other than `name`).
/// Synthetic nodes have no cross streets.
fn toward<S: Storage + ?Sized>(
    store: &S,
    node: NodeId,
    name: Option<&StreetName>,
) -> Result<Option<StreetName>, StorageError> {
    if node < 0 {
        return Ok(None);
    }

    let streets = match store.get_intersection(node)? {
        Some((_, streets)) => streets,
        None => return Ok(None),
    };

    Ok(streets
        .into_iter()
        .filter_map(|s| s.name)
        .find(|n| Some(n) != name))
}

/// Converts a path into [Directions](Direction), the route geometry and its length.
///
/// Consecutive edges of the same street name are grouped into a single direction.
/// A short street (below [RegionConfig::jog_length]) between two edges of the same
/// name is recorded as a [Jog] of the surrounding direction.
///
/// `synthetic` must contain all streets with negative ids referenced by the path,
/// usually [crate::Annex::streets]. The path must contain at least one edge.
pub fn synthesize<S: Storage + ?Sized>(
    store: &S,
    synthetic: &BTreeMap<StreetId, Street>,
    path: &Path,
    region: &RegionConfig,
) -> Result<Itinerary, StorageError> {
    let streets = resolve_streets(store, synthetic, path)?;
    let legs: Vec<Leg<'_>> = streets
        .iter()
        .enumerate()
        .map(|(i, street)| Leg::new(street, path.nodes[i], path.nodes[i + 1], store.srid()))
        .collect();

    let geometry = Polyline::join(legs.iter().map(|l| &l.geometry))
        .ok_or_else(|| StorageError::InvalidData("path without edges".to_string()))?;
    let distance = Distance::from_meters(legs.iter().map(|l| l.length).sum());

    // Group legs into stretches, remembering the node at which each stretch ends
    let mut directions: Vec<(Direction, NodeId)> = Vec::new();
    for (i, leg) in legs.iter().enumerate() {
        let jog = is_jog(&legs, i, region.jog_length);

        match directions.last_mut() {
            Some((direction, end)) if jog || direction.street.as_ref() == leg.name() => {
                direction.distance += leg.length;
                direction.streets.push(leg.street.id);
                if jog {
                    direction.jogs.push(Jog {
                        turn: turn_between(legs[i - 1].exit, leg.entry),
                        street: leg.name().cloned(),
                        distance: leg.length,
                    });
                }
                *end = leg.to;
            }

            _ => {
                let turn = match i {
                    0 => Turn::Start(Heading::from_bearing(leg.entry)),
                    _ => turn_between(legs[i - 1].exit, leg.entry),
                };

                directions.push((
                    Direction {
                        turn,
                        street: leg.name().cloned(),
                        toward: None,
                        distance: leg.length,
                        start: leg.geometry.first(),
                        streets: vec![leg.street.id],
                        jogs: Vec::new(),
                    },
                    leg.to,
                ));
            }
        }
    }

    let directions = directions
        .into_iter()
        .map(|(mut direction, end)| {
            direction.toward = toward(store, end, direction.street.as_ref())?;
            Ok(direction)
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    log::debug!(
        "synthesized {} directions from {} edges, {:.1} m",
        directions.len(),
        legs.len(),
        distance.meters,
    );

    Ok(Itinerary {
        directions,
        geometry,
        distance,
    })
}
