// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Small street networks shared by unit tests.

use crate::geometry::{Point, Polyline, Srid};
use crate::model::{Intersection, NodeId, Oneway, RoadClass, Street, StreetId, StreetName};
use crate::store::MemoryStore;

pub fn intersections(coords: &[(NodeId, f64, f64)]) -> Vec<Intersection> {
    coords
        .iter()
        .map(|&(id, x, y)| Intersection {
            id,
            point: Point::new(x, y),
        })
        .collect()
}

/// Creates a straight two-way residential street between two intersections,
/// with the cost equal to its length.
pub fn street(id: StreetId, start: &Intersection, end: &Intersection, name: &str) -> Street {
    Street {
        id,
        start: start.id,
        end: end.id,
        geometry: Polyline::new(vec![start.point, end.point]).unwrap(),
        name: Some(StreetName::new(name)),
        class: RoadClass::Residential,
        oneway: Oneway::No,
        bike_oneway: None,
        cost: Some(start.point.distance(&end.point)),
    }
}

/// ```text
/// 1 ──Main── 2 ──Main── 3
/// ```
/// with both streets 10 units long.
pub fn line_store() -> MemoryStore {
    let i = intersections(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 20.0, 0.0)]);
    let streets = vec![street(12, &i[0], &i[1], "Main"), street(23, &i[1], &i[2], "Main")];
    MemoryStore::new(Srid::Cartesian, i, streets)
}

/// ```text
///          6
///          │ Oak
/// 1────────2─3────────4───5
///      A    B     A     Elm
/// ```
/// "B" is 5 units long, street 12 is stored from 4 to 3.
pub fn jog_store() -> MemoryStore {
    let i = intersections(&[
        (1, 0.0, 0.0),
        (2, 100.0, 0.0),
        (3, 105.0, 0.0),
        (4, 205.0, 0.0),
        (5, 255.0, 0.0),
        (6, 100.0, 50.0),
    ]);
    let streets = vec![
        street(10, &i[0], &i[1], "A"),
        street(11, &i[1], &i[2], "B"),
        street(12, &i[3], &i[2], "A"),
        street(13, &i[3], &i[4], "Elm"),
        street(14, &i[1], &i[5], "Oak"),
    ];
    MemoryStore::new(Srid::Cartesian, i, streets)
}

/// Two components: `1 ── 2` and `3 ── 4`.
pub fn disconnected_store() -> MemoryStore {
    let i = intersections(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 0.0, 50.0), (4, 10.0, 50.0)]);
    let streets = vec![street(12, &i[0], &i[1], "Main"), street(34, &i[2], &i[3], "High")];
    MemoryStore::new(Srid::Cartesian, i, streets)
}

/// A one-way loop `1 -> 2 -> 3 -> 1`:
///
/// ```text
///      3
///     / \
///   West East
///   /     \
///  1─Base──2
/// ```
pub fn one_way_triangle_store() -> MemoryStore {
    let i = intersections(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 5.0, 8.0)]);
    let mut streets = vec![
        street(12, &i[0], &i[1], "Base"),
        street(23, &i[1], &i[2], "East"),
        street(31, &i[2], &i[0], "West"),
    ];
    for s in streets.iter_mut() {
        s.oneway = Oneway::Forward;
    }
    MemoryStore::new(Srid::Cartesian, i, streets)
}
