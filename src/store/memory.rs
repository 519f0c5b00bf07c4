// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use super::xml::Record;
use super::{Storage, StorageError};
use crate::geometry::{Point, Srid};
use crate::kd::KDTree;
use crate::model::{Intersection, LocatedObject, NodeId, Street, StreetId};

/// Default distance under which [MemoryStore::nearest] prefers an intersection
/// over a point in the middle of a street.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 1.0;

/// [Storage] keeping the whole street network in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    srid: Srid,
    snap_tolerance: f64,
    intersections: BTreeMap<NodeId, Intersection>,
    streets: BTreeMap<StreetId, Street>,
    incident: BTreeMap<NodeId, BTreeSet<StreetId>>,
    kd: Option<KDTree>,
}

impl MemoryStore {
    pub fn new<I, S>(srid: Srid, intersections: I, streets: S) -> Self
    where
        I: IntoIterator<Item = Intersection>,
        S: IntoIterator<Item = Street>,
    {
        let intersections: BTreeMap<NodeId, Intersection> =
            intersections.into_iter().map(|i| (i.id, i)).collect();
        let streets: BTreeMap<StreetId, Street> = streets.into_iter().map(|s| (s.id, s)).collect();

        let mut incident: BTreeMap<NodeId, BTreeSet<StreetId>> = BTreeMap::default();
        for street in streets.values() {
            for node in [street.start, street.end] {
                if intersections.contains_key(&node) {
                    incident.entry(node).or_default().insert(street.id);
                }
            }
        }

        let kd = KDTree::from_iter(intersections.values().copied());

        Self {
            srid,
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            intersections,
            streets,
            incident,
            kd,
        }
    }

    /// Sets the distance under which [Storage::nearest] resolves to an intersection,
    /// even if a street passes closer.
    pub fn with_snap_tolerance(mut self, snap_tolerance: f64) -> Self {
        self.set_snap_tolerance(snap_tolerance);
        self
    }

    pub(super) fn from_records<I>(records: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = Result<Record, quick_xml::Error>>,
    {
        let mut srid: Option<Srid> = None;
        let mut intersections = Vec::new();
        let mut streets = Vec::new();

        for record in records {
            match record? {
                Record::Network(s) => match srid {
                    Some(existing) if existing != s => {
                        return Err(StorageError::InvalidData(format!(
                            "conflicting network srids: {} and {}",
                            existing, s
                        )));
                    }
                    _ => srid = Some(s),
                },
                Record::Intersection(i) => intersections.push(i),
                Record::Street(s) => streets.push(s),
            }
        }

        log::info!(
            "loaded {} intersections and {} streets",
            intersections.len(),
            streets.len()
        );
        Ok(Self::new(srid.unwrap_or_default(), intersections, streets))
    }

    fn incident_streets(&self, id: NodeId) -> impl Iterator<Item = &Street> {
        self.incident
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|sid| self.streets.get(sid))
    }

    fn nearest_street(&self, point: Point) -> Option<(&Street, f64)> {
        self.streets
            .values()
            .filter(|s| s.cost.is_some())
            .map(|s| (s, s.geometry.distance_to(point)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
    }
}

impl Storage for MemoryStore {
    fn srid(&self) -> Srid {
        self.srid
    }

    fn set_snap_tolerance(&mut self, snap_tolerance: f64) {
        self.snap_tolerance = snap_tolerance;
    }

    fn get_street(&self, id: StreetId) -> Result<Option<Street>, StorageError> {
        Ok(self.streets.get(&id).cloned())
    }

    fn get_streets(&self, ids: &[StreetId]) -> Result<Vec<Street>, StorageError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.streets.get(id))
            .cloned()
            .collect())
    }

    fn get_intersection(&self, id: NodeId) -> Result<Option<(Intersection, Vec<Street>)>, StorageError> {
        Ok(self
            .intersections
            .get(&id)
            .map(|&i| (i, self.incident_streets(id).cloned().collect())))
    }

    fn nearest(&self, point: Point) -> Result<Option<(LocatedObject, f64)>, StorageError> {
        let intersection = self.kd.as_ref().map(|kd| kd.find_nearest(point));
        let street = self.nearest_street(point);

        let found = match (intersection, street) {
            (Some((i, i_dist)), Some((_, s_dist))) if i_dist <= self.snap_tolerance || i_dist <= s_dist => {
                Some((LocatedObject::Intersection(i), i_dist))
            }
            (Some((i, i_dist)), None) => Some((LocatedObject::Intersection(i), i_dist)),
            (_, Some((s, s_dist))) => Some((LocatedObject::Street(s.clone()), s_dist)),
            (None, None) => None,
        };
        Ok(found)
    }

    fn intersections_named(&self, a: &str, b: &str) -> Result<Vec<Intersection>, StorageError> {
        let is_crossing = |id: NodeId| {
            self.incident_streets(id).any(|first| {
                self.incident_streets(id).any(|second| {
                    match (&first.name, &second.name) {
                        (Some(n1), Some(n2)) => n1 != n2 && n1.matches(a) && n2.matches(b),
                        _ => false,
                    }
                })
            })
        };

        Ok(self
            .intersections
            .values()
            .filter(|i| is_crossing(i.id))
            .copied()
            .collect())
    }

    fn intersections(&self) -> Result<Vec<Intersection>, StorageError> {
        Ok(self.intersections.values().copied().collect())
    }

    fn streets(&self) -> Result<Vec<Street>, StorageError> {
        Ok(self.streets.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polyline;
    use crate::model::{Oneway, RoadClass, StreetName};

    //    3
    //    │ Oak Ave
    // 1──2──4  Main St
    //    │ Oak Ave
    //    5
    fn store() -> MemoryStore {
        let intersections = [
            (1, 0.0, 0.0),
            (2, 10.0, 0.0),
            (3, 10.0, 10.0),
            (4, 20.0, 0.0),
            (5, 10.0, -10.0),
        ]
        .map(|(id, x, y)| Intersection {
            id,
            point: Point::new(x, y),
        });

        let street = |id: StreetId, a: &Intersection, b: &Intersection, name: StreetName, cost: Option<f64>| Street {
            id,
            start: a.id,
            end: b.id,
            geometry: Polyline::new(vec![a.point, b.point]).unwrap(),
            name: Some(name),
            class: RoadClass::Residential,
            oneway: Oneway::No,
            bike_oneway: None,
            cost,
        };

        let [i1, i2, i3, i4, i5] = intersections;
        let main = StreetName::with_kind("Main", "St");
        let oak = StreetName::with_kind("Oak", "Ave");
        let streets = [
            street(24, &i2, &i4, main.clone(), Some(10.0)),
            street(12, &i1, &i2, main, Some(10.0)),
            street(23, &i2, &i3, oak.clone(), Some(10.0)),
            street(52, &i5, &i2, oak, None),
        ];

        MemoryStore::new(Srid::Cartesian, intersections, streets)
    }

    #[test]
    fn get_intersection_with_streets() {
        let s = store();
        let (i, streets) = s.get_intersection(2).unwrap().unwrap();
        assert_eq!(i.point, Point::new(10.0, 0.0));
        assert_eq!(
            streets.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![12, 23, 24, 52]
        );
        assert!(s.get_intersection(99).unwrap().is_none());
    }

    #[test]
    fn get_streets_skips_unknown() {
        let s = store();
        let streets = s.get_streets(&[23, 99, 12]).unwrap();
        assert_eq!(streets.iter().map(|s| s.id).collect::<Vec<_>>(), vec![23, 12]);
    }

    #[test]
    fn nearest() {
        let s = store();

        match s.nearest(Point::new(4.0, 2.0)).unwrap() {
            Some((LocatedObject::Street(street), dist)) => {
                assert_eq!(street.id, 12);
                assert_eq!(dist, 2.0);
            }
            other => panic!("expected a street, got {:?}", other),
        }

        match s.nearest(Point::new(10.5, 0.5)).unwrap() {
            Some((LocatedObject::Intersection(i), _)) => assert_eq!(i.id, 2),
            other => panic!("expected an intersection, got {:?}", other),
        }

        // Impassable streets are never returned
        match s.nearest(Point::new(9.0, -7.0)).unwrap() {
            Some((LocatedObject::Intersection(i), _)) => assert_eq!(i.id, 5),
            other => panic!("expected an intersection, got {:?}", other),
        }

        let empty = MemoryStore::new(Srid::Cartesian, Vec::new(), Vec::new());
        assert!(empty.nearest(Point::new(0.0, 0.0)).unwrap().is_none());
    }

    #[test]
    fn intersections_named() {
        let s = store();
        let found = s.intersections_named("oak", "Main St").unwrap();
        assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2]);

        assert!(s.intersections_named("Main", "Main").unwrap().is_empty());
        assert!(s.intersections_named("Elm", "Main").unwrap().is_empty());
    }
}
