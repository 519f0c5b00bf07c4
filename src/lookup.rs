// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::{project, GeometryError, Point, Srid};
use crate::model::{Intersection, LocatedObject, LocatedResult, NodeId, StreetName};
use crate::store::{Storage, StorageError};

/// Outcome of resolving a waypoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(LocatedResult),
    NotFound,

    /// Several equally plausible places match the input.
    Ambiguous(Vec<LocatedResult>),
}

/// Turns user-provided waypoint strings into places on the street network.
pub trait Geocoder: Send + Sync {
    fn resolve(&self, input: &str) -> Result<Resolution, StorageError>;
}

/// [Geocoder] answering queries with a [Storage] backend.
///
/// Understands three forms of input:
/// - coordinates, `x,y` in the input reference system,
/// - intersection identifiers, `#42`,
/// - cross streets, `Main St & Oak Ave` (also written with `and` or `at`).
#[derive(Debug)]
pub struct StoreGeocoder<'a, S: Storage + ?Sized> {
    store: &'a S,
    input_srid: Srid,
}

impl<'a, S: Storage + ?Sized> StoreGeocoder<'a, S> {
    /// Creates a geocoder reading coordinates in the reference system of the store.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            input_srid: store.srid(),
        }
    }

    /// Creates a geocoder reading coordinates in `input_srid`, failing if they
    /// can't be converted into the reference system of the store.
    pub fn with_input_srid(store: &'a S, input_srid: Srid) -> Result<Self, GeometryError> {
        project(Point::new(0.0, 0.0), input_srid, store.srid())?;
        Ok(Self { store, input_srid })
    }

    /// Describes an intersection by the distinct names of its streets.
    fn intersection_name(&self, id: NodeId) -> Result<String, StorageError> {
        let mut names: Vec<StreetName> = Vec::new();
        if let Some((_, streets)) = self.store.get_intersection(id)? {
            for name in streets.into_iter().filter_map(|s| s.name) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        if names.is_empty() {
            Ok(format!("#{}", id))
        } else {
            Ok(names
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" & "))
        }
    }

    fn at_intersection(&self, i: Intersection) -> Result<LocatedResult, StorageError> {
        Ok(LocatedResult::from_intersection(self.intersection_name(i.id)?, i))
    }

    fn by_coordinates(&self, point: Point) -> Result<Resolution, StorageError> {
        let point = project(point, self.input_srid, self.store.srid())
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        match self.store.nearest(point)? {
            Some((LocatedObject::Intersection(i), _)) => Ok(Resolution::Found(self.at_intersection(i)?)),
            Some((LocatedObject::Street(street), _)) => {
                let name = match street.name {
                    Some(ref n) => n.to_string(),
                    None => format!("{}, {}", point.x, point.y),
                };
                Ok(Resolution::Found(LocatedResult::on_street(name, street, point)))
            }
            None => Ok(Resolution::NotFound),
        }
    }

    fn by_id(&self, id: NodeId) -> Result<Resolution, StorageError> {
        match self.store.get_intersection(id)? {
            Some((i, _)) => Ok(Resolution::Found(self.at_intersection(i)?)),
            None => Ok(Resolution::NotFound),
        }
    }

    fn by_cross_streets(&self, a: &str, b: &str) -> Result<Resolution, StorageError> {
        let mut found = self
            .store
            .intersections_named(a, b)?
            .into_iter()
            .map(|i| self.at_intersection(i))
            .collect::<Result<Vec<_>, _>>()?;

        match found.len() {
            0 => Ok(Resolution::NotFound),
            1 => Ok(Resolution::Found(found.remove(0))),
            _ => Ok(Resolution::Ambiguous(found)),
        }
    }
}

/// Parses `x,y` into a point.
fn parse_coordinates(input: &str) -> Option<Point> {
    let (x, y) = input.split_once(',')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;
    if x.is_finite() && y.is_finite() {
        Some(Point::new(x, y))
    } else {
        None
    }
}

/// Splits `A & B`, `A and B` or `A at B` into both street names.
fn split_cross_streets(input: &str) -> Option<(&str, &str)> {
    let lower = input.to_ascii_lowercase();
    for separator in ["&", " and ", " at "] {
        if let Some(idx) = lower.find(separator) {
            let a = input[..idx].trim();
            let b = input[idx + separator.len()..].trim();
            if !a.is_empty() && !b.is_empty() {
                return Some((a, b));
            }
        }
    }
    None
}

impl<'a, S: Storage + ?Sized> Geocoder for StoreGeocoder<'a, S> {
    fn resolve(&self, input: &str) -> Result<Resolution, StorageError> {
        let input = input.trim();

        if let Some(point) = parse_coordinates(input) {
            return self.by_coordinates(point);
        }

        if let Some(id) = input.strip_prefix('#').and_then(|i| i.trim().parse().ok()) {
            return self.by_id(id);
        }

        if let Some((a, b)) = split_cross_streets(input) {
            return self.by_cross_streets(a, b);
        }

        log::debug!("unrecognized waypoint: {:?}", input);
        Ok(Resolution::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{intersections, jog_store, line_store, street};

    #[test]
    fn parse() {
        assert_eq!(parse_coordinates("1.5, -2"), Some(Point::new(1.5, -2.0)));
        assert_eq!(parse_coordinates("1.5"), None);
        assert_eq!(parse_coordinates("Main, Oak"), None);

        assert_eq!(split_cross_streets("Main St & Oak Ave"), Some(("Main St", "Oak Ave")));
        assert_eq!(split_cross_streets("main AND oak"), Some(("main", "oak")));
        assert_eq!(split_cross_streets("Main at Oak"), Some(("Main", "Oak")));
        assert_eq!(split_cross_streets("Atlantic Ave"), None);
        assert_eq!(split_cross_streets("& Oak"), None);
    }

    #[test]
    fn resolve_coordinates() {
        let store = line_store();
        let g = StoreGeocoder::new(&store);

        match g.resolve("3,0.5").unwrap() {
            Resolution::Found(r) => {
                assert_eq!(r.name, "Main");
                assert!(r.point.almost_eq(&Point::new(3.0, 0.0)));
                assert!(matches!(r.object, LocatedObject::Street(ref s) if s.id == 12));
            }
            r => panic!("unexpected resolution: {:?}", r),
        }

        match g.resolve("10.2, 0.1").unwrap() {
            Resolution::Found(r) => {
                assert_eq!(r.name, "Main");
                assert!(matches!(r.object, LocatedObject::Intersection(Intersection { id: 2, .. })));
            }
            r => panic!("unexpected resolution: {:?}", r),
        }
    }

    #[test]
    fn resolve_id() {
        let store = jog_store();
        let g = StoreGeocoder::new(&store);

        match g.resolve("#2").unwrap() {
            Resolution::Found(r) => assert_eq!(r.name, "A & B & Oak"),
            r => panic!("unexpected resolution: {:?}", r),
        }
        assert_eq!(g.resolve("#99").unwrap(), Resolution::NotFound);
    }

    #[test]
    fn resolve_cross_streets() {
        let store = jog_store();
        let g = StoreGeocoder::new(&store);

        match g.resolve("oak and a").unwrap() {
            Resolution::Found(r) => assert_eq!(r.point, Point::new(100.0, 0.0)),
            r => panic!("unexpected resolution: {:?}", r),
        }

        // "A" meets "B" at both 2 and 3
        match g.resolve("A & B").unwrap() {
            Resolution::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            r => panic!("unexpected resolution: {:?}", r),
        }

        assert_eq!(g.resolve("Oak at Elm").unwrap(), Resolution::NotFound);
        assert_eq!(g.resolve("somewhere").unwrap(), Resolution::NotFound);
    }

    #[test]
    fn input_srid() {
        let i = intersections(&[(1, 0.0, 0.0), (2, 1000.0, 0.0)]);
        let s = street(12, &i[0], &i[1], "Main");
        let store = MemoryStore::new(Srid::WebMercator, i, vec![s]);

        let g = StoreGeocoder::with_input_srid(&store, Srid::Wgs84).unwrap();
        match g.resolve("0.0045, 0").unwrap() {
            Resolution::Found(r) => {
                assert!(matches!(r.object, LocatedObject::Street(_)));
                assert!((r.point.x - 500.9).abs() < 1.0);
            }
            r => panic!("unexpected resolution: {:?}", r),
        }

        let cartesian = line_store();
        assert!(StoreGeocoder::with_input_srid(&cartesian, Srid::Wgs84).is_err());
    }
}
