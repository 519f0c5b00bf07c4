// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::{Point, Polyline};

/// Identifier of an [Intersection].
///
/// Persisted intersections have non-negative identifiers. Negative identifiers
/// are reserved for synthetic intersections created during a single query.
pub type NodeId = i64;

/// Identifier of a [Street]. As with [NodeId], negative values are
/// reserved for synthetic streets.
pub type StreetId = i64;

/// Represents a node of the street network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub id: NodeId,
    pub point: Point,
}

/// Road classification of a [Street], in a rough order of importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Unclassified,
    Cycleway,
    Path,
}

impl RoadClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Motorway => "motorway",
            Self::Trunk => "trunk",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Residential => "residential",
            Self::Service => "service",
            Self::Unclassified => "unclassified",
            Self::Cycleway => "cycleway",
            Self::Path => "path",
        }
    }
}

impl std::str::FromStr for RoadClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motorway" => Ok(Self::Motorway),
            "trunk" => Ok(Self::Trunk),
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "tertiary" => Ok(Self::Tertiary),
            "residential" => Ok(Self::Residential),
            "service" => Ok(Self::Service),
            "unclassified" => Ok(Self::Unclassified),
            "cycleway" => Ok(Self::Cycleway),
            "path" | "footway" | "track" => Ok(Self::Path),
            _ => Err(()),
        }
    }
}

/// One-way restriction of a [Street], relative to the direction of its geometry
/// (from [Street::start] to [Street::end]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Oneway {
    /// Traversable in both directions.
    #[default]
    No,

    /// Only traversable from start to end.
    Forward,

    /// Only traversable from end to start.
    Backward,
}

impl std::str::FromStr for Oneway {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" | "true" | "1" | "forward" => Ok(Self::Forward),
            "-1" | "reverse" | "backward" => Ok(Self::Backward),
            "no" | "false" | "0" | "" => Ok(Self::No),
            _ => Err(()),
        }
    }
}

/// Display name of a [Street], e.g. "Main" + "St".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreetName {
    pub name: String,

    /// Street type suffix, like "St" or "Ave".
    pub kind: Option<String>,
}

impl StreetName {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }

    pub fn with_kind<N: Into<String>, K: Into<String>>(name: N, kind: K) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
        }
    }

    /// Case-insensitively compares a user-provided string against this name,
    /// both with and without the street type.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.eq_ignore_ascii_case(&self.name) || query.eq_ignore_ascii_case(&self.to_string())
    }
}

impl std::fmt::Display for StreetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Some(ref kind) => write!(f, "{} {}", self.name, kind),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Represents a stretch of road between two [Intersections](Intersection).
#[derive(Debug, Clone, PartialEq)]
pub struct Street {
    pub id: StreetId,
    pub start: NodeId,
    pub end: NodeId,

    /// Geometry running from the `start` to the `end` intersection.
    pub geometry: Polyline,

    pub name: Option<StreetName>,
    pub class: RoadClass,

    /// General one-way restriction.
    pub oneway: Oneway,

    /// Bicycle-specific one-way restriction, overriding [Street::oneway] if present.
    pub bike_oneway: Option<Oneway>,

    /// Cost of traversing the whole street, before any cost function is applied.
    /// `None` marks an impassable street.
    pub cost: Option<f64>,
}

impl Street {
    /// Checks if the street is traversable forward (first return value) and
    /// backwards (second return value) by a bicycle.
    pub fn direction(&self) -> (bool, bool) {
        match self.bike_oneway.unwrap_or(self.oneway) {
            Oneway::No => (true, true),
            Oneway::Forward => (true, false),
            Oneway::Backward => (false, true),
        }
    }

    /// Returns the other end of the street, or `None` if `node` is not an endpoint.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}

/// The network entity nearest to a resolved waypoint.
#[derive(Debug, Clone, PartialEq)]
pub enum LocatedObject {
    Intersection(Intersection),
    Street(Street),
}

/// Outcome of resolving user input into a place on the street network.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedResult {
    /// Normalized, human-readable name of the place.
    pub name: String,

    /// Exact point used for distances and geometries.
    pub point: Point,

    pub object: LocatedObject,
}

impl LocatedResult {
    pub fn from_intersection<N: Into<String>>(name: N, intersection: Intersection) -> Self {
        Self {
            name: name.into(),
            point: intersection.point,
            object: LocatedObject::Intersection(intersection),
        }
    }

    /// Creates a result placed on the street at the position nearest to `point`.
    pub fn on_street<N: Into<String>>(name: N, street: Street, point: Point) -> Self {
        let along = street.geometry.locate(point);
        Self {
            name: name.into(),
            point: street.geometry.interpolate(along),
            object: LocatedObject::Street(street),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_name_display_and_match() {
        let n = StreetName::with_kind("Main", "St");
        assert_eq!(n.to_string(), "Main St");
        assert!(n.matches("main"));
        assert!(n.matches(" MAIN st "));
        assert!(!n.matches("Main Ave"));
        assert_eq!(StreetName::new("Broadway").to_string(), "Broadway");
    }

    #[test]
    fn bicycle_oneway_overrides_general() {
        let mut s = Street {
            id: 1,
            start: 1,
            end: 2,
            geometry: Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).unwrap(),
            name: None,
            class: RoadClass::Residential,
            oneway: Oneway::Forward,
            bike_oneway: None,
            cost: Some(1.0),
        };
        assert_eq!(s.direction(), (true, false));

        s.bike_oneway = Some(Oneway::No);
        assert_eq!(s.direction(), (true, true));

        s.bike_oneway = Some(Oneway::Backward);
        assert_eq!(s.direction(), (false, true));
    }

    #[test]
    fn parse_oneway() {
        assert_eq!("yes".parse(), Ok(Oneway::Forward));
        assert_eq!("-1".parse(), Ok(Oneway::Backward));
        assert_eq!("no".parse(), Ok(Oneway::No));
        assert_eq!("maybe".parse::<Oneway>(), Err(()));
    }
}
