// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::directions::Direction;
use crate::geometry::Polyline;
use crate::model::LocatedResult;

const METERS_PER_MILE: f64 = 1609.344;
const METERS_PER_FOOT: f64 = 0.3048;

/// Length of a route, in multiple units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Distance {
    pub meters: f64,
    pub kilometers: f64,
    pub miles: f64,
    pub feet: f64,
}

impl Distance {
    pub fn from_meters(meters: f64) -> Self {
        Self {
            meters,
            kilometers: meters / 1000.0,
            miles: meters / METERS_PER_MILE,
            feet: meters / METERS_PER_FOOT,
        }
    }
}

impl std::ops::Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_meters(self.meters + rhs.meters)
    }
}

impl std::iter::Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, d| acc + d)
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.meters < 1000.0 {
            write!(f, "{:.0} m", self.meters)
        } else {
            write!(f, "{:.2} km", self.kilometers)
        }
    }
}

/// A planned trip between two waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub start: LocatedResult,
    pub end: LocatedResult,

    /// Turn-by-turn directions, empty if the start and end are at the same point.
    pub directions: Vec<Direction>,

    /// Geometry of the whole route, from the start to the end point.
    pub geometry: Polyline,

    pub distance: Distance,
}
