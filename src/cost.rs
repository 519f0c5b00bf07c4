// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::Point;
use crate::graph::EdgeAttrs;
use crate::model::{NodeId, RoadClass};

/// Computes the cost of traversing a single edge during path search.
///
/// `previous` is the edge used to arrive at `from`, or `None` on the first step
/// of a path. Returning `None` prevents the edge from being used.
pub trait CostFunction: Send + Sync {
    fn cost(
        &self,
        from: NodeId,
        to: NodeId,
        edge: &EdgeAttrs,
        previous: Option<&EdgeAttrs>,
    ) -> Option<f64>;
}

/// Estimates the remaining cost between two positions for A*.
///
/// To guarantee shortest paths, the estimate must never exceed the
/// actual cost of any path between the positions.
pub trait Heuristic: Send + Sync {
    fn estimate(&self, from: Point, to: Point) -> f64;
}

/// Uses the [base cost](EdgeAttrs::cost) of every edge as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BaseCost;

impl CostFunction for BaseCost {
    fn cost(&self, _: NodeId, _: NodeId, edge: &EdgeAttrs, _: Option<&EdgeAttrs>) -> Option<f64> {
        edge.cost
    }
}

/// Describes how a bicyclist weights different kinds of streets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the profile.
    pub name: &'a str,

    /// Multipliers of the base cost for specific road classes.
    ///
    /// A street is matched against all [Penalty] objects in order, and
    /// the first penalty with the same class is used. Streets with classes
    /// not present in the list can't be used at all.
    ///
    /// All penalties must be finite and not less than one.
    pub penalties: &'a [Penalty],

    /// Added to the cost of an edge whenever the street name changes
    /// from the previous edge, to prefer routes with fewer turns.
    pub name_change_penalty: f64,
}

/// Numeric multiplier for streets of a specific [RoadClass].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub class: RoadClass,

    /// Multiplier of the base cost, to express preference for a specific class.
    /// Must be not less than one and a finite floating-point number.
    pub penalty: f64,
}

impl<'a> Profile<'a> {
    /// Finds the first matching [Penalty] for a road class,
    /// returning `None` if the class is not routable.
    pub fn class_penalty(&self, class: RoadClass) -> Option<f64> {
        self.penalties
            .iter()
            .find(|p| p.class == class)
            .map(|p| p.penalty)
            .filter(|p| p.is_finite() && *p >= 1.0)
    }
}

/// [CostFunction] which applies a bicycle [Profile] to the base cost of edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BicycleCost<'a> {
    pub profile: &'a Profile<'a>,
}

impl<'a> BicycleCost<'a> {
    pub fn new(profile: &'a Profile<'a>) -> Self {
        Self { profile }
    }
}

impl<'a> CostFunction for BicycleCost<'a> {
    fn cost(
        &self,
        _: NodeId,
        _: NodeId,
        edge: &EdgeAttrs,
        previous: Option<&EdgeAttrs>,
    ) -> Option<f64> {
        let base = edge.cost?;
        let penalty = self.profile.class_penalty(edge.class)?;

        let name_change = match previous {
            Some(prev) if prev.name != edge.name => self.profile.name_change_penalty,
            _ => 0.0,
        };

        Some(base * penalty + name_change)
    }
}

/// Planar distance between two positions multiplied by a constant factor.
///
/// Admissible as long as no edge costs less than `factor` times its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLine {
    pub factor: f64,
}

impl Heuristic for StraightLine {
    fn estimate(&self, from: Point, to: Point) -> f64 {
        from.distance(&to) * self.factor
    }
}

/// Identifies a [CostFunction] across the path search boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CostFunctionId {
    /// [BaseCost]
    Base,

    /// [BicycleCost] with [BICYCLE_PROFILE]
    #[default]
    Bicycle,

    /// [BicycleCost] with [SAFE_BICYCLE_PROFILE]
    SafeBicycle,
}

impl CostFunctionId {
    pub fn build(self) -> Box<dyn CostFunction> {
        match self {
            Self::Base => Box::new(BaseCost),
            Self::Bicycle => Box::new(BicycleCost::new(&BICYCLE_PROFILE)),
            Self::SafeBicycle => Box::new(BicycleCost::new(&SAFE_BICYCLE_PROFILE)),
        }
    }
}

impl std::str::FromStr for CostFunctionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "bicycle" => Ok(Self::Bicycle),
            "safe" | "safe-bicycle" => Ok(Self::SafeBicycle),
            _ => Err(format!("unknown cost function: {}", s)),
        }
    }
}

/// Identifies a [Heuristic] across the path search boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HeuristicId {
    /// No heuristic - plain Dijkstra's algorithm.
    #[default]
    None,

    /// [StraightLine] with the given factor.
    StraightLine(f64),
}

impl HeuristicId {
    pub fn build(self) -> Option<Box<dyn Heuristic>> {
        match self {
            Self::None => None,
            Self::StraightLine(factor) => Some(Box::new(StraightLine { factor })),
        }
    }
}

/// Routing [Profile] for everyday cycling, with a mild preference for quieter streets.
pub const BICYCLE_PROFILE: Profile = Profile {
    name: "bicycle",
    penalties: &[
        Penalty {
            class: RoadClass::Trunk,
            penalty: 5.0,
        },
        Penalty {
            class: RoadClass::Primary,
            penalty: 2.0,
        },
        Penalty {
            class: RoadClass::Secondary,
            penalty: 1.5,
        },
        Penalty {
            class: RoadClass::Tertiary,
            penalty: 1.2,
        },
        Penalty {
            class: RoadClass::Unclassified,
            penalty: 1.2,
        },
        Penalty {
            class: RoadClass::Residential,
            penalty: 1.0,
        },
        Penalty {
            class: RoadClass::Cycleway,
            penalty: 1.0,
        },
        Penalty {
            class: RoadClass::Service,
            penalty: 1.5,
        },
        Penalty {
            class: RoadClass::Path,
            penalty: 1.5,
        },
    ],
    name_change_penalty: 5.0,
};

/// Routing [Profile] for cautious cyclists, strongly avoiding busy roads
/// and frequent turns.
pub const SAFE_BICYCLE_PROFILE: Profile = Profile {
    name: "safe-bicycle",
    penalties: &[
        Penalty {
            class: RoadClass::Primary,
            penalty: 8.0,
        },
        Penalty {
            class: RoadClass::Secondary,
            penalty: 4.0,
        },
        Penalty {
            class: RoadClass::Tertiary,
            penalty: 2.0,
        },
        Penalty {
            class: RoadClass::Unclassified,
            penalty: 1.5,
        },
        Penalty {
            class: RoadClass::Residential,
            penalty: 1.2,
        },
        Penalty {
            class: RoadClass::Cycleway,
            penalty: 1.0,
        },
        Penalty {
            class: RoadClass::Service,
            penalty: 2.0,
        },
        Penalty {
            class: RoadClass::Path,
            penalty: 1.2,
        },
    ],
    name_change_penalty: 20.0,
};
