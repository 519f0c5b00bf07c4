// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::normalize_degrees;

/// One of the 8 compass directions, used to describe the start of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

const HEADINGS: [Heading; 8] = [
    Heading::North,
    Heading::NorthEast,
    Heading::East,
    Heading::SouthEast,
    Heading::South,
    Heading::SouthWest,
    Heading::West,
    Heading::NorthWest,
];

impl Heading {
    /// Maps a compass bearing onto the nearest heading.
    /// Every heading covers 45°, centred on its exact direction.
    pub fn from_bearing(bearing: f64) -> Self {
        let idx = ((normalize_degrees(bearing) + 22.5) / 45.0).floor() as usize;
        HEADINGS[idx % HEADINGS.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
        }
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maneuver required to enter a stretch of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    /// First stretch of a route, heading in the given direction.
    Start(Heading),
    Straight,
    Right,
    Back,
    Left,
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start(heading) => write!(f, "head {}", heading),
            Self::Straight => f.write_str("continue straight"),
            Self::Right => f.write_str("turn right"),
            Self::Back => f.write_str("turn around"),
            Self::Left => f.write_str("turn left"),
        }
    }
}

/// Classifies the change of bearing (in degrees, clockwise) between two stretches.
///
/// The thresholds are asymmetric: `straight` covers deltas up to 10° either way,
/// `back` covers 170° through 190° inclusive.
pub fn classify_turn(delta: f64) -> Turn {
    let delta = normalize_degrees(delta);
    if delta <= 10.0 || delta >= 350.0 {
        Turn::Straight
    } else if delta < 170.0 {
        Turn::Right
    } else if delta <= 190.0 {
        Turn::Back
    } else {
        Turn::Left
    }
}

/// Classifies the turn between leaving one stretch with bearing `exit`
/// and entering the next one with bearing `entry`.
pub fn turn_between(exit: f64, entry: f64) -> Turn {
    classify_turn(entry - exit)
}
