// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::Point;
use crate::model::Intersection;

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// used by [crate::MemoryStore] to find the intersection nearest to a waypoint
/// without scanning the whole network.
///
/// Distances are planar, in units of the network's working projection.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Intersection,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Intersection] to the given point, together with the distance to it.
    pub fn find_nearest(&self, point: Point) -> (Intersection, f64) {
        self.find_nearest_impl(point, false)
    }

    fn find_nearest_impl(&self, point: Point, y_divides: bool) -> (Intersection, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = point.distance(&best.point);

        // Select which branch to recurse into first
        let first_left = if y_divides {
            point.y < best.point.y
        } else {
            point.x < best.point.x
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_impl(point, !y_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        if let Some(ref branch) = second {
            // A closer intersection is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let dist_to_axis = if y_divides {
                (point.y - self.pivot.point.y).abs()
            } else {
                (point.x - self.pivot.point.x).abs()
            };

            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.find_nearest_impl(point, !y_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [Intersections](Intersection).
    pub fn from_iter<I: IntoIterator<Item = Intersection>>(intersections: I) -> Option<Self> {
        let mut intersections = intersections.into_iter().collect::<Vec<_>>();
        Self::build(intersections.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Intersections](Intersection).
    /// The slice is reordered while building the tree.
    pub fn build(intersections: &mut [Intersection]) -> Option<Self> {
        Self::build_impl(intersections, false)
    }

    fn build_impl(intersections: &mut [Intersection], y_divides: bool) -> Option<Self> {
        match intersections.len() {
            0 => None,
            1 => Some(Self {
                pivot: intersections[0],
                left: None,
                right: None,
            }),
            _ => {
                if y_divides {
                    intersections.sort_by(|a, b| a.point.y.total_cmp(&b.point.y));
                } else {
                    intersections.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));
                }
                let median = intersections.len() / 2;
                let pivot = intersections[median];
                let (left, right_and_pivot) = intersections.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: box_option(Self::build_impl(left, !y_divides)),
                    right: box_option(Self::build_impl(right, !y_divides)),
                })
            }
        }
    }
}

#[inline]
fn box_option<T>(o: Option<T>) -> Option<Box<T>> {
    o.map(Box::new)
}
