// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::{bearing, GeometryError, Point, EPSILON};

/// An ordered sequence of at least two [Points](Point).
///
/// All positions along the line ("along" arguments) are planar distances
/// from the first point, in the units of the underlying reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Creates a new polyline, ensuring it has at least 2 points.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            Err(GeometryError::TooFewPoints(points.len()))
        } else {
            Ok(Self(points))
        }
    }

    /// Creates a straight line between two points, which may be equal.
    pub fn segment(a: Point, b: Point) -> Self {
        Self(vec![a, b])
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn first(&self) -> Point {
        self.0[0]
    }

    pub fn last(&self) -> Point {
        self.0[self.0.len() - 1]
    }

    /// Planar length of the line.
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|pair| pair[0].distance(&pair[1])).sum()
    }

    pub fn reversed(&self) -> Polyline {
        let mut points = self.0.clone();
        points.reverse();
        Self(points)
    }

    /// Finds the position along the line closest to `point`, returning
    /// that position and the distance between `point` and the line.
    ///
    /// If multiple positions are equally close, the earliest one is returned.
    fn nearest(&self, point: Point) -> (f64, f64) {
        let mut best_along = 0.0;
        let mut best_distance = f64::INFINITY;
        let mut cumulative = 0.0;

        for pair in self.0.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let length_sq = dx * dx + dy * dy;
            let segment_length = length_sq.sqrt();

            let t = if length_sq == 0.0 {
                0.0
            } else {
                (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
            };

            let distance = point.distance(&a.lerp(&b, t));
            if distance < best_distance {
                best_distance = distance;
                best_along = cumulative + t * segment_length;
            }

            cumulative += segment_length;
        }

        (best_along, best_distance)
    }

    /// Returns the position along the line nearest to `point`.
    /// The point doesn't need to lie on the line.
    pub fn locate(&self, point: Point) -> f64 {
        self.nearest(point).0
    }

    /// Returns the distance between `point` and the closest position on the line.
    pub fn distance_to(&self, point: Point) -> f64 {
        self.nearest(point).1
    }

    /// Returns the point at the given position along the line.
    /// Positions outside of the line are clamped to its ends.
    pub fn interpolate(&self, along: f64) -> Point {
        if along <= 0.0 {
            return self.first();
        }

        let mut cumulative = 0.0;
        for pair in self.0.windows(2) {
            let segment_length = pair[0].distance(&pair[1]);
            if segment_length > 0.0 && along <= cumulative + segment_length {
                return pair[0].lerp(&pair[1], (along - cumulative) / segment_length);
            }
            cumulative += segment_length;
        }

        self.last()
    }

    /// Splits the line into two at the given position.
    ///
    /// Every vertex before the position goes to the first half, every vertex after
    /// it to the second one, and the split point ends the first half and starts the second.
    /// A vertex lying exactly at the position is only kept in the first half
    /// (and then acts as the split point).
    ///
    /// Halves which would end up with a single point (when splitting at either end)
    /// are padded with a copy of the split point.
    pub fn split_at(&self, along: f64) -> (Polyline, Polyline) {
        let along = along.clamp(0.0, self.length());
        let split_point = self.interpolate(along);

        let mut first: Vec<Point> = Vec::with_capacity(self.0.len() + 1);
        let mut second: Vec<Point> = Vec::with_capacity(self.0.len() + 1);
        let mut cumulative = 0.0;

        for (idx, &point) in self.0.iter().enumerate() {
            if idx > 0 {
                cumulative += self.0[idx - 1].distance(&point);
            }

            if cumulative < along || (cumulative - along).abs() <= EPSILON {
                first.push(point);
            } else {
                second.push(point);
            }
        }

        let shared = match first.last() {
            Some(&last) if last.almost_eq(&split_point) => last,
            _ => {
                first.push(split_point);
                split_point
            }
        };
        second.insert(0, shared);

        if first.len() < 2 {
            first.push(shared);
        }
        if second.len() < 2 {
            second.push(shared);
        }

        (Self(first), Self(second))
    }

    /// Splits the line at the position nearest to `point`, see [Polyline::split_at].
    pub fn split(&self, point: Point) -> (Polyline, Polyline) {
        self.split_at(self.locate(point))
    }

    /// Returns the part of the line between two positions. If `from > to`,
    /// the returned line runs backwards.
    pub fn slice(&self, from: f64, to: f64) -> Polyline {
        if from > to {
            return self.slice(to, from).reversed();
        }

        let (_, tail) = self.split_at(from);
        let (middle, _) = tail.split_at(to - from);
        middle
    }

    /// Concatenates lines, dropping the first point of a line if it is
    /// the same as the last point of the preceding one.
    ///
    /// Returns `None` if no lines were provided.
    pub fn join<'a, I: IntoIterator<Item = &'a Polyline>>(lines: I) -> Option<Polyline> {
        let mut points: Vec<Point> = Vec::new();

        for line in lines {
            let skip = match points.last() {
                Some(last) if last.almost_eq(&line.first()) => 1,
                _ => 0,
            };
            points.extend_from_slice(&line.0[skip..]);
        }

        match points.len() {
            0 => None,
            1 => Some(Self(vec![points[0], points[0]])),
            _ => Some(Self(points)),
        }
    }

    /// Bearing of the first non-degenerate segment, or 0 if the line has no length.
    pub fn start_bearing(&self) -> f64 {
        self.0
            .windows(2)
            .find(|pair| !pair[0].almost_eq(&pair[1]))
            .map(|pair| bearing(pair[0], pair[1]))
            .unwrap_or(0.0)
    }

    /// Bearing of the last non-degenerate segment, or 0 if the line has no length.
    pub fn end_bearing(&self) -> f64 {
        self.0
            .windows(2)
            .rev()
            .find(|pair| !pair[0].almost_eq(&pair[1]))
            .map(|pair| bearing(pair[0], pair[1]))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-6),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn line(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
    }

    /// Concatenates both halves, dropping the point shared between them.
    fn rejoin(a: &Polyline, b: &Polyline) -> Vec<Point> {
        let mut points = a.points().to_vec();
        points.extend_from_slice(&b.points()[1..]);
        points
    }

    #[test]
    fn too_few_points() {
        assert_eq!(
            Polyline::new(vec![Point::new(0.0, 0.0)]),
            Err(GeometryError::TooFewPoints(1))
        );
    }

    #[test]
    fn length_and_locate() {
        let l = line(&[(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
        assert_almost_eq!(l.length(), 11.0);
        assert_almost_eq!(l.locate(Point::new(3.0, 4.0)), 5.0);
        assert_almost_eq!(l.locate(Point::new(5.0, 7.0)), 8.0);
        assert_almost_eq!(l.distance_to(Point::new(5.0, 7.0)), 2.0);
        assert_almost_eq!(l.locate(Point::new(-10.0, -10.0)), 0.0);
        assert_almost_eq!(l.locate(Point::new(3.0, 20.0)), 11.0);
    }

    #[test]
    fn interpolate() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(l.interpolate(-1.0), Point::new(0.0, 0.0));
        assert_eq!(l.interpolate(5.0), Point::new(5.0, 0.0));
        assert_eq!(l.interpolate(15.0), Point::new(10.0, 5.0));
        assert_eq!(l.interpolate(25.0), Point::new(10.0, 10.0));
    }

    #[test]
    fn split_between_vertices() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0)]);
        let (a, b) = l.split(Point::new(11.0, 4.0));

        assert_eq!(a, line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 4.0)]));
        assert_eq!(b, line(&[(10.0, 4.0), (10.0, 10.0), (20.0, 10.0)]));
        assert_almost_eq!(a.length() + b.length(), l.length());

        let mut expected = l.points().to_vec();
        expected.insert(2, Point::new(10.0, 4.0));
        assert_eq!(rejoin(&a, &b), expected);
    }

    #[test]
    fn split_at_vertex_goes_to_first_half_only() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let (a, b) = l.split(Point::new(10.0, 0.0));

        assert_eq!(a, line(&[(0.0, 0.0), (10.0, 0.0)]));
        assert_eq!(b, line(&[(10.0, 0.0), (10.0, 10.0)]));
        assert_eq!(rejoin(&a, &b), l.points().to_vec());
    }

    #[test]
    fn split_at_ends() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);

        let (a, b) = l.split_at(0.0);
        assert_eq!(a, line(&[(0.0, 0.0), (0.0, 0.0)]));
        assert_eq!(b, l);

        let (a, b) = l.split_at(10.0);
        assert_eq!(a, l);
        assert_eq!(b, line(&[(10.0, 0.0), (10.0, 0.0)]));
    }

    #[test]
    fn split_lengths_add_up() {
        let l = line(&[(0.0, 0.0), (3.0, 4.0), (3.0, 9.0), (-2.0, 9.0)]);
        for i in 1..20 {
            let along = l.length() * (i as f64) / 20.0;
            let (a, b) = l.split_at(along);
            assert_almost_eq!(a.length(), along);
            assert_almost_eq!(a.length() + b.length(), l.length());
            assert!(a.last().almost_eq(&b.first()));
        }
    }

    #[test]
    fn slice_forward_and_backward() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);

        assert_eq!(
            l.slice(5.0, 15.0),
            line(&[(5.0, 0.0), (10.0, 0.0), (10.0, 5.0)])
        );
        assert_eq!(
            l.slice(15.0, 5.0),
            line(&[(10.0, 5.0), (10.0, 0.0), (5.0, 0.0)])
        );
    }

    #[test]
    fn join_drops_shared_points() {
        let a = line(&[(0.0, 0.0), (1.0, 0.0)]);
        let b = line(&[(1.0, 0.0), (2.0, 0.0)]);
        let c = line(&[(3.0, 0.0), (4.0, 0.0)]);

        assert_eq!(
            Polyline::join([&a, &b, &c]),
            Some(line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]))
        );
        assert_eq!(Polyline::join(Vec::<&Polyline>::new()), None);
    }

    #[test]
    fn bearings_skip_degenerate_segments() {
        let l = line(&[(0.0, 0.0), (0.0, 0.0), (0.0, 5.0), (5.0, 5.0), (5.0, 5.0)]);
        assert_almost_eq!(l.start_bearing(), 0.0);
        assert_almost_eq!(l.end_bearing(), 90.0);
        assert_almost_eq!(l.reversed().start_bearing(), 270.0);
    }
}
