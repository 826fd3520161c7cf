//! 2D geometry utilities for sketch figures and relations.
//!
//! Every function here is total: degenerate input (zero-length lines,
//! a query at a circle's center, vertical point sets) has a defined result
//! instead of an error. Results are fresh figures with their own variables.

use super::primitives::{Arc, Circle, Line, Point};
use super::Vector2;
use crate::variables::VariableDelta;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Below this magnitude the orientation cross term counts as colinear.
/// Coarse on purpose: it is measured in sketch units squared.
pub const ORIENTATION_TOLERANCE: f64 = 0.1;

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Colinear,
    Clockwise,
    CounterClockwise,
}

impl Orientation {
    /// `0`, `1` or `-1` for colinear, clockwise and counterclockwise.
    pub fn signum(self) -> i32 {
        match self {
            Self::Colinear => 0,
            Self::Clockwise => 1,
            Self::CounterClockwise => -1,
        }
    }
}

// =============================================================================
// Point Operations
// =============================================================================

/// Component-wise mean of `points`. The origin for an empty slice.
pub fn average_of_points(points: &[&Point]) -> Point {
    if points.is_empty() {
        return Point::new(0.0, 0.0);
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.position());
    Point::at(sum / points.len() as f64)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(p0: &Point, p1: &Point) -> f64 {
    (p0.position() - p1.position()).norm()
}

#[inline]
pub fn magnitude(v: Vector2) -> f64 {
    v.norm()
}

/// Unit vector in the direction of `v`; straight up for the zero vector.
pub fn normalize(v: Vector2) -> Vector2 {
    let mag = magnitude(v);
    if mag == 0.0 {
        return Vector2::new(0.0, 1.0);
    }
    v / mag
}

/// `point` mirrored through `pivot`.
pub fn reflect_over(point: &Point, pivot: &Point) -> Point {
    Point::at(pivot.position() * 2.0 - point.position())
}

/// The point `distance` away from `from`, heading toward `to`.
/// Heads straight up when the two coincide.
pub fn point_in_direction(from: &Point, to: &Point, distance: f64) -> Point {
    let ray = normalize(to.position() - from.position());
    Point::at(from.position() + ray * distance)
}

/// Deltas that would move `point` exactly onto `goal`.
pub fn point_deltas(point: &Point, goal: &Point) -> [VariableDelta; 2] {
    [
        VariableDelta::toward(&point.x, goal.x()),
        VariableDelta::toward(&point.y, goal.y()),
    ]
}

/// Strictly inside the axis-aligned rectangle spanned by two corners.
pub fn point_within_rectangle(corner0: &Point, corner1: &Point, point: &Point) -> bool {
    let between = |a: f64, b: f64, v: f64| (a > v && b < v) || (a < v && b > v);
    between(corner0.x(), corner1.x(), point.x()) && between(corner0.y(), corner1.y(), point.y())
}

// =============================================================================
// Angles
// =============================================================================

/// Angle in radians of the ray from `pivot` to `point`.
pub fn angle_between(pivot: &Point, point: &Point) -> f64 {
    let d = point.position() - pivot.position();
    d.y.atan2(d.x)
}

/// The point `radius` away from `pivot` at `angle` radians.
pub fn point_at_angle(pivot: &Point, radius: f64, angle: f64) -> Point {
    Point::new(
        pivot.x() + angle.cos() * radius,
        pivot.y() + angle.sin() * radius,
    )
}

/// Whether `angle` lies counterclockwise from `start` and before `end`.
///
/// `end` and `angle` are taken relative to `start` and wrapped into
/// `[0, 2π)`, so the interval may cross the ±π seam.
pub fn is_angle_between(start: f64, end: f64, angle: f64) -> bool {
    let end = (end - start).rem_euclid(TAU);
    let angle = (angle - start).rem_euclid(TAU);
    angle < end
}

// =============================================================================
// Line Operations
// =============================================================================

pub fn length_of_line(line: &Line) -> f64 {
    distance(&line.p0, &line.p1)
}

/// Fraction of the way from `line.p0` to `line.p1` of the projection of
/// `point`. `0` is `p0`, `1` is `p1`; values outside `[0, 1]` are valid.
///
/// A zero-length line yields `NaN` unless `point` is one of its endpoints.
pub fn projection_factor_between(line: &Line, point: &Point) -> f64 {
    if line.p0 == *point {
        return 0.0;
    }
    if line.p1 == *point {
        return 1.0;
    }
    let d = line.p0.position() - line.p1.position();
    let len2 = d.norm_squared();
    -((point.position() - line.p0.position()).dot(&d)) / len2
}

/// Point colinear with `line` at factor `r` (see [`projection_factor_between`]).
pub fn point_along_line(line: &Line, r: f64) -> Point {
    Point::at(line.p0.position() + (line.p1.position() - line.p0.position()) * r)
}

/// Closest point to `point` on the infinite line through `line`.
/// For a zero-length line this is `line.p0`.
pub fn project_onto_line(line: &Line, point: &Point) -> Point {
    let r = projection_factor_between(line, point);
    if r.is_nan() {
        return point_along_line(line, 0.0);
    }
    point_along_line(line, r)
}

/// Closest point to `point` on the segment `line`. A `NaN` factor from a
/// zero-length segment clamps to `1`.
pub fn project_onto_segment(line: &Line, point: &Point) -> Point {
    let mut r = projection_factor_between(line, point);
    if r < 0.0 {
        r = 0.0;
    } else if r > 1.0 || r.is_nan() {
        r = 1.0;
    }
    point_along_line(line, r)
}

pub fn distance_to_line(line: &Line, point: &Point) -> f64 {
    distance(point, &project_onto_line(line, point))
}

pub fn distance_to_segment(segment: &Line, point: &Point) -> f64 {
    distance(point, &project_onto_segment(segment, point))
}

/// Turn direction of `p0 -> p1 -> p2`.
pub fn orientation(p0: &Point, p1: &Point, p2: &Point) -> Orientation {
    let val = (p1.y() - p0.y()) * (p2.x() - p1.x()) - (p1.x() - p0.x()) * (p2.y() - p1.y());

    if val.abs() < ORIENTATION_TOLERANCE {
        return Orientation::Colinear;
    }
    if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Given `point` colinear with `line`, whether it lies within its bounding box.
pub fn on_segment(line: &Line, point: &Point) -> bool {
    point.x() <= line.p0.x().max(line.p1.x())
        && point.x() >= line.p0.x().min(line.p1.x())
        && point.y() <= line.p0.y().max(line.p1.y())
        && point.y() >= line.p0.y().min(line.p1.y())
}

/// Whether two segments touch or cross. Zero-length segments never intersect.
pub fn segments_intersect(line0: &Line, line1: &Line) -> bool {
    if length_of_line(line0) == 0.0 || length_of_line(line1) == 0.0 {
        return false;
    }

    let o0 = orientation(&line0.p0, &line0.p1, &line1.p0);
    let o1 = orientation(&line0.p0, &line0.p1, &line1.p1);
    let o2 = orientation(&line1.p0, &line1.p1, &line0.p0);
    let o3 = orientation(&line1.p0, &line1.p1, &line0.p1);

    // General case
    if o0 != o1 && o2 != o3 {
        return true;
    }

    // Colinear endpoints touching the other segment
    (o0 == Orientation::Colinear && on_segment(line0, &line1.p0))
        || (o1 == Orientation::Colinear && on_segment(line0, &line1.p1))
        || (o2 == Orientation::Colinear && on_segment(line1, &line0.p0))
        || (o3 == Orientation::Colinear && on_segment(line1, &line0.p1))
}

// =============================================================================
// Circle and Arc Operations
// =============================================================================

/// Distance from `point` to the nearest point on the circle boundary.
pub fn distance_to_circle(circle: &Circle, point: &Point) -> f64 {
    (distance(&circle.c, point) - circle.radius()).abs()
}

/// Project onto the circle along the ray from its center. A query at the
/// center maps to the top of the circle.
pub fn project_onto_circle(circle: &Circle, point: &Point) -> Point {
    point_in_direction(&circle.c, point, circle.radius())
}

/// Project onto the arc, or snap to the nearer endpoint when the projected
/// direction falls outside the arc's angular range.
pub fn project_onto_arc(arc: &Arc, point: &Point) -> Point {
    let angle = if arc.c == *point {
        FRAC_PI_2
    } else {
        angle_between(&arc.c, point)
    };
    if is_angle_between(arc.start_angle(), arc.end_angle(), angle) {
        return project_onto_circle(&arc.circle(), point);
    }

    let d0 = distance(point, &arc.p0);
    let d1 = distance(point, &arc.p1);
    if d0 < d1 {
        Point::at(arc.p0.position())
    } else {
        Point::at(arc.p1.position())
    }
}

pub fn point_within_circle(circle: &Circle, point: &Point) -> bool {
    distance(&circle.c, point) <= circle.radius()
}

/// Whether the segment crosses or lies inside the circle.
pub fn line_intersects_circle(circle: &Circle, line: &Line) -> bool {
    distance_to_segment(line, &circle.c) <= circle.radius()
}

// =============================================================================
// Regression
// =============================================================================

/// A line the points are forced onto by pins or links, if any.
///
/// Two points with a pinned x (or y) coordinate fix the line through them.
/// Otherwise two points sharing a linked x (or y) cell force a vertical
/// (or horizontal) line through the mean of that coordinate. `None` means
/// the caller should fit statistically.
pub fn forced_regression_line(points: &[&Point]) -> Option<Line> {
    let mut constant_x: Vec<&Point> = Vec::new();
    let mut constant_y: Vec<&Point> = Vec::new();

    for &p in points {
        if p.x.is_constant() {
            constant_x.push(p);
        }
        if constant_x.len() >= 2 {
            return Some(Line::new(constant_x[0], constant_x[1]));
        }
        if p.y.is_constant() {
            constant_y.push(p);
        }
        if constant_y.len() >= 2 {
            return Some(Line::new(constant_y[0], constant_y[1]));
        }
    }

    let avg = average_of_points(points);

    for (i, p0) in points.iter().enumerate() {
        for (j, p1) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            if p0.x.is_linked_to(&p1.x) {
                return Some(Line::from_coords(avg.x(), p0.y(), avg.x(), p1.y()));
            }
            if p0.y.is_linked_to(&p1.y) {
                return Some(Line::from_coords(p0.x(), avg.y(), p1.x(), avg.y()));
            }
        }
    }
    None
}

/// Least squares line through `points`.
///
/// Fits `y = a + b·x` first. When that fit is unstable (vertical spread is
/// zero or the slope magnitude exceeds 1) it fits `x = a + b·y` instead, so
/// near-vertical point sets stay well conditioned.
pub fn least_squares_regression(points: &[&Point]) -> Line {
    let n = points.len() as f64;
    let (mut xs, mut ys, mut x2s, mut y2s, mut xys) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points {
        let (x, y) = (p.x(), p.y());
        xs += x;
        ys += y;
        x2s += x * x;
        y2s += y * y;
        xys += x * y;
    }

    let numerator = n * xys - xs * ys;
    let denominator = n * x2s - xs * xs;
    if denominator == 0.0 || (numerator / denominator).abs() > 1.0 {
        let denominator = n * y2s - ys * ys;
        if denominator == 0.0 {
            // All points coincide: any line through them fits.
            let mean = Vector2::new(xs / n, ys / n);
            return Line::from_coords(mean.x, mean.y, mean.x, mean.y + 1.0);
        }
        let slope = numerator / denominator;
        let x_intercept = (xs - slope * ys) / n;
        return Line::from_coords(x_intercept, 0.0, x_intercept + slope, 1.0);
    }

    let slope = numerator / denominator;
    let y_intercept = (ys - slope * xs) / n;
    Line::from_coords(0.0, y_intercept, 1.0, y_intercept + slope)
}
