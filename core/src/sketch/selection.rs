//! Hit-testing for pointer interaction.

use super::types::{EntityId, Sketch};
use crate::geometry::utils_2d::{distance, is_angle_between, point_at_angle, point_within_rectangle};
use crate::geometry::{Figure, FigureKind, Point, Shape};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, PI};

/// A figure found near a query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub id: EntityId,
    /// Distance from the query to the nearest point on the figure
    pub distance: f64,
    /// Nearest point on the figure
    pub position: [f64; 2],
}

/// Priority when several figures are within reach (lower wins).
fn priority(kind: FigureKind) -> u8 {
    match kind {
        FigureKind::Point => 1,
        FigureKind::Line => 2,
        FigureKind::Arc => 3,
        FigureKind::Circle => 3,
    }
}

/// The figure nearest to `query` within `radius`. Points beat curves even
/// when a curve passes closer, so small targets stay clickable.
pub fn pick(sketch: &Sketch, query: &Point, radius: f64) -> Option<Pick> {
    sketch
        .entities
        .iter()
        .filter_map(|entity| {
            let nearest = entity.figure.closest_point(query);
            let d = distance(&nearest, query);
            (d <= radius).then(|| {
                (
                    priority(entity.figure.kind()),
                    Pick {
                        id: entity.id,
                        distance: d,
                        position: [nearest.x(), nearest.y()],
                    },
                )
            })
        })
        .min_by(|(pa, a), (pb, b)| {
            pa.cmp(pb)
                .then_with(|| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
        })
        .map(|(_, pick)| pick)
}

/// Ids of every figure lying strictly inside the rectangle spanned by the
/// two corners, in sketch order.
pub fn select_in_rectangle(sketch: &Sketch, corner0: &Point, corner1: &Point) -> Vec<EntityId> {
    sketch
        .entities
        .iter()
        .filter(|e| {
            extreme_points(&e.figure)
                .iter()
                .all(|p| point_within_rectangle(corner0, corner1, p))
        })
        .map(|e| e.id)
        .collect()
}

/// Points whose containment implies containment of the whole figure.
fn extreme_points(figure: &Figure) -> Vec<Point> {
    match figure {
        Figure::Point(p) => vec![p.clone()],
        Figure::Line(l) => vec![l.p0.clone(), l.p1.clone()],
        Figure::Circle(c) => [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
            .iter()
            .map(|&angle| point_at_angle(&c.c, c.radius(), angle))
            .collect(),
        Figure::Arc(a) => {
            let (start, end) = (a.start_angle(), a.end_angle());
            let mut points = vec![a.p0.clone(), a.p1.clone()];
            points.extend(
                [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]
                    .iter()
                    .filter(|&&angle| is_angle_between(start, end, angle))
                    .map(|&angle| point_at_angle(&a.c, a.radius(), angle)),
            );
            points
        }
    }
}
