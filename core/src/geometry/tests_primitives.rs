use super::{ApproxEq, Arc, Circle, Figure, FigureKind, Line, Point, Shape};
use std::f64::consts::PI;

#[test]
fn test_point_accessors_write_through() {
    let p = Point::new(1.0, 2.0);
    let alias = p.clone();
    alias.set_x(7.0);
    assert_eq!(p.x(), 7.0);
    assert_eq!(p.x.value(), 7.0);

    p.y.set_value(-1.0);
    assert_eq!(alias.y(), -1.0);
}

#[test]
fn test_line_copies_its_points() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    let line = Line::new(&a, &b);

    a.set_x(100.0);
    assert_eq!(line.p0.x(), 0.0, "line must not alias the caller's point");
    assert!(!line.p0.x.is_linked_to(&a.x));
}

#[test]
fn test_line_translate() {
    let line = Line::from_coords(0.0, 0.0, 10.0, 5.0);
    line.translate(&Point::new(1.0, 1.0), &Point::new(4.0, -1.0));
    assert!(line.p0.approx_eq(&Point::new(3.0, -2.0)));
    assert!(line.p1.approx_eq(&Point::new(13.0, 3.0)));
}

#[test]
fn test_line_translate_linked_axis_applies_once() {
    // Vertical line: both endpoints share one x cell
    let line = Line::from_coords(2.0, 0.0, 2.0, 8.0);
    line.p1.x.link(&line.p0.x);

    line.translate(&Point::new(0.0, 0.0), &Point::new(3.0, 0.0));
    assert_eq!(line.p0.x(), 5.0);
    assert_eq!(line.p1.x(), 5.0);

    // A y-only move leaves x untouched and moves both unlinked y values
    line.translate(&Point::new(0.0, 0.0), &Point::new(0.0, 2.0));
    assert_eq!(line.p0.x(), 5.0);
    assert_eq!(line.p0.y(), 2.0);
    assert_eq!(line.p1.y(), 10.0);
}

#[test]
fn test_linked_points_translate() {
    let a = Point::new(1.0, 1.0);
    let b = Point::new(1.0, 6.0);
    b.x.link(&a.x);

    a.translate(&Point::new(0.0, 0.0), &Point::new(4.0, 0.0));
    assert_eq!(a.x(), 5.0);
    assert_eq!(b.x(), 5.0, "linked x follows");

    a.translate(&Point::new(0.0, 0.0), &Point::new(0.0, 3.0));
    assert_eq!(a.y(), 4.0);
    assert_eq!(b.y(), 6.0, "unlinked y stays");
}

#[test]
fn test_line_set_constant() {
    let line = Line::from_coords(0.0, 0.0, 1.0, 1.0);
    line.set_constant(true);
    assert!(line.p0.is_constant());
    assert!(line.p1.x.is_constant() && line.p1.y.is_constant());
    line.set_constant(false);
    assert!(!Figure::Line(line).is_constant());
}

#[test]
fn test_deep_copy_is_independent() {
    let line = Line::from_coords(0.0, 0.0, 4.0, 0.0);
    let copy = line.deep_copy();
    assert_eq!(copy, line);

    copy.p1.set_x(9.0);
    assert_eq!(line.p1.x(), 4.0);
    assert_ne!(copy, line);
}

#[test]
fn test_deep_copy_keeps_internal_links_only() {
    let outside = Point::new(0.0, 0.0);
    let line = Line::from_coords(0.0, 0.0, 0.0, 5.0);
    line.p1.x.link(&line.p0.x);
    line.p0.y.link(&outside.y);

    let copy = line.deep_copy();
    assert!(copy.p0.x.is_linked_to(&copy.p1.x));
    assert!(!copy.p0.y.is_linked_to(&outside.y));
    assert!(!copy.p0.x.is_linked_to(&line.p0.x));

    // Linkage drives translation in the copy too
    copy.translate(&Point::new(0.0, 0.0), &Point::new(1.0, 0.0));
    assert_eq!(copy.p0.x(), 1.0);
    assert_eq!(copy.p1.x(), 1.0);
}

#[test]
fn test_child_figures_are_handles() {
    let line = Line::from_coords(0.0, 0.0, 1.0, 0.0);
    let children = line.child_figures();
    assert_eq!(children.len(), 2);

    if let Figure::Point(p) = &children[1] {
        p.set_y(3.0);
    }
    assert_eq!(line.p1.y(), 3.0);

    let arc = Arc::from_angles(0.0, 0.0, 1.0, 0.0, PI);
    assert_eq!(arc.child_figures().len(), 3);
    assert!(Point::new(0.0, 0.0).child_figures().is_empty());
}

#[test]
fn test_closest_point_per_variant() {
    let q = Point::new(3.0, 4.0);

    let p: Figure = Point::new(1.0, 1.0).into();
    assert!(p.closest_point(&q).approx_eq(&Point::new(1.0, 1.0)));

    let line: Figure = Line::from_coords(0.0, 0.0, 10.0, 0.0).into();
    assert!(line.closest_point(&q).approx_eq(&Point::new(3.0, 0.0)));

    let circle: Figure = Circle::from_coords(0.0, 0.0, 1.0).into();
    assert!(circle.closest_point(&q).approx_eq(&Point::new(0.6, 0.8)));

    let arc: Figure = Arc::from_angles(0.0, 0.0, 1.0, PI, 1.5 * PI).into();
    let near = arc.closest_point(&q);
    assert!(near.approx_eq(&Point::new(-1.0, 0.0)) || near.approx_eq(&Point::new(0.0, -1.0)));
}

#[test]
fn test_circle_translate_keeps_radius() {
    let circle = Circle::from_coords(0.0, 0.0, 2.0);
    circle.translate(&Point::new(1.0, 1.0), &Point::new(2.0, 3.0));
    assert!(circle.c.approx_eq(&Point::new(1.0, 2.0)));
    assert_eq!(circle.radius(), 2.0);
}

#[test]
fn test_arc_translate_and_angles() {
    let arc = Arc::from_angles(0.0, 0.0, 2.0, 0.0, PI / 2.0);
    assert!((arc.start_angle() - 0.0).abs() < 1e-12);
    assert!((arc.end_angle() - PI / 2.0).abs() < 1e-12);

    arc.translate(&Point::new(0.0, 0.0), &Point::new(5.0, 5.0));
    assert!(arc.c.approx_eq(&Point::new(5.0, 5.0)));
    assert!(arc.p0.approx_eq(&Point::new(7.0, 5.0)));
    assert!((arc.end_angle() - PI / 2.0).abs() < 1e-12);
}

#[test]
fn test_figure_equality_and_kind() {
    let a: Figure = Circle::from_coords(1.0, 2.0, 3.0).into();
    let b: Figure = Circle::from_coords(1.0, 2.0, 3.0).into();
    let c: Figure = Point::new(1.0, 2.0).into();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.kind(), FigureKind::Circle);
    assert_eq!(c.kind().to_string(), "point");
    assert!(a.as_circle().is_some());
    assert!(c.as_line().is_none());
}

#[test]
fn test_figure_identity_differs_from_equality() {
    let line: Figure = Line::from_coords(0.0, 0.0, 1.0, 1.0).into();
    let handle = line.clone();
    let copy = line.deep_copy();

    assert!(line.is_same(&handle));
    assert_eq!(line, copy);
    assert!(!line.is_same(&copy));

    // An arc's circle shares variables but is a different figure kind
    let arc = Arc::from_angles(0.0, 0.0, 1.0, 0.0, PI);
    let circle: Figure = arc.circle().into();
    assert!(!Figure::Arc(arc).is_same(&circle));
}

#[test]
fn test_figure_variables() {
    let arc: Figure = Arc::from_angles(0.0, 0.0, 1.0, 0.0, PI).into();
    assert_eq!(arc.variables().len(), 7);
    let circle: Figure = Circle::from_coords(0.0, 0.0, 1.0).into();
    assert_eq!(circle.variables().len(), 3);
}

#[test]
fn test_arc_endpoints_follow_circle_only_when_snapped() {
    let arc = Arc::from_angles(0.0, 0.0, 2.0, 0.0, PI / 2.0);
    arc.r.set_value(3.0);
    assert!((arc.p0.x() - 2.0).abs() < 1e-12, "radius change leaves endpoints");

    arc.p1.y.set_constant(true);
    arc.snap_endpoints();

    assert!((arc.p0.x() - 3.0).abs() < 1e-12);
    assert!(arc.p0.y().abs() < 1e-12);
    assert!(arc.p1.x().abs() < 1e-12);
    assert_eq!(arc.p1.y(), 2.0, "pinned coordinate stays");
    assert!(arc.start_angle().abs() < 1e-12);
}
