use super::utils_2d::*;
use super::{ApproxEq, Arc, Circle, Line, Point, Vector2, EPSILON};
use proptest::prelude::*;
use std::f64::consts::{FRAC_PI_2, PI};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn test_distance_and_average() {
    assert!(distance(&pt(0.0, 0.0), &pt(3.0, 4.0)).approx_eq(&5.0));

    let avg = average_of_points(&[&pt(0.0, 0.0), &pt(10.0, 0.0), &pt(5.0, 6.0)]);
    assert!(avg.approx_eq(&pt(5.0, 2.0)));
}

#[test]
fn test_normalize_zero_points_up() {
    assert_eq!(normalize(Vector2::zeros()), Vector2::new(0.0, 1.0));
    assert!(normalize(Vector2::new(3.0, 4.0)).approx_eq(&Vector2::new(0.6, 0.8)));
}

#[test]
fn test_project_onto_line_extends_past_endpoints() {
    let line = Line::from_coords(0.0, 0.0, 10.0, 0.0);
    let proj = project_onto_line(&line, &pt(15.0, 3.0));
    assert!(proj.approx_eq(&pt(15.0, 0.0)));
}

#[test]
fn test_project_onto_segment_clamps() {
    let line = Line::from_coords(0.0, 0.0, 10.0, 0.0);
    assert!(project_onto_segment(&line, &pt(15.0, 3.0)).approx_eq(&pt(10.0, 0.0)));
    assert!(project_onto_segment(&line, &pt(-4.0, -1.0)).approx_eq(&pt(0.0, 0.0)));
    assert!(project_onto_segment(&line, &pt(4.0, 2.0)).approx_eq(&pt(4.0, 0.0)));
}

#[test]
fn test_zero_length_line_projection() {
    let line = Line::from_coords(2.0, 2.0, 2.0, 2.0);

    // Endpoint queries are exact
    assert_eq!(projection_factor_between(&line, &pt(2.0, 2.0)), 0.0);

    // Anything else degenerates to NaN, which the segment clamps to p1
    assert!(projection_factor_between(&line, &pt(5.0, 1.0)).is_nan());
    let proj = project_onto_segment(&line, &pt(5.0, 1.0));
    assert_eq!(proj, pt(2.0, 2.0));
    assert!(!proj.x().is_nan());

    let proj = project_onto_line(&line, &pt(5.0, 1.0));
    assert_eq!(proj, pt(2.0, 2.0));
}

#[test]
fn test_distances_to_line_and_segment() {
    let line = Line::from_coords(0.0, 0.0, 10.0, 0.0);
    assert!(distance_to_line(&line, &pt(20.0, 3.0)).approx_eq(&3.0));
    assert!(distance_to_segment(&line, &pt(13.0, 4.0)).approx_eq(&5.0));
}

#[test]
fn test_project_onto_circle() {
    let circle = Circle::from_coords(1.0, 1.0, 2.0);
    assert!(project_onto_circle(&circle, &pt(5.0, 1.0)).approx_eq(&pt(3.0, 1.0)));

    // Query at the center maps to the top of the circle
    assert!(project_onto_circle(&circle, &pt(1.0, 1.0)).approx_eq(&pt(1.0, 3.0)));

    assert!(distance_to_circle(&circle, &pt(1.0, 6.0)).approx_eq(&3.0));
    assert!(point_within_circle(&circle, &pt(2.0, 2.0)));
    assert!(!point_within_circle(&circle, &pt(4.0, 4.0)));
}

#[test]
fn test_project_onto_arc() {
    // Upper half circle, counterclockwise from 0 to PI
    let arc = Arc::from_angles(0.0, 0.0, 5.0, 0.0, PI);

    let inside = project_onto_arc(&arc, &pt(0.0, 10.0));
    assert!(inside.approx_eq(&pt(0.0, 5.0)));

    // Below the arc: snaps to the nearer endpoint
    let right = project_onto_arc(&arc, &pt(3.0, -4.0));
    assert!(right.approx_eq(&pt(5.0, 0.0)));
    let left = project_onto_arc(&arc, &pt(-3.0, -4.0));
    assert!(left.approx_eq(&arc.p1.clone()));
}

#[test]
fn test_project_onto_arc_center_uses_up_direction() {
    let upper = Arc::from_angles(0.0, 0.0, 2.0, 0.0, PI);
    assert!(project_onto_arc(&upper, &pt(0.0, 0.0)).approx_eq(&pt(0.0, 2.0)));

    let lower = Arc::from_angles(0.0, 0.0, 2.0, PI, 0.0);
    let snapped = project_onto_arc(&lower, &pt(0.0, 0.0));
    assert!(snapped.approx_eq(&lower.p0) || snapped.approx_eq(&lower.p1));
}

#[test]
fn test_is_angle_between_wraps() {
    assert!(is_angle_between(0.0, FRAC_PI_2, 0.5));
    assert!(!is_angle_between(0.0, FRAC_PI_2, 2.0));

    // Interval crossing the -PI/PI seam
    assert!(is_angle_between(3.0, -3.0, PI));
    assert!(is_angle_between(3.0, -3.0, -3.1));
    assert!(!is_angle_between(3.0, -3.0, 0.0));

    // Start is inclusive, end exclusive
    assert!(is_angle_between(1.0, 2.0, 1.0));
    assert!(!is_angle_between(1.0, 2.0, 2.0));
}

#[test]
fn test_angle_helpers() {
    let pivot = pt(1.0, 1.0);
    assert!(angle_between(&pivot, &pt(1.0, 4.0)).approx_eq(&FRAC_PI_2));
    assert!(point_at_angle(&pivot, 2.0, PI).approx_eq(&pt(-1.0, 1.0)));
}

#[test]
fn test_orientation_tolerance() {
    let a = pt(0.0, 0.0);
    let b = pt(10.0, 0.0);
    assert_eq!(orientation(&a, &b, &pt(20.0, 0.005)), Orientation::Colinear);
    assert_eq!(orientation(&a, &b, &pt(20.0, -5.0)), Orientation::Clockwise);
    assert_eq!(orientation(&a, &b, &pt(20.0, 5.0)), Orientation::CounterClockwise);
    assert_eq!(Orientation::Clockwise.signum(), 1);
}

#[test]
fn test_segments_intersect_cases() {
    let a = Line::from_coords(0.0, 0.0, 10.0, 10.0);
    let b = Line::from_coords(0.0, 10.0, 10.0, 0.0);
    assert!(segments_intersect(&a, &b));

    let parallel = Line::from_coords(0.0, 5.0, 10.0, 15.0);
    assert!(!segments_intersect(&a, &parallel));

    // Colinear overlap
    let along = Line::from_coords(5.0, 5.0, 20.0, 20.0);
    assert!(segments_intersect(&a, &along));

    // Colinear but disjoint
    let beyond = Line::from_coords(20.0, 20.0, 30.0, 30.0);
    assert!(!segments_intersect(&a, &beyond));

    // T junction
    let t = Line::from_coords(5.0, 5.0, 5.0, -5.0);
    assert!(segments_intersect(&a, &t));

    let degenerate = Line::from_coords(5.0, 5.0, 5.0, 5.0);
    assert!(!segments_intersect(&a, &degenerate));
}

#[test]
fn test_line_intersects_circle() {
    let circle = Circle::from_coords(0.0, 0.0, 1.0);
    assert!(line_intersects_circle(&circle, &Line::from_coords(-2.0, 0.5, 2.0, 0.5)));
    assert!(!line_intersects_circle(&circle, &Line::from_coords(-2.0, 3.0, 2.0, 3.0)));
}

#[test]
fn test_point_within_rectangle() {
    let c0 = pt(0.0, 10.0);
    let c1 = pt(10.0, 0.0);
    assert!(point_within_rectangle(&c0, &c1, &pt(3.0, 3.0)));
    assert!(!point_within_rectangle(&c0, &c1, &pt(11.0, 3.0)));
    assert!(!point_within_rectangle(&c0, &c1, &pt(0.0, 3.0)), "edges are exclusive");
}

#[test]
fn test_point_deltas_reach_goal() {
    let p = pt(1.0, 2.0);
    let goal = pt(4.0, -2.0);
    let deltas = point_deltas(&p, &goal);

    assert!(deltas[0].variable.same_variable(&p.x));
    assert!(deltas[1].variable.same_variable(&p.y));
    for d in &deltas {
        d.variable.shift(d.delta);
    }
    assert!(p.approx_eq(&goal));
}

#[test]
fn test_reflect_over() {
    let r = reflect_over(&pt(0.0, 0.0), &pt(5.0, 5.0));
    assert!(r.approx_eq(&pt(10.0, 10.0)));
}

#[test]
fn test_regression_horizontal_and_vertical() {
    let horizontal = [pt(0.0, 2.0), pt(5.0, 2.0), pt(9.0, 2.0)];
    let refs: Vec<&Point> = horizontal.iter().collect();
    let line = least_squares_regression(&refs);
    for p in &horizontal {
        assert!(distance_to_line(&line, p) < EPSILON);
    }

    let vertical = [pt(3.0, -4.0), pt(3.0, 1.0), pt(3.0, 8.0)];
    let refs: Vec<&Point> = vertical.iter().collect();
    let line = least_squares_regression(&refs);
    for p in &vertical {
        assert!(distance_to_line(&line, p) < EPSILON);
    }
}

#[test]
fn test_regression_near_vertical_refits_on_y() {
    let points = [pt(1.0, 0.0), pt(1.01, 10.0), pt(1.02, 20.0)];
    let refs: Vec<&Point> = points.iter().collect();
    let line = least_squares_regression(&refs);
    for p in &points {
        assert!(distance_to_line(&line, p) < EPSILON, "{:?} off {:?}", p, line);
    }
    // Parameterized on y: endpoints at y = 0 and y = 1
    assert!(line.p0.y().approx_eq(&0.0));
    assert!(line.p1.y().approx_eq(&1.0));
}

#[test]
fn test_regression_coincident_points() {
    let points = [pt(2.0, 3.0), pt(2.0, 3.0)];
    let refs: Vec<&Point> = points.iter().collect();
    let line = least_squares_regression(&refs);
    assert!(distance_to_line(&line, &points[0]) < EPSILON);
    assert!(line.length() > 0.0);
}

#[test]
fn test_forced_regression_constant_points() {
    let a = pt(0.0, 0.0);
    let b = pt(5.0, 1.0);
    let c = pt(10.0, 0.0);
    a.x.set_constant(true);
    c.x.set_constant(true);

    let line = forced_regression_line(&[&a, &b, &c]).expect("two pinned x values");
    assert_eq!(line.p0, a);
    assert_eq!(line.p1, c);
}

#[test]
fn test_forced_regression_linked_axis() {
    let a = pt(0.0, 0.0);
    let b = pt(4.0, 3.0);
    let c = pt(10.0, 9.0);
    c.y.link(&a.y);

    let line = forced_regression_line(&[&a, &b, &c]).expect("linked y forces a horizontal line");
    let mean_y = (a.y() + b.y() + c.y()) / 3.0;
    assert!(line.p0.y().approx_eq(&mean_y));
    assert!(line.p1.y().approx_eq(&mean_y));
}

#[test]
fn test_forced_regression_none_for_free_points() {
    let a = pt(0.0, 0.0);
    let b = pt(4.0, 3.0);
    assert!(forced_regression_line(&[&a, &b]).is_none());
}

proptest! {
    #[test]
    fn prop_projection_is_perpendicular(
        x0 in -100.0f64..100.0, y0 in -100.0f64..100.0,
        x1 in -100.0f64..100.0, y1 in -100.0f64..100.0,
        qx in -100.0f64..100.0, qy in -100.0f64..100.0,
    ) {
        let line = Line::from_coords(x0, y0, x1, y1);
        prop_assume!(line.length() > 1e-3);
        let q = pt(qx, qy);
        let proj = project_onto_line(&line, &q);

        let d = line.direction();
        let e = proj.position() - q.position();
        prop_assert!(e.dot(&d).abs() < 1e-6 * (1.0 + d.norm() * e.norm()));

        // Colinear with the line
        let along = proj.position() - line.p0.position();
        prop_assert!((along.x * d.y - along.y * d.x).abs() < 1e-6 * (1.0 + d.norm() * along.norm()));
    }

    #[test]
    fn prop_segment_projection_stays_on_segment(
        x0 in -100.0f64..100.0, y0 in -100.0f64..100.0,
        x1 in -100.0f64..100.0, y1 in -100.0f64..100.0,
        qx in -100.0f64..100.0, qy in -100.0f64..100.0,
    ) {
        let line = Line::from_coords(x0, y0, x1, y1);
        let proj = project_onto_segment(&line, &pt(qx, qy));
        let slack = 1e-9;
        prop_assert!(proj.x() >= x0.min(x1) - slack && proj.x() <= x0.max(x1) + slack);
        prop_assert!(proj.y() >= y0.min(y1) - slack && proj.y() <= y0.max(y1) + slack);
    }

    #[test]
    fn prop_segments_intersect_is_symmetric(
        c in proptest::collection::vec(-20.0f64..20.0, 8),
    ) {
        let a = Line::from_coords(c[0], c[1], c[2], c[3]);
        let b = Line::from_coords(c[4], c[5], c[6], c[7]);
        prop_assert_eq!(segments_intersect(&a, &b), segments_intersect(&b, &a));
    }

    #[test]
    fn prop_reflect_over_is_involution(
        px in -1e3f64..1e3, py in -1e3f64..1e3,
        cx in -1e3f64..1e3, cy in -1e3f64..1e3,
    ) {
        let p = pt(px, py);
        let pivot = pt(cx, cy);
        let back = reflect_over(&reflect_over(&p, &pivot), &pivot);
        prop_assert!((back.position() - p.position()).norm() < 1e-9);
    }

    #[test]
    fn prop_regression_fits_colinear_points(
        angle in 0.0f64..PI, ox in -50.0f64..50.0, oy in -50.0f64..50.0,
        t0 in -20.0f64..-1.0, t1 in -0.5f64..0.5, t2 in 1.0f64..20.0,
    ) {
        let dir = Vector2::new(angle.cos(), angle.sin());
        let points: Vec<Point> = [t0, t1, t2]
            .iter()
            .map(|t| Point::at(Vector2::new(ox, oy) + dir * *t))
            .collect();
        let refs: Vec<&Point> = points.iter().collect();
        let line = least_squares_regression(&refs);
        for p in &points {
            prop_assert!(distance_to_line(&line, p) < 1e-6);
        }
    }
}
