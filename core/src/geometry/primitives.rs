//! Sketch figures built from [`Variable`]s.

use super::{shift_cells, utils_2d, Vector2};
use crate::variables::{LinkMap, Variable};
use std::fmt;

/// Capabilities shared by every figure variant.
pub trait Shape {
    /// Figures this one is composed of, as handles (not copies).
    fn child_figures(&self) -> Vec<Figure>;

    /// The point on this figure nearest to `query`.
    fn closest_point(&self, query: &Point) -> Point;

    /// Move by the displacement `to - from`. Each value cell moves once.
    fn translate(&self, from: &Point, to: &Point);

    /// Every variable the figure owns, children included.
    fn variables(&self) -> Vec<Variable>;

    /// Copy with fresh variables, sharing cells through `links`.
    fn copy_with(&self, links: &mut LinkMap) -> Self
    where
        Self: Sized;

    /// Copy with fresh variables. Links between the figure's own variables
    /// are kept; links to anything outside the figure are not.
    fn deep_copy(&self) -> Self
    where
        Self: Sized,
    {
        self.copy_with(&mut LinkMap::new())
    }

    fn set_constant(&self, constant: bool) {
        for variable in self.variables() {
            variable.set_constant(constant);
        }
    }
}

// =============================================================================
// Point
// =============================================================================

#[derive(Clone)]
pub struct Point {
    pub x: Variable,
    pub y: Variable,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Variable::new(x),
            y: Variable::new(y),
        }
    }

    pub fn from_variables(x: Variable, y: Variable) -> Self {
        Self { x, y }
    }

    pub fn at(position: Vector2) -> Self {
        Self::new(position.x, position.y)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x.value()
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y.value()
    }

    pub fn set_x(&self, x: f64) {
        self.x.set_value(x);
    }

    pub fn set_y(&self, y: f64) {
        self.y.set_value(y);
    }

    #[inline]
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x(), self.y())
    }

    pub fn set_position(&self, position: Vector2) {
        self.set_x(position.x);
        self.set_y(position.y);
    }

    /// True if either coordinate is pinned.
    pub fn is_constant(&self) -> bool {
        self.x.is_constant() || self.y.is_constant()
    }
}

impl Shape for Point {
    fn child_figures(&self) -> Vec<Figure> {
        Vec::new()
    }

    fn closest_point(&self, _query: &Point) -> Point {
        self.deep_copy()
    }

    fn translate(&self, from: &Point, to: &Point) {
        self.x.shift(to.x() - from.x());
        self.y.shift(to.y() - from.y());
    }

    fn variables(&self) -> Vec<Variable> {
        vec![self.x.clone(), self.y.clone()]
    }

    fn copy_with(&self, links: &mut LinkMap) -> Self {
        Self {
            x: self.x.copy_with(links),
            y: self.y.copy_with(links),
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x(), self.y())
    }
}

// =============================================================================
// Line
// =============================================================================

#[derive(Clone, PartialEq)]
pub struct Line {
    pub p0: Point,
    pub p1: Point,
}

impl Line {
    /// Build a line from copies of `p0` and `p1`. Links between the two
    /// inputs carry over; links to the inputs themselves do not.
    pub fn new(p0: &Point, p1: &Point) -> Self {
        let mut links = LinkMap::new();
        Self {
            p0: p0.copy_with(&mut links),
            p1: p1.copy_with(&mut links),
        }
    }

    pub fn from_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            p0: Point::new(x0, y0),
            p1: Point::new(x1, y1),
        }
    }

    pub fn length(&self) -> f64 {
        utils_2d::length_of_line(self)
    }

    pub fn direction(&self) -> Vector2 {
        self.p1.position() - self.p0.position()
    }
}

impl Shape for Line {
    fn child_figures(&self) -> Vec<Figure> {
        vec![Figure::Point(self.p0.clone()), Figure::Point(self.p1.clone())]
    }

    fn closest_point(&self, query: &Point) -> Point {
        utils_2d::project_onto_segment(self, query)
    }

    fn translate(&self, from: &Point, to: &Point) {
        shift_cells([&self.p0.x, &self.p1.x], to.x() - from.x());
        shift_cells([&self.p0.y, &self.p1.y], to.y() - from.y());
    }

    fn variables(&self) -> Vec<Variable> {
        vec![
            self.p0.x.clone(),
            self.p0.y.clone(),
            self.p1.x.clone(),
            self.p1.y.clone(),
        ]
    }

    fn copy_with(&self, links: &mut LinkMap) -> Self {
        Self {
            p0: self.p0.copy_with(links),
            p1: self.p1.copy_with(links),
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.p0, self.p1)
    }
}

// =============================================================================
// Circle
// =============================================================================

#[derive(Clone)]
pub struct Circle {
    pub c: Point,
    pub r: Variable,
}

impl Circle {
    /// Build a circle around a copy of `center`.
    pub fn new(center: &Point, radius: f64) -> Self {
        Self {
            c: center.deep_copy(),
            r: Variable::new(radius),
        }
    }

    pub fn from_coords(cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            c: Point::new(cx, cy),
            r: Variable::new(radius),
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.r.value()
    }

    pub fn set_radius(&self, radius: f64) {
        self.r.set_value(radius);
    }
}

impl Shape for Circle {
    fn child_figures(&self) -> Vec<Figure> {
        vec![Figure::Point(self.c.clone())]
    }

    fn closest_point(&self, query: &Point) -> Point {
        utils_2d::project_onto_circle(self, query)
    }

    fn translate(&self, from: &Point, to: &Point) {
        self.c.translate(from, to);
    }

    fn variables(&self) -> Vec<Variable> {
        vec![self.c.x.clone(), self.c.y.clone(), self.r.clone()]
    }

    fn copy_with(&self, links: &mut LinkMap) -> Self {
        Self {
            c: self.c.copy_with(links),
            r: self.r.copy_with(links),
        }
    }
}

impl PartialEq for Circle {
    fn eq(&self, other: &Self) -> bool {
        self.c == other.c && self.radius() == other.radius()
    }
}

impl fmt::Debug for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circle({:?}, r={})", self.c, self.radius())
    }
}

// =============================================================================
// Arc
// =============================================================================

/// A circular arc running counterclockwise from `p0` to `p1`.
///
/// The angle bounds are derived from the boundary points, so they always
/// agree with the current variable values.
///
/// `c` and `r` are authoritative for the arc's curve. Relations that act on
/// the underlying circle move only those, so `p0` and `p1` can end up off
/// the circle; their angles still bound the arc. Call
/// [`Arc::snap_endpoints`] to put them back on the circle.
#[derive(Clone)]
pub struct Arc {
    pub c: Point,
    pub r: Variable,
    pub p0: Point,
    pub p1: Point,
}

impl Arc {
    /// Build an arc from copies of the given points. The radius starts at
    /// the distance from `center` to `p0`.
    pub fn new(center: &Point, p0: &Point, p1: &Point) -> Self {
        let mut links = LinkMap::new();
        let radius = utils_2d::distance(center, p0);
        Self {
            c: center.copy_with(&mut links),
            r: Variable::new(radius),
            p0: p0.copy_with(&mut links),
            p1: p1.copy_with(&mut links),
        }
    }

    /// Arc of `radius` about `(cx, cy)` between two angles in radians.
    pub fn from_angles(cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        let c = Point::new(cx, cy);
        let p0 = utils_2d::point_at_angle(&c, radius, start_angle);
        let p1 = utils_2d::point_at_angle(&c, radius, end_angle);
        Self {
            c,
            r: Variable::new(radius),
            p0,
            p1,
        }
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.r.value()
    }

    pub fn start_angle(&self) -> f64 {
        utils_2d::angle_between(&self.c, &self.p0)
    }

    pub fn end_angle(&self) -> f64 {
        utils_2d::angle_between(&self.c, &self.p1)
    }

    /// Move each free boundary point radially onto the circle, keeping its
    /// angle. Pinned coordinates are left alone.
    pub fn snap_endpoints(&self) {
        for p in [&self.p0, &self.p1] {
            let angle = utils_2d::angle_between(&self.c, p);
            let target = utils_2d::point_at_angle(&self.c, self.radius(), angle);
            if !p.x.is_constant() {
                p.set_x(target.x());
            }
            if !p.y.is_constant() {
                p.set_y(target.y());
            }
        }
    }

    /// The full circle this arc lies on, sharing its variables.
    pub fn circle(&self) -> Circle {
        Circle {
            c: self.c.clone(),
            r: self.r.clone(),
        }
    }
}

impl Shape for Arc {
    fn child_figures(&self) -> Vec<Figure> {
        vec![
            Figure::Point(self.c.clone()),
            Figure::Point(self.p0.clone()),
            Figure::Point(self.p1.clone()),
        ]
    }

    fn closest_point(&self, query: &Point) -> Point {
        utils_2d::project_onto_arc(self, query)
    }

    fn translate(&self, from: &Point, to: &Point) {
        shift_cells([&self.c.x, &self.p0.x, &self.p1.x], to.x() - from.x());
        shift_cells([&self.c.y, &self.p0.y, &self.p1.y], to.y() - from.y());
    }

    fn variables(&self) -> Vec<Variable> {
        vec![
            self.c.x.clone(),
            self.c.y.clone(),
            self.r.clone(),
            self.p0.x.clone(),
            self.p0.y.clone(),
            self.p1.x.clone(),
            self.p1.y.clone(),
        ]
    }

    fn copy_with(&self, links: &mut LinkMap) -> Self {
        Self {
            c: self.c.copy_with(links),
            r: self.r.copy_with(links),
            p0: self.p0.copy_with(links),
            p1: self.p1.copy_with(links),
        }
    }
}

impl PartialEq for Arc {
    fn eq(&self, other: &Self) -> bool {
        self.c == other.c
            && self.radius() == other.radius()
            && self.p0 == other.p0
            && self.p1 == other.p1
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Arc({:?}, r={}, {:?} -> {:?})",
            self.c,
            self.radius(),
            self.p0,
            self.p1
        )
    }
}

// =============================================================================
// Figure
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureKind {
    Point,
    Line,
    Circle,
    Arc,
}

impl fmt::Display for FigureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "point"),
            Self::Line => write!(f, "line"),
            Self::Circle => write!(f, "circle"),
            Self::Arc => write!(f, "arc"),
        }
    }
}

/// Any sketch figure. Cloning yields another handle to the same variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
}

impl Figure {
    pub fn kind(&self) -> FigureKind {
        match self {
            Self::Point(_) => FigureKind::Point,
            Self::Line(_) => FigureKind::Line,
            Self::Circle(_) => FigureKind::Circle,
            Self::Arc(_) => FigureKind::Arc,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Self::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Self::Line(l) => Some(l),
            _ => None,
        }
    }

    /// Circles, and the full circle of an arc.
    pub fn as_circle(&self) -> Option<Circle> {
        match self {
            Self::Circle(c) => Some(c.clone()),
            Self::Arc(a) => Some(a.circle()),
            _ => None,
        }
    }

    pub fn as_arc(&self) -> Option<&Arc> {
        match self {
            Self::Arc(a) => Some(a),
            _ => None,
        }
    }

    /// True if every variable of the figure is pinned.
    pub fn is_constant(&self) -> bool {
        self.variables().iter().all(Variable::is_constant)
    }

    /// Handle identity: both figures are built from the very same variables.
    /// Unlike `==`, two equal-valued copies are not the same figure.
    pub fn is_same(&self, other: &Figure) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        let ours = self.variables();
        let theirs = other.variables();
        ours.len() == theirs.len() && ours.iter().zip(&theirs).all(|(a, b)| a.same_variable(b))
    }
}

impl Shape for Figure {
    fn child_figures(&self) -> Vec<Figure> {
        match self {
            Self::Point(p) => p.child_figures(),
            Self::Line(l) => l.child_figures(),
            Self::Circle(c) => c.child_figures(),
            Self::Arc(a) => a.child_figures(),
        }
    }

    fn closest_point(&self, query: &Point) -> Point {
        match self {
            Self::Point(p) => p.closest_point(query),
            Self::Line(l) => l.closest_point(query),
            Self::Circle(c) => c.closest_point(query),
            Self::Arc(a) => a.closest_point(query),
        }
    }

    fn translate(&self, from: &Point, to: &Point) {
        match self {
            Self::Point(p) => p.translate(from, to),
            Self::Line(l) => l.translate(from, to),
            Self::Circle(c) => c.translate(from, to),
            Self::Arc(a) => a.translate(from, to),
        }
    }

    fn variables(&self) -> Vec<Variable> {
        match self {
            Self::Point(p) => p.variables(),
            Self::Line(l) => l.variables(),
            Self::Circle(c) => c.variables(),
            Self::Arc(a) => a.variables(),
        }
    }

    fn copy_with(&self, links: &mut LinkMap) -> Self {
        match self {
            Self::Point(p) => Self::Point(p.copy_with(links)),
            Self::Line(l) => Self::Line(l.copy_with(links)),
            Self::Circle(c) => Self::Circle(c.copy_with(links)),
            Self::Arc(a) => Self::Arc(a.copy_with(links)),
        }
    }
}

impl From<Point> for Figure {
    fn from(p: Point) -> Self {
        Self::Point(p)
    }
}

impl From<Line> for Figure {
    fn from(l: Line) -> Self {
        Self::Line(l)
    }
}

impl From<Circle> for Figure {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Arc> for Figure {
    fn from(a: Arc) -> Self {
        Self::Arc(a)
    }
}
