//! Concrete constraint kinds.

use super::relation::{Operand, Relation, RelationKind};
use crate::error::SketchError;
use crate::geometry::utils_2d::{
    average_of_points, distance, distance_to_circle, forced_regression_line,
    least_squares_regression, normalize, point_deltas, point_in_direction, project_onto_circle,
    project_onto_line, reflect_over,
};
use crate::geometry::{Circle, Figure, Line, Point, Shape};
use crate::variables::{Variable, VariableDelta};

// =============================================================================
// Midpoint
// =============================================================================

/// `point` sits halfway between the endpoints of `line`.
#[derive(Debug)]
pub struct Midpoint {
    point: Point,
    line: Line,
    variables: Vec<Variable>,
}

impl Midpoint {
    pub fn new(point: &Point, line: &Line) -> Self {
        let mut variables = point.variables();
        variables.extend(line.variables());
        Self {
            point: point.clone(),
            line: line.clone(),
            variables,
        }
    }
}

impl Relation for Midpoint {
    fn kind(&self) -> RelationKind {
        RelationKind::Midpoint
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn deltas(&self) -> Vec<VariableDelta> {
        let mut deltas = Vec::with_capacity(6);

        let midpoint = average_of_points(&[&self.line.p0, &self.line.p1]);
        deltas.extend(point_deltas(&self.point, &midpoint));

        let reflect_p0 = reflect_over(&self.line.p0, &self.point);
        deltas.extend(point_deltas(&self.line.p1, &reflect_p0));

        let reflect_p1 = reflect_over(&self.line.p1, &self.point);
        deltas.extend(point_deltas(&self.line.p0, &reflect_p1));

        deltas
    }

    fn error(&self) -> f64 {
        let midpoint = average_of_points(&[&self.line.p0, &self.line.p1]);
        distance(&self.point, &midpoint)
    }

    fn operands(&self) -> Vec<Operand> {
        vec![
            Figure::Point(self.point.clone()).into(),
            Figure::Line(self.line.clone()).into(),
        ]
    }
}

// =============================================================================
// EqualValues
// =============================================================================

/// All variables hold the same value, e.g. two radii.
#[derive(Debug)]
pub struct EqualValues {
    variables: Vec<Variable>,
}

impl EqualValues {
    pub fn new(variables: &[Variable]) -> Self {
        Self {
            variables: variables.to_vec(),
        }
    }

    fn mean(&self) -> f64 {
        let sum: f64 = self.variables.iter().map(Variable::value).sum();
        sum / self.variables.len() as f64
    }
}

impl Relation for EqualValues {
    fn kind(&self) -> RelationKind {
        RelationKind::EqualValues
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn deltas(&self) -> Vec<VariableDelta> {
        if self.variables.is_empty() {
            return Vec::new();
        }
        let mean = self.mean();
        self.variables
            .iter()
            .map(|v| VariableDelta::toward(v, mean))
            .collect()
    }

    fn error(&self) -> f64 {
        let values = self.variables.iter().map(Variable::value);
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let min = values.fold(f64::INFINITY, f64::min);
        if max < min {
            return 0.0;
        }
        max - min
    }

    fn operands(&self) -> Vec<Operand> {
        self.variables.iter().cloned().map(Operand::Variable).collect()
    }
}

// =============================================================================
// ColinearPoints
// =============================================================================

/// All points lie on one line.
///
/// The line is forced through pinned or linked points when possible and
/// fitted by least squares otherwise.
#[derive(Debug)]
pub struct ColinearPoints {
    points: Vec<Point>,
    variables: Vec<Variable>,
}

impl ColinearPoints {
    pub fn new(points: &[Point]) -> Self {
        Self {
            points: points.to_vec(),
            variables: points.iter().flat_map(Shape::variables).collect(),
        }
    }

    fn fit(&self) -> Line {
        let refs: Vec<&Point> = self.points.iter().collect();
        forced_regression_line(&refs).unwrap_or_else(|| least_squares_regression(&refs))
    }
}

impl Relation for ColinearPoints {
    fn kind(&self) -> RelationKind {
        RelationKind::ColinearPoints
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn deltas(&self) -> Vec<VariableDelta> {
        if self.points.len() < 3 {
            return Vec::new();
        }
        let line = self.fit();
        self.points
            .iter()
            .flat_map(|p| point_deltas(p, &project_onto_line(&line, p)))
            .collect()
    }

    fn error(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let line = self.fit();
        self.points
            .iter()
            .map(|p| distance(p, &project_onto_line(&line, p)))
            .sum()
    }

    fn operands(&self) -> Vec<Operand> {
        self.points
            .iter()
            .map(|p| Figure::Point(p.clone()).into())
            .collect()
    }
}

// =============================================================================
// PointOnCircle
// =============================================================================

/// `point` lies on the boundary of `circle`.
#[derive(Debug)]
pub struct PointOnCircle {
    point: Point,
    circle: Circle,
    variables: Vec<Variable>,
}

impl PointOnCircle {
    pub fn new(point: &Point, circle: &Circle) -> Self {
        let mut variables = point.variables();
        variables.extend(circle.variables());
        Self {
            point: point.clone(),
            circle: circle.clone(),
            variables,
        }
    }
}

impl Relation for PointOnCircle {
    fn kind(&self) -> RelationKind {
        RelationKind::PointOnCircle
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn deltas(&self) -> Vec<VariableDelta> {
        let mut deltas = Vec::with_capacity(5);

        let on_circle = project_onto_circle(&self.circle, &self.point);
        deltas.extend(point_deltas(&self.point, &on_circle));

        let center = point_in_direction(&self.point, &self.circle.c, self.circle.radius());
        deltas.extend(point_deltas(&self.circle.c, &center));

        deltas.push(VariableDelta::toward(
            &self.circle.r,
            distance(&self.circle.c, &self.point),
        ));

        deltas
    }

    fn error(&self) -> f64 {
        distance_to_circle(&self.circle, &self.point)
    }

    fn operands(&self) -> Vec<Operand> {
        vec![
            Figure::Point(self.point.clone()).into(),
            Figure::Circle(self.circle.clone()).into(),
        ]
    }
}

// =============================================================================
// EqualLength
// =============================================================================

/// All lines have the same length. Each line is rescaled about its own
/// midpoint, so its direction and position are kept.
#[derive(Debug)]
pub struct EqualLength {
    lines: Vec<Line>,
    variables: Vec<Variable>,
}

impl EqualLength {
    pub fn new(lines: &[Line]) -> Self {
        Self {
            lines: lines.to_vec(),
            variables: lines.iter().flat_map(Shape::variables).collect(),
        }
    }

    fn mean_length(&self) -> f64 {
        let sum: f64 = self.lines.iter().map(Line::length).sum();
        sum / self.lines.len() as f64
    }
}

impl Relation for EqualLength {
    fn kind(&self) -> RelationKind {
        RelationKind::EqualLength
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn deltas(&self) -> Vec<VariableDelta> {
        if self.lines.is_empty() {
            return Vec::new();
        }
        let half = self.mean_length() / 2.0;
        let mut deltas = Vec::with_capacity(self.lines.len() * 4);
        for line in &self.lines {
            let mid = average_of_points(&[&line.p0, &line.p1]).position();
            let dir = normalize(line.direction());
            deltas.extend(point_deltas(&line.p0, &Point::at(mid - dir * half)));
            deltas.extend(point_deltas(&line.p1, &Point::at(mid + dir * half)));
        }
        deltas
    }

    fn error(&self) -> f64 {
        if self.lines.is_empty() {
            return 0.0;
        }
        let mean = self.mean_length();
        self.lines.iter().map(|l| (l.length() - mean).abs()).sum()
    }

    fn operands(&self) -> Vec<Operand> {
        self.lines
            .iter()
            .map(|l| Figure::Line(l.clone()).into())
            .collect()
    }
}

// =============================================================================
// TangentLine
// =============================================================================

/// The infinite line through `line` touches `circle` at one point.
#[derive(Debug)]
pub struct TangentLine {
    line: Line,
    circle: Circle,
    variables: Vec<Variable>,
}

impl TangentLine {
    pub fn new(line: &Line, circle: &Circle) -> Self {
        let mut variables = line.variables();
        variables.extend(circle.variables());
        Self {
            line: line.clone(),
            circle: circle.clone(),
            variables,
        }
    }
}

impl Relation for TangentLine {
    fn kind(&self) -> RelationKind {
        RelationKind::TangentLine
    }

    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn deltas(&self) -> Vec<VariableDelta> {
        let foot = project_onto_line(&self.line, &self.circle.c);
        let gap = distance(&foot, &self.circle.c);
        let normal = normalize(self.circle.c.position() - foot.position());
        let offset = normal * (gap - self.circle.radius());

        let mut deltas = Vec::with_capacity(7);
        deltas.push(VariableDelta::toward(&self.circle.r, gap));
        deltas.extend(point_deltas(
            &self.circle.c,
            &Point::at(self.circle.c.position() - offset),
        ));
        for p in [&self.line.p0, &self.line.p1] {
            deltas.extend(point_deltas(p, &Point::at(p.position() + offset)));
        }
        deltas
    }

    fn error(&self) -> f64 {
        let foot = project_onto_line(&self.line, &self.circle.c);
        (distance(&foot, &self.circle.c) - self.circle.radius()).abs()
    }

    fn operands(&self) -> Vec<Operand> {
        vec![
            Figure::Line(self.line.clone()).into(),
            Figure::Circle(self.circle.clone()).into(),
        ]
    }
}

// =============================================================================
// Link constraints
// =============================================================================

/// Make `line` horizontal by linking the y coordinates of its endpoints.
pub fn horizontal(line: &Line) {
    line.p1.y.link(&line.p0.y);
}

/// Make `line` vertical by linking the x coordinates of its endpoints.
pub fn vertical(line: &Line) {
    line.p1.x.link(&line.p0.x);
}

/// Make `b` coincide with `a` by linking both coordinates.
pub fn coincident(a: &Point, b: &Point) {
    b.x.link(&a.x);
    b.y.link(&a.y);
}

// =============================================================================
// Construction from operands
// =============================================================================

fn invalid(kind: RelationKind, reason: impl Into<String>) -> SketchError {
    SketchError::InvalidOperands {
        kind,
        reason: reason.into(),
    }
}

fn expect_point(kind: RelationKind, operand: &Operand) -> Result<Point, SketchError> {
    match operand {
        Operand::Figure(Figure::Point(p)) => Ok(p.clone()),
        other => Err(invalid(kind, format!("expected a point, found {}", describe(other)))),
    }
}

fn expect_line(kind: RelationKind, operand: &Operand) -> Result<Line, SketchError> {
    match operand {
        Operand::Figure(Figure::Line(l)) => Ok(l.clone()),
        other => Err(invalid(kind, format!("expected a line, found {}", describe(other)))),
    }
}

fn expect_circle(kind: RelationKind, operand: &Operand) -> Result<Circle, SketchError> {
    match operand {
        Operand::Figure(figure) => figure
            .as_circle()
            .ok_or_else(|| invalid(kind, format!("expected a circle, found {}", figure.kind()))),
        other => Err(invalid(kind, format!("expected a circle, found {}", describe(other)))),
    }
}

fn expect_variable(kind: RelationKind, operand: &Operand) -> Result<Variable, SketchError> {
    match operand {
        Operand::Variable(v) => Ok(v.clone()),
        other => Err(invalid(kind, format!("expected a variable, found {}", describe(other)))),
    }
}

fn describe(operand: &Operand) -> String {
    match operand {
        Operand::Figure(f) => f.kind().to_string(),
        Operand::Variable(_) => "variable".to_string(),
    }
}

fn expect_count(kind: RelationKind, operands: &[Operand], count: usize) -> Result<(), SketchError> {
    if operands.len() != count {
        return Err(invalid(
            kind,
            format!("expected {} operands, found {}", count, operands.len()),
        ));
    }
    Ok(())
}

fn expect_at_least(kind: RelationKind, operands: &[Operand], count: usize) -> Result<(), SketchError> {
    if operands.len() < count {
        return Err(invalid(
            kind,
            format!("expected at least {} operands, found {}", count, operands.len()),
        ));
    }
    Ok(())
}

/// Build a relation of `kind` from its operands, checking their shapes.
pub fn build(kind: RelationKind, operands: &[Operand]) -> Result<Box<dyn Relation>, SketchError> {
    let relation: Box<dyn Relation> = match kind {
        RelationKind::Midpoint => {
            expect_count(kind, operands, 2)?;
            let point = expect_point(kind, &operands[0])?;
            let line = expect_line(kind, &operands[1])?;
            Box::new(Midpoint::new(&point, &line))
        }
        RelationKind::EqualValues => {
            expect_at_least(kind, operands, 2)?;
            let variables = operands
                .iter()
                .map(|o| expect_variable(kind, o))
                .collect::<Result<Vec<_>, _>>()?;
            Box::new(EqualValues::new(&variables))
        }
        RelationKind::ColinearPoints => {
            expect_at_least(kind, operands, 3)?;
            let points = operands
                .iter()
                .map(|o| expect_point(kind, o))
                .collect::<Result<Vec<_>, _>>()?;
            Box::new(ColinearPoints::new(&points))
        }
        RelationKind::PointOnCircle => {
            expect_count(kind, operands, 2)?;
            let point = expect_point(kind, &operands[0])?;
            let circle = expect_circle(kind, &operands[1])?;
            Box::new(PointOnCircle::new(&point, &circle))
        }
        RelationKind::EqualLength => {
            expect_at_least(kind, operands, 2)?;
            let lines = operands
                .iter()
                .map(|o| expect_line(kind, o))
                .collect::<Result<Vec<_>, _>>()?;
            Box::new(EqualLength::new(&lines))
        }
        RelationKind::TangentLine => {
            expect_count(kind, operands, 2)?;
            let line = expect_line(kind, &operands[0])?;
            let circle = expect_circle(kind, &operands[1])?;
            Box::new(TangentLine::new(&line, &circle))
        }
    };
    Ok(relation)
}
