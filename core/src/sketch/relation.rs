//! The contract every constraint kind implements.

use crate::geometry::Figure;
use crate::variables::{Variable, VariableDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constraint kinds known to the sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Midpoint,
    EqualValues,
    ColinearPoints,
    PointOnCircle,
    EqualLength,
    TangentLine,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Midpoint => "midpoint",
            Self::EqualValues => "equal values",
            Self::ColinearPoints => "colinear points",
            Self::PointOnCircle => "point on circle",
            Self::EqualLength => "equal length",
            Self::TangentLine => "tangent line",
        };
        write!(f, "{}", name)
    }
}

/// What a relation was built from: whole figures, or bare variables.
#[derive(Debug, Clone)]
pub enum Operand {
    Figure(Figure),
    Variable(Variable),
}

impl From<Figure> for Operand {
    fn from(figure: Figure) -> Self {
        Self::Figure(figure)
    }
}

impl From<Variable> for Operand {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

/// One constraint instance over a fixed set of variables.
///
/// `deltas` proposes, for each variable, the change that would satisfy the
/// relation if every other variable stayed put. Relations sharing a
/// variable will disagree; the solver reconciles them.
pub trait Relation: fmt::Debug {
    fn kind(&self) -> RelationKind;

    /// The only variables `deltas` may name.
    fn variables(&self) -> &[Variable];

    fn deltas(&self) -> Vec<VariableDelta>;

    /// Non-negative violation; `0` when satisfied.
    fn error(&self) -> f64;

    /// The figures or variables this relation was constructed from, in
    /// constructor order.
    fn operands(&self) -> Vec<Operand>;
}
