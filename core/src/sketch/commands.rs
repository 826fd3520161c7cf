//! Explicit editing commands.
//!
//! An editor mutates the sketch only through these, strictly between solve
//! calls, instead of writing variables from event callbacks.

use super::solver::SolveResult;
use super::types::{EntityId, Sketch};
use crate::error::SketchError;
use crate::geometry::{Point, Shape};
use crate::variables::{PinGuard, Variable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assign a value to a variable, keep it fixed while the rest of the sketch
/// settles, then release it unless `hold` is set.
#[derive(Debug, Clone)]
pub struct PinAndSolve {
    pub variable: Variable,
    pub value: f64,
    pub hold: bool,
}

impl PinAndSolve {
    pub fn new(variable: &Variable, value: f64) -> Self {
        Self {
            variable: variable.clone(),
            value,
            hold: false,
        }
    }

    /// Keep the variable pinned after the solve.
    pub fn holding(mut self) -> Self {
        self.hold = true;
        self
    }

    pub fn apply(&self, sketch: &Sketch) -> SolveResult {
        debug!(variable = %self.variable.id(), value = self.value, hold = self.hold, "Pin and solve");
        self.variable.set_value(self.value);

        if self.hold {
            self.variable.set_constant(true);
            return sketch.solve(true);
        }

        let _pin = PinGuard::pin([&self.variable]);
        sketch.solve(true)
    }
}

/// Move a figure by `to - from` and solve with it held in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drag {
    pub figure: EntityId,
    pub from: [f64; 2],
    pub to: [f64; 2],
    #[serde(default)]
    pub damped: bool,
}

impl Drag {
    pub fn new(figure: EntityId, from: [f64; 2], to: [f64; 2]) -> Self {
        Self {
            figure,
            from,
            to,
            damped: false,
        }
    }

    pub fn apply(&self, sketch: &Sketch) -> Result<SolveResult, SketchError> {
        let figure = sketch
            .figure(self.figure)
            .ok_or(SketchError::UnknownFigure(self.figure))?;

        let from = Point::new(self.from[0], self.from[1]);
        let to = Point::new(self.to[0], self.to[1]);
        figure.translate(&from, &to);

        debug!(figure = %self.figure, from = ?self.from, to = ?self.to, "Dragged figure");
        Ok(sketch.solve_with_constant_figures(&[self.figure], self.damped))
    }
}
