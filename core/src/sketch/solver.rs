use super::relation::{Relation, RelationKind};
use crate::error::SketchError;
use crate::geometry::{Figure, Shape};
use crate::variables::{CellId, PinGuard, Variable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Tuning knobs for one relaxation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Hard cap on relaxation passes per solve call
    pub max_iterations: usize,
    /// Total error at or below which the sketch counts as solved
    pub tolerance: f64,
    /// Step factor applied to combined deltas in an undamped solve
    pub relaxation: f64,
    /// Step factor applied to combined deltas in a damped solve
    pub damped_relaxation: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-9,
            relaxation: 0.5,
            damped_relaxation: 0.1,
        }
    }
}

impl SolverConfig {
    /// Reject settings that would make relaxation diverge. Both step
    /// factors must lie strictly between 0 and 1, and the tolerance must be
    /// a finite, non-negative number.
    pub fn validate(&self) -> Result<(), SketchError> {
        for (name, factor) in [
            ("relaxation", self.relaxation),
            ("damped_relaxation", self.damped_relaxation),
        ] {
            if !(factor > 0.0 && factor < 1.0) {
                return Err(SketchError::InvalidConfig(format!(
                    "{} must be in (0, 1), got {}",
                    name, factor
                )));
            }
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(SketchError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    pub fn step_factor(&self, damped: bool) -> f64 {
        if damped {
            self.damped_relaxation
        } else {
            self.relaxation
        }
    }
}

/// Terminal state of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Converged,
    IterationLimitReached,
}

/// Error of a single relation after solving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationStatus {
    /// Index of the relation in the solved slice
    pub index: usize,
    pub kind: RelationKind,
    pub error: f64,
    /// Whether this relation alone is within tolerance
    pub satisfied: bool,
}

/// Result of constraint solving with detailed status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Whether the total error ended within tolerance
    pub converged: bool,
    /// Number of relaxation passes performed
    pub iterations: usize,
    /// Total error before the first pass
    pub initial_error: f64,
    /// Total error on return
    pub error: f64,
    pub relation_count: usize,
    pub figure_count: usize,
    pub relation_errors: Vec<RelationStatus>,
}

impl SolveResult {
    pub fn status_message(&self) -> String {
        let unsatisfied = self.relation_errors.iter().filter(|r| !r.satisfied).count();
        match self.status {
            SolveStatus::Converged => format!(
                "Converged after {} iterations ({} relations, error {:.3e})",
                self.iterations, self.relation_count, self.error
            ),
            SolveStatus::IterationLimitReached => format!(
                "Stopped after {} iterations with error {:.3e}; {} of {} relations unsatisfied",
                self.iterations, self.error, unsatisfied, self.relation_count
            ),
        }
    }
}

/// One cell's accumulated corrections within a pass.
struct CombinedDelta {
    variable: Variable,
    sum: f64,
    count: usize,
}

pub struct SketchSolver;

impl SketchSolver {
    /// Solve with the default configuration and return the final total error.
    pub fn solve(
        relations: &[Box<dyn Relation>],
        figures: &[Figure],
        constant_figures: &[Figure],
        damped: bool,
    ) -> f64 {
        Self::solve_with_result(&SolverConfig::default(), relations, figures, constant_figures, damped)
            .error
    }

    /// Relax until the total error drops to `config.tolerance` or the
    /// iteration cap is hit. Variables of `constant_figures` are pinned for
    /// this call only.
    pub fn solve_with_result(
        config: &SolverConfig,
        relations: &[Box<dyn Relation>],
        figures: &[Figure],
        constant_figures: &[Figure],
        damped: bool,
    ) -> SolveResult {
        let pinned: Vec<Variable> = constant_figures.iter().flat_map(Shape::variables).collect();
        let guard = PinGuard::pin(&pinned);

        let factor = config.step_factor(damped);
        let initial_error = Self::total_error(relations);
        let mut error = initial_error;
        let mut iterations = 0;

        debug!(
            relations = relations.len(),
            figures = figures.len(),
            pinned_cells = guard.len(),
            damped,
            initial_error,
            "Solving sketch"
        );

        while error > config.tolerance && iterations < config.max_iterations {
            Self::relax(relations, factor);
            iterations += 1;
            error = Self::total_error(relations);
            trace!(iteration = iterations, error, "Relaxation pass");
        }

        drop(guard);

        let converged = error <= config.tolerance;
        let status = if converged {
            SolveStatus::Converged
        } else {
            SolveStatus::IterationLimitReached
        };

        let relation_errors = relations
            .iter()
            .enumerate()
            .map(|(index, relation)| {
                let error = relation.error();
                RelationStatus {
                    index,
                    kind: relation.kind(),
                    error,
                    satisfied: error <= config.tolerance,
                }
            })
            .collect();

        debug!(?status, iterations, error, "Solve finished");

        SolveResult {
            status,
            converged,
            iterations,
            initial_error,
            error,
            relation_count: relations.len(),
            figure_count: figures.len(),
            relation_errors,
        }
    }

    /// Sum of every relation's error.
    pub fn total_error(relations: &[Box<dyn Relation>]) -> f64 {
        relations.iter().map(|r| r.error()).sum()
    }

    /// One pass: gather deltas, average them per cell, scale and apply.
    fn relax(relations: &[Box<dyn Relation>], factor: f64) {
        let mut order: Vec<CellId> = Vec::new();
        let mut combined: HashMap<CellId, CombinedDelta> = HashMap::new();

        for relation in relations {
            let owned = relation.variables();
            for delta in relation.deltas() {
                assert!(
                    owned.iter().any(|v| v.same_variable(&delta.variable)),
                    "{} relation proposed a delta for {:?}, which it does not own",
                    relation.kind(),
                    delta.variable
                );
                if !delta.delta.is_finite() || delta.variable.is_constant() {
                    continue;
                }
                let cell = delta.variable.cell_id();
                let entry = combined.entry(cell).or_insert_with(|| {
                    order.push(cell);
                    CombinedDelta {
                        variable: delta.variable.clone(),
                        sum: 0.0,
                        count: 0,
                    }
                });
                entry.sum += delta.delta;
                entry.count += 1;
            }
        }

        for cell in order {
            if let Some(entry) = combined.get(&cell) {
                entry.variable.shift(factor * entry.sum / entry.count as f64);
            }
        }
    }
}
