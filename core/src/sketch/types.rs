use super::relation::Relation;
use super::solver::{SketchSolver, SolveResult, SolverConfig};
use crate::error::SketchError;
use crate::geometry::Figure;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Stable identifier of a figure within a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random EntityId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an ID from a specific UUID (useful for restoration).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a deterministic ID from a string seed (e.g. "Sketch1_Base").
    pub fn new_deterministic(seed: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SketchEntity {
    pub id: EntityId,
    pub figure: Figure,
}

/// Figures, the relations over their variables, and the solver settings.
///
/// A sketch owns `Rc` handles and is therefore confined to one thread.
#[derive(Debug, Default)]
pub struct Sketch {
    pub entities: Vec<SketchEntity>,
    pub relations: Vec<Box<dyn Relation>>,
    pub config: SolverConfig,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add a figure under a fresh id. The sketch keeps the given handle, so
    /// relations built from the same figure see the sketch's variables.
    pub fn add_figure(&mut self, figure: impl Into<Figure>) -> EntityId {
        let id = EntityId::new();
        self.entities.push(SketchEntity {
            id,
            figure: figure.into(),
        });
        id
    }

    /// Add a figure under a caller-chosen id.
    pub fn insert_figure(&mut self, id: EntityId, figure: impl Into<Figure>) -> Result<(), SketchError> {
        if self.figure(id).is_some() {
            return Err(SketchError::DuplicateFigure(id));
        }
        self.entities.push(SketchEntity {
            id,
            figure: figure.into(),
        });
        Ok(())
    }

    pub fn figure(&self, id: EntityId) -> Option<&Figure> {
        self.entities.iter().find(|e| e.id == id).map(|e| &e.figure)
    }

    /// Handles to every figure, in insertion order.
    pub fn figures(&self) -> Vec<Figure> {
        self.entities.iter().map(|e| e.figure.clone()).collect()
    }

    /// The id under which this exact figure handle was added.
    pub fn id_of(&self, figure: &Figure) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.figure.is_same(figure))
            .map(|e| e.id)
    }

    pub fn add_relation(&mut self, relation: impl Relation + 'static) {
        self.relations.push(Box::new(relation));
    }

    pub fn add_boxed_relation(&mut self, relation: Box<dyn Relation>) {
        self.relations.push(relation);
    }

    pub fn relations(&self) -> &[Box<dyn Relation>] {
        &self.relations
    }

    /// Current total error over all relations.
    pub fn error(&self) -> f64 {
        SketchSolver::total_error(&self.relations)
    }

    pub fn solve(&self, damped: bool) -> SolveResult {
        self.solve_with_constant_figures(&[], damped)
    }

    /// Solve with the listed figures pinned for this call only. Unknown ids
    /// are logged and ignored.
    pub fn solve_with_constant_figures(&self, constant: &[EntityId], damped: bool) -> SolveResult {
        let mut pinned = Vec::with_capacity(constant.len());
        for id in constant {
            match self.figure(*id) {
                Some(figure) => pinned.push(figure.clone()),
                None => warn!(%id, "Ignoring unknown constant figure"),
            }
        }
        SketchSolver::solve_with_result(
            &self.config,
            &self.relations,
            &self.figures(),
            &pinned,
            damped,
        )
    }
}
