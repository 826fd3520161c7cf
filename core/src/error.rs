use crate::sketch::{EntityId, RelationKind};
use thiserror::Error;

/// Recoverable failures when building or loading a sketch.
#[derive(Debug, Error)]
pub enum SketchError {
    #[error("Unknown cell index: {0}")]
    UnknownCell(usize),

    #[error("Unknown figure: {0}")]
    UnknownFigure(EntityId),

    #[error("Duplicate figure id: {0}")]
    DuplicateFigure(EntityId),

    #[error("Figure {figure} has no child figure {part}")]
    UnknownPart { figure: EntityId, part: usize },

    #[error("Figure {figure} has no variable {index}")]
    UnknownVariable { figure: EntityId, index: usize },

    #[error("Invalid operands for {kind} relation: {reason}")]
    InvalidOperands { kind: RelationKind, reason: String },

    #[error("Relation {kind} refers to a figure that is not part of the sketch")]
    DetachedOperand { kind: RelationKind },

    #[error("Invalid solver config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
