pub mod types;
pub mod relation;
pub mod relations;
pub mod solver;
pub mod commands;
pub mod document;
pub mod selection;

pub use commands::{Drag, PinAndSolve};
pub use document::{FigureRef, OperandRecord, RelationRecord, SketchDocument, VariableRef};
pub use relation::{Operand, Relation, RelationKind};
pub use solver::{SketchSolver, SolveResult, SolveStatus, SolverConfig};
pub use types::{EntityId, Sketch, SketchEntity};
