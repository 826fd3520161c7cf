//! Scalar unknowns of a sketch.
//!
//! Provides the [`Variable`] handle with:
//! - A value and a constancy flag
//! - Linking, where several variables share one value cell
//! - Deep copies that optionally keep links inside the copied group

pub mod types;


pub use types::{CellId, LinkMap, PinGuard, Variable, VariableDelta, VariableId};
