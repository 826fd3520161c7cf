use nalgebra as na;

use crate::variables::Variable;

pub type Vector2 = na::Vector2<f64>;

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Vector2 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

impl ApproxEq for Point {
    fn approx_eq(&self, other: &Self) -> bool {
        self.position().approx_eq(&other.position())
    }
}

pub mod primitives;
pub use primitives::*;

pub mod utils_2d;

#[cfg(test)]
mod tests_primitives;
#[cfg(test)]
mod tests_utils;

/// Shift each distinct value cell among `variables` by `delta` exactly once.
///
/// Linked variables share a cell, so shifting every handle would move
/// the shared value several times.
pub(crate) fn shift_cells<'a>(variables: impl IntoIterator<Item = &'a Variable>, delta: f64) {
    let mut seen = Vec::new();
    for variable in variables {
        let cell = variable.cell_id();
        if seen.contains(&cell) {
            continue;
        }
        seen.push(cell);
        variable.shift(delta);
    }
}
