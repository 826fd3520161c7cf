pub mod error;
pub mod geometry;
pub mod sketch;
pub mod variables;

pub use error::SketchError;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
