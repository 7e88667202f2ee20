//! Sheet geometry and text fitting.

mod fit;
mod grid;

pub use fit::{FitResult, TextFitter, MIN_STEP};
pub use grid::{layout, Grid, GridCell, GridSpec, MAX_CELLS};
