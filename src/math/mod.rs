//! Mathematical utilities: Gaussian profiles, weighted least squares,
//! robust statistics.

pub mod gaussian;
pub mod stats;
pub mod wls;

pub use gaussian::*;
pub use stats::*;
pub use wls::*;
