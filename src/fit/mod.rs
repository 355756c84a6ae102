//! Line-profile fitting.
//!
//! Responsibilities:
//!
//! - extract per-complex fit windows from a spectrum
//! - estimate the local continuum level (robust, never fails)
//! - fit all members of a complex simultaneously: one shared continuum, one
//!   shared velocity width and offset, independent amplitudes
//! - convert fit parameters into physical line measurements

pub mod continuum;
pub mod fitter;
pub mod grid;
pub mod measure;
pub mod profile;
pub mod window;

pub use continuum::*;
pub use fitter::*;
pub use grid::*;
pub use measure::*;
pub use profile::*;
pub use window::*;
