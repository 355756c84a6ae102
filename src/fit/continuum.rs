//! Local continuum estimation.
//!
//! The continuum level around a line window is the median of the *sideband*
//! pixels: window pixels farther than a fixed number of resolution elements
//! from every member line center. The median is robust against the line
//! wings themselves; the uncertainty is the MAD-based standard error of the
//! median.
//!
//! When too few sideband pixels remain (narrow windows, crowded complexes)
//! the estimate degrades to the median of the whole window with a wide
//! uncertainty. It never fails: the fitter treats the continuum as a free
//! parameter anyway and only needs a defensible level for non-converged
//! reporting.

use crate::math::{mad, median_mut, std_dev};

/// MAD-to-sigma conversion for a normal distribution (1 / 0.6745).
const MAD_SIGMA: f64 = 1.4826;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuumEstimate {
    pub level: f64,
    pub err: f64,
    /// Number of sideband pixels actually used (0 in fallback mode).
    pub n_sideband: usize,
}

/// Estimate the continuum level for a line window.
///
/// `exclusion` is the half-width (Å) around each line center whose pixels are
/// excluded from the sidebands.
pub fn estimate_continuum(
    wavelength: &[f64],
    flux: &[f64],
    centers: &[f64],
    exclusion: f64,
    min_pixels: usize,
) -> ContinuumEstimate {
    let mut sideband: Vec<f64> = wavelength
        .iter()
        .zip(flux.iter())
        .filter(|(w, _)| centers.iter().all(|c| (*w - c).abs() > exclusion))
        .map(|(_, f)| *f)
        .collect();

    if sideband.len() >= min_pixels.max(1) {
        let n = sideband.len();
        let level = median_mut(&mut sideband).unwrap_or(0.0);
        let scatter = mad(&sideband, level).unwrap_or(0.0) * MAD_SIGMA;
        let err = scatter / (n as f64).sqrt();
        return ContinuumEstimate {
            level,
            err,
            n_sideband: n,
        };
    }

    // Fallback: whole-window median, wide uncertainty.
    let mut all = flux.to_vec();
    let level = median_mut(&mut all).unwrap_or(0.0);
    let wide = std_dev(flux).unwrap_or(0.0);
    let err = if wide > 0.0 { wide } else { level.abs().max(1.0) };
    ContinuumEstimate {
        level,
        err,
        n_sideband: 0,
    }
}
