//! Per-complex fit windows.
//!
//! A `FitWindow` is the observed-frame slice of the spectrum covering one
//! complex: the rest-frame span of its member lines plus the configured
//! half-width, all shifted by (1+z). Windows borrow the spectrum; they are
//! created per fit call and discarded afterwards.

use crate::domain::{Complex, Line, PipelineConfig, Spectrum};
use crate::fit::continuum::estimate_continuum;

#[derive(Debug, Clone)]
pub struct FitWindow<'a> {
    pub complex: Complex,
    pub wavelength: &'a [f64],
    pub flux: &'a [f64],
    pub error: &'a [f64],
    /// Expected observed-frame center per member line (rest x (1+z)).
    pub centers_obs: Vec<f64>,
    /// Local continuum estimate for the window.
    pub continuum: f64,
    pub continuum_err: f64,
}

impl<'a> FitWindow<'a> {
    /// Extract the window for a complex, or `None` when the spectrum does
    /// not cover it at all.
    pub fn extract(
        spectrum: &'a Spectrum,
        complex: Complex,
        config: &PipelineConfig,
    ) -> Option<Self> {
        let shift = 1.0 + spectrum.redshift();
        let members = complex.members();
        let centers_obs: Vec<f64> = members
            .iter()
            .map(|line| line.rest_wavelength() * shift)
            .collect();

        // Per-line half-widths from the catalog, unless overridden.
        let half_width = |line: &Line| {
            config.window_half_width.unwrap_or(line.fit_half_width()) * shift
        };
        let lo_bound = centers_obs.first()? - half_width(members.first()?);
        let hi_bound = centers_obs.last()? + half_width(members.last()?);

        let wavelength = spectrum.wavelength();
        let lo = wavelength.partition_point(|&w| w < lo_bound);
        let hi = wavelength.partition_point(|&w| w <= hi_bound);
        if lo >= hi {
            return None;
        }

        let wave = &wavelength[lo..hi];
        let flux = &spectrum.flux()[lo..hi];
        let error = &spectrum.error()[lo..hi];

        // Sideband exclusion in Å: a fixed number of resolution elements at
        // the window center.
        let mid = centers_obs.iter().sum::<f64>() / centers_obs.len() as f64;
        let exclusion = config.continuum_exclusion_res * spectrum.resolution_element(mid);
        let continuum = estimate_continuum(
            wave,
            flux,
            &centers_obs,
            exclusion,
            config.min_continuum_pixels,
        );

        Some(Self {
            complex,
            wavelength: wave,
            flux,
            error,
            centers_obs,
            continuum: continuum.level,
            continuum_err: continuum.err,
        })
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
}
