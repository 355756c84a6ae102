//! Line measurement extraction.
//!
//! Converts fit parameters into physical quantities:
//!
//! - integrated flux `A σ sqrt(2π)` with product error propagation
//! - equivalent width (flux / continuum, positive for emission; flagged
//!   invalid, not NaN and not zero, when the continuum is non-positive)
//! - velocity offset and FWHM in km/s
//! - S/N = |flux| / flux_err
//!
//! A non-converged fit produces a measurement with `measured = false` and
//! `snr = 0` rather than an absence, so downstream consumers never
//! special-case missing lines.

use crate::domain::{C_KMS, Ew, LineFitResult, LineMeasurement};
use crate::math::{FWHM_PER_SIGMA, integrated_flux};

/// Derive a [`LineMeasurement`] from one fit result.
pub fn extract_measurement(fit: &LineFitResult, redshift: f64) -> LineMeasurement {
    if !fit.converged {
        return LineMeasurement::not_measured(fit.line);
    }

    let flux = integrated_flux(fit.amplitude, fit.sigma);
    let flux_err = if fit.amplitude > 0.0 && fit.sigma > 0.0 {
        flux.abs()
            * ((fit.amplitude_err / fit.amplitude).powi(2)
                + (fit.sigma_err / fit.sigma).powi(2))
            .sqrt()
    } else {
        0.0
    };

    let ew = if fit.continuum > 0.0 {
        let value = flux / fit.continuum;
        let err = if flux > 0.0 {
            value.abs()
                * ((flux_err / flux).powi(2) + (fit.continuum_err / fit.continuum).powi(2)).sqrt()
        } else {
            0.0
        };
        Some(Ew { value, err })
    } else {
        None
    };

    let lambda_exp = fit.line.rest_wavelength() * (1.0 + redshift);
    let velocity = C_KMS * (fit.centroid - lambda_exp) / lambda_exp;
    let velocity_err = C_KMS * fit.centroid_err / lambda_exp;
    let fwhm_kms = if fit.centroid > 0.0 {
        FWHM_PER_SIGMA * fit.sigma / fit.centroid * C_KMS
    } else {
        0.0
    };

    let snr = if flux_err > 0.0 && flux_err.is_finite() {
        flux.abs() / flux_err
    } else {
        0.0
    };

    LineMeasurement {
        line: fit.line,
        flux,
        flux_err,
        ew,
        velocity,
        velocity_err,
        fwhm_kms,
        snr,
        measured: true,
    }
}
