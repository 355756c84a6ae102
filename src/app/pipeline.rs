//! The full diagnostic pipeline.
//!
//! One spectrum in, one result bundle out:
//! window extraction -> continuum -> complex fits -> measurements ->
//! {classification, properties}
//!
//! Partial results are always preferred over total failure: a complex that
//! does not converge leaves its lines "not measured", an invalid diagram
//! falls through to the next one, and each property degrades independently.
//! Only malformed configuration (and, upstream, malformed spectra) abort.
//!
//! Batch runs are embarrassingly parallel: the pipeline is a pure function
//! of `(Spectrum, PipelineConfig)` over immutable calibration data.

use rayon::prelude::*;

use crate::classify::{classify, classify_whan};
use crate::domain::{Complex, LineMeasurement, PipelineConfig, PipelineOutput, Spectrum};
use crate::error::AppError;
use crate::fit::{extract_measurement, fit_complex};
use crate::props::estimate_properties;

/// Run the whole pipeline on one spectrum.
pub fn run_pipeline(
    spectrum: &Spectrum,
    config: &PipelineConfig,
) -> Result<PipelineOutput, AppError> {
    config.validate()?;

    let mut fits = Vec::new();
    for complex in Complex::ALL {
        fits.extend(fit_complex(spectrum, complex, config)?);
    }

    let measurements: Vec<LineMeasurement> = fits
        .iter()
        .map(|fit| extract_measurement(fit, spectrum.redshift()))
        .collect();

    let classification = classify(&measurements, config);
    let whan = if config.whan {
        classify_whan(&measurements, config)
    } else {
        None
    };
    let properties = estimate_properties(&measurements, config);

    Ok(PipelineOutput {
        fits,
        measurements,
        classification,
        whan,
        properties,
    })
}

/// Run many spectra concurrently (one pipeline invocation each, zero shared
/// mutable state).
pub fn run_batch(
    spectra: &[Spectrum],
    config: &PipelineConfig,
) -> Vec<Result<PipelineOutput, AppError>> {
    spectra
        .par_iter()
        .map(|spectrum| run_pipeline(spectrum, config))
        .collect()
}
