//! Gas-phase metallicity from strong-line indices.
//!
//! Pettini & Pagel (2004) calibrations:
//!
//! - O3N2 = log10(([OIII] 5007 / Hβ) / ([NII] 6583 / Hα)),
//!   12+log(O/H) = 8.73 − 0.32 · O3N2, valid for −1.0 < O3N2 < 1.9
//! - N2 = log10([NII] 6583 / Hα),
//!   12+log(O/H) = 8.90 + 0.57 · N2, valid for −2.5 < N2 < −0.3
//!
//! An index outside its stated calibration domain is an explicit invalid
//! outcome naming the violated bound, never clamped or extrapolated.

use crate::classify::{find_line, gate_failure};
use crate::domain::{
    Line, LineMeasurement, MetallicityMethod, PhysicalProperty, PipelineConfig, PropertyKind,
    PropertyOutcome,
};

/// Stated validity range of the O3N2 calibration.
pub const O3N2_DOMAIN: (f64, f64) = (-1.0, 1.9);

/// Stated validity range of the N2 calibration.
pub const N2_DOMAIN: (f64, f64) = (-2.5, -0.3);

/// d(log10 r)/dr = 0.434 / r.
const LOG10_ERR: f64 = 0.434;

/// Estimate 12+log(O/H), or report why it cannot be estimated.
pub fn estimate_metallicity(
    measurements: &[LineMeasurement],
    config: &PipelineConfig,
) -> PhysicalProperty {
    let method = config.metallicity_method;
    let property = |outcome| PhysicalProperty {
        kind: PropertyKind::Metallicity,
        method: method.display_name().to_string(),
        outcome,
    };

    let lines: &[Line] = match method {
        MetallicityMethod::O3n2 => &[Line::Oiii5007, Line::Hbeta, Line::Nii6583, Line::Halpha],
        MetallicityMethod::N2 => &[Line::Nii6583, Line::Halpha],
    };
    let failures: Vec<String> = lines
        .iter()
        .filter_map(|&line| gate_failure(measurements, line, config.snr_threshold))
        .collect();
    if !failures.is_empty() {
        return property(PropertyOutcome::Invalid {
            reason: failures.join("; "),
        });
    }

    // Gate passed: every line is present with positive flux.
    let flux = |line| find_line(measurements, line).map(|m| (m.flux, m.flux_err));
    let pairs: Option<Vec<(f64, f64)>> = lines.iter().map(|&l| flux(l)).collect();
    let Some(pairs) = pairs else {
        return property(PropertyOutcome::Invalid {
            reason: "required line missing from measurement set".to_string(),
        });
    };

    let rel_var: f64 = pairs.iter().map(|(f, e)| (e / f) * (e / f)).sum();
    let index_err = LOG10_ERR * rel_var.sqrt();

    let (index, domain, value, err, tag) = match method {
        MetallicityMethod::O3n2 => {
            let index = ((pairs[0].0 / pairs[1].0) / (pairs[2].0 / pairs[3].0)).log10();
            (
                index,
                O3N2_DOMAIN,
                8.73 - 0.32 * index,
                0.32 * index_err,
                "O3N2",
            )
        }
        MetallicityMethod::N2 => {
            let index = (pairs[0].0 / pairs[1].0).log10();
            (
                index,
                N2_DOMAIN,
                8.90 + 0.57 * index,
                0.57 * index_err,
                "N2",
            )
        }
    };

    if !(index > domain.0 && index < domain.1) {
        return property(PropertyOutcome::Invalid {
            reason: format!(
                "{tag} index {index:.2} outside calibration domain ({}, {})",
                domain.0, domain.1
            ),
        });
    }

    property(PropertyOutcome::Value {
        value,
        err: Some(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ew;

    fn meas(line: Line, flux: f64, snr: f64) -> LineMeasurement {
        LineMeasurement {
            line,
            flux,
            flux_err: flux / snr,
            ew: Some(Ew {
                value: 15.0,
                err: 1.0,
            }),
            velocity: 0.0,
            velocity_err: 0.0,
            fwhm_kms: 250.0,
            snr,
            measured: true,
        }
    }

    fn four_lines(oiii: f64, hb: f64, nii: f64, ha: f64) -> Vec<LineMeasurement> {
        vec![
            meas(Line::Oiii5007, oiii, 10.0),
            meas(Line::Hbeta, hb, 10.0),
            meas(Line::Nii6583, nii, 10.0),
            meas(Line::Halpha, ha, 10.0),
        ]
    }

    #[test]
    fn o3n2_reference_value() {
        // O3N2 = log10(3.162 / 0.3162) = 1.0 -> 12+log(O/H) = 8.41.
        let set = four_lines(31.62, 10.0, 31.62, 100.0);
        let prop = estimate_metallicity(&set, &PipelineConfig::default());
        match prop.outcome {
            PropertyOutcome::Value { value, err } => {
                assert!((value - 8.41).abs() < 0.005, "value {value}");
                assert!(err.unwrap() > 0.0);
            }
            PropertyOutcome::Invalid { reason } => panic!("unexpected: {reason}"),
        }
    }

    #[test]
    fn n2_reference_value() {
        // N2 = log10(0.3162) = -0.5 -> 8.90 - 0.285 = 8.615.
        let set = four_lines(31.62, 10.0, 31.62, 100.0);
        let config = PipelineConfig {
            metallicity_method: MetallicityMethod::N2,
            ..PipelineConfig::default()
        };
        let prop = estimate_metallicity(&set, &config);
        match prop.outcome {
            PropertyOutcome::Value { value, .. } => {
                assert!((value - 8.615).abs() < 0.005, "value {value}")
            }
            PropertyOutcome::Invalid { reason } => panic!("unexpected: {reason}"),
        }
    }

    #[test]
    fn out_of_domain_index_is_flagged_not_extrapolated() {
        // O3N2 = log10(10 / 0.1) = 2.0 > 1.9.
        let set = four_lines(100.0, 10.0, 10.0, 100.0);
        let prop = estimate_metallicity(&set, &PipelineConfig::default());
        match prop.outcome {
            PropertyOutcome::Invalid { reason } => {
                assert!(reason.contains("1.9"), "reason should name the bound: {reason}");
            }
            PropertyOutcome::Value { value, .. } => {
                panic!("out-of-domain index must not yield {value}")
            }
        }
    }

    #[test]
    fn gated_line_invalidates_with_reason() {
        let mut set = four_lines(31.62, 10.0, 31.62, 100.0);
        set[1].snr = 2.0; // Hβ below threshold
        let prop = estimate_metallicity(&set, &PipelineConfig::default());
        match prop.outcome {
            PropertyOutcome::Invalid { reason } => assert!(reason.contains("Hbeta"), "{reason}"),
            PropertyOutcome::Value { .. } => panic!("gated input must invalidate"),
        }
    }
}
