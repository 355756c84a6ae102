//! Star-formation rate from Hα luminosity.
//!
//! `SFR = C · L(Hα)` with `L(Hα) = 4π d_L² F(Hα)`. The luminosity distance
//! must be supplied by the caller: there is no cosmology here and no
//! default distance is ever substituted; a missing distance makes the
//! property invalid, not zero.
//!
//! No extinction correction is applied (a documented simplification of the
//! whole pipeline), so these are lower-bound SFRs for dusty systems.

use std::f64::consts::PI;

use crate::classify::{find_line, gate_failure};
use crate::domain::{
    Line, LineMeasurement, PhysicalProperty, PipelineConfig, PropertyKind, PropertyOutcome,
    SfrMethod,
};

/// One megaparsec in centimeters.
const MPC_IN_CM: f64 = 3.085_677_581e24;

impl SfrMethod {
    /// Calibration constant C in `SFR = C · L(Hα)` (Msun/yr per erg/s).
    fn coefficient(self) -> f64 {
        match self {
            SfrMethod::Kennicutt98 => 7.9e-42,
            SfrMethod::Kennicutt12 => 5.5e-42,
        }
    }
}

/// Estimate the SFR, or report why it cannot be estimated.
pub fn estimate_sfr(
    measurements: &[LineMeasurement],
    config: &PipelineConfig,
) -> PhysicalProperty {
    let method = config.sfr_method;
    let property = |outcome| PhysicalProperty {
        kind: PropertyKind::Sfr,
        method: method.display_name().to_string(),
        outcome,
    };

    let Some(d_mpc) = config.luminosity_distance_mpc else {
        return property(PropertyOutcome::Invalid {
            reason: "no luminosity distance configured".to_string(),
        });
    };
    if let Some(reason) = gate_failure(measurements, Line::Halpha, config.snr_threshold) {
        return property(PropertyOutcome::Invalid { reason });
    }
    let Some(ha) = find_line(measurements, Line::Halpha) else {
        return property(PropertyOutcome::Invalid {
            reason: "Halpha not in measurement set".to_string(),
        });
    };

    let d_cm = d_mpc * MPC_IN_CM;
    let luminosity = ha.flux * 4.0 * PI * d_cm * d_cm;
    let sfr = method.coefficient() * luminosity;
    let err = (ha.flux > 0.0).then(|| sfr * ha.flux_err / ha.flux);

    property(PropertyOutcome::Value { value: sfr, err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ew;

    fn halpha(flux: f64, snr: f64) -> Vec<LineMeasurement> {
        vec![LineMeasurement {
            line: Line::Halpha,
            flux,
            flux_err: flux / snr,
            ew: Some(Ew {
                value: 30.0,
                err: 3.0,
            }),
            velocity: 0.0,
            velocity_err: 0.0,
            fwhm_kms: 250.0,
            snr,
            measured: true,
        }]
    }

    fn config_with_distance(d_mpc: f64) -> PipelineConfig {
        PipelineConfig {
            luminosity_distance_mpc: Some(d_mpc),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn kennicutt98_reference_value() {
        let config = config_with_distance(100.0);
        let prop = estimate_sfr(&halpha(1e-14, 10.0), &config);

        let d_cm = 100.0 * MPC_IN_CM;
        let expected = 7.9e-42 * 1e-14 * 4.0 * PI * d_cm * d_cm;
        match prop.outcome {
            PropertyOutcome::Value { value, err } => {
                assert!((value - expected).abs() / expected < 1e-12);
                assert!((err.unwrap() - value * 0.1).abs() / value < 1e-9);
            }
            PropertyOutcome::Invalid { reason } => panic!("unexpected: {reason}"),
        }
    }

    #[test]
    fn sfr_is_strictly_monotonic_in_halpha_flux() {
        let config = config_with_distance(50.0);
        let mut last = 0.0;
        for flux in [1e-15, 2e-15, 5e-15, 1e-14] {
            match estimate_sfr(&halpha(flux, 10.0), &config).outcome {
                PropertyOutcome::Value { value, .. } => {
                    assert!(value > last, "SFR must increase with flux");
                    last = value;
                }
                PropertyOutcome::Invalid { reason } => panic!("unexpected: {reason}"),
            }
        }
    }

    #[test]
    fn kennicutt12_is_lower_than_kennicutt98() {
        let base = config_with_distance(100.0);
        let k12 = PipelineConfig {
            sfr_method: SfrMethod::Kennicutt12,
            ..base.clone()
        };
        let v98 = match estimate_sfr(&halpha(1e-14, 10.0), &base).outcome {
            PropertyOutcome::Value { value, .. } => value,
            _ => panic!(),
        };
        let v12 = match estimate_sfr(&halpha(1e-14, 10.0), &k12).outcome {
            PropertyOutcome::Value { value, .. } => value,
            _ => panic!(),
        };
        assert!(v12 < v98);
    }

    #[test]
    fn missing_distance_is_invalid_not_zero() {
        let prop = estimate_sfr(&halpha(1e-14, 10.0), &PipelineConfig::default());
        match prop.outcome {
            PropertyOutcome::Invalid { reason } => {
                assert!(reason.contains("distance"), "{reason}");
            }
            PropertyOutcome::Value { .. } => panic!("must not default the distance"),
        }
    }

    #[test]
    fn low_snr_halpha_is_invalid() {
        let config = config_with_distance(100.0);
        let prop = estimate_sfr(&halpha(1e-14, 1.5), &config);
        match prop.outcome {
            PropertyOutcome::Invalid { reason } => assert!(reason.contains("S/N"), "{reason}"),
            PropertyOutcome::Value { .. } => panic!("below-threshold Halpha must invalidate SFR"),
        }
    }
}
