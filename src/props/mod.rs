//! Physical-property estimation.
//!
//! Stateless calibration application: star-formation rate from Hα,
//! gas-phase metallicity from strong-line indices, and a color-mass
//! stellar-mass proxy. Each property computes independently (a failure in
//! one never blocks the others) and each carries an explicit validity
//! outcome instead of a silently defaulted or extrapolated value.

pub mod metallicity;
pub mod sfr;
pub mod stellar_mass;

pub use metallicity::*;
pub use sfr::*;
pub use stellar_mass::*;

use crate::domain::{LineMeasurement, PhysicalProperty, PipelineConfig};

/// Estimate every configured property.
pub fn estimate_properties(
    measurements: &[LineMeasurement],
    config: &PipelineConfig,
) -> Vec<PhysicalProperty> {
    vec![
        estimate_sfr(measurements, config),
        estimate_metallicity(measurements, config),
        estimate_stellar_mass(config),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ew, Line, PropertyKind};

    fn meas(line: Line, flux: f64, snr: f64) -> LineMeasurement {
        LineMeasurement {
            line,
            flux,
            flux_err: flux / snr,
            ew: Some(Ew {
                value: 20.0,
                err: 2.0,
            }),
            velocity: 0.0,
            velocity_err: 0.0,
            fwhm_kms: 250.0,
            snr,
            measured: true,
        }
    }

    #[test]
    fn one_invalid_property_does_not_block_the_others() {
        // No distance: SFR and stellar mass invalid, metallicity fine.
        let set = vec![
            meas(Line::Hbeta, 10.0, 10.0),
            meas(Line::Oiii5007, 31.62, 10.0),
            meas(Line::Halpha, 100.0, 10.0),
            meas(Line::Nii6583, 31.62, 10.0),
        ];
        let config = PipelineConfig::default();

        let props = estimate_properties(&set, &config);
        assert_eq!(props.len(), 3);

        let sfr = props.iter().find(|p| p.kind == PropertyKind::Sfr).unwrap();
        assert!(!sfr.outcome.is_valid());

        let met = props
            .iter()
            .find(|p| p.kind == PropertyKind::Metallicity)
            .unwrap();
        assert!(met.outcome.is_valid(), "metallicity: {:?}", met.outcome);
    }
}
