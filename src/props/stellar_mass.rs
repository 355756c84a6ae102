//! Stellar-mass proxy from optical color and absolute magnitude.
//!
//! Color-mass relations:
//!
//! - Taylor et al. (2011):
//!   log(M*/Msun) = −0.406 + 1.097 (g−r) − 0.4 M_r − 0.0158 (g−r)²
//! - Bell et al. (2003): log(M/L_r) = −0.4 + 1.0 (g−r), with the r-band
//!   luminosity from M_r and Msun_r = 4.64.
//!
//! The absolute magnitude comes from the configured luminosity distance via
//! the distance modulus μ = 5 log10(d_L[Mpc]) + 25. Both magnitudes must be
//! finite and the derived quantities inside a plausible range; anything else
//! is an explicit invalid outcome. These are quick proxies, not SED fits.

use crate::domain::{
    MassMethod, PhysicalProperty, PipelineConfig, PropertyKind, PropertyOutcome,
};

/// Plausible g−r color range for the calibrations.
pub const COLOR_DOMAIN: (f64, f64) = (-1.0, 3.0);

/// Plausible r-band absolute magnitude range for galaxies.
pub const ABS_MAG_DOMAIN: (f64, f64) = (-26.0, -10.0);

/// Solar absolute magnitude in r (Bell et al. 2003 convention).
const M_SUN_R: f64 = 4.64;

/// Estimate log(M*/Msun), or report why it cannot be estimated.
pub fn estimate_stellar_mass(config: &PipelineConfig) -> PhysicalProperty {
    let method = config.mass_method;
    let property = |outcome| PhysicalProperty {
        kind: PropertyKind::StellarMass,
        method: method.display_name().to_string(),
        outcome,
    };

    let Some(phot) = config.photometry else {
        return property(PropertyOutcome::Invalid {
            reason: "no g/r photometry configured".to_string(),
        });
    };
    let Some(d_mpc) = config.luminosity_distance_mpc else {
        return property(PropertyOutcome::Invalid {
            reason: "no luminosity distance configured".to_string(),
        });
    };
    if !(phot.g_mag.is_finite() && phot.r_mag.is_finite()) {
        return property(PropertyOutcome::Invalid {
            reason: "photometry must be finite".to_string(),
        });
    }

    let dist_mod = 5.0 * d_mpc.log10() + 25.0;
    let abs_r = phot.r_mag - dist_mod;
    let g_r = phot.g_mag - phot.r_mag;

    if !(g_r > COLOR_DOMAIN.0 && g_r < COLOR_DOMAIN.1) {
        return property(PropertyOutcome::Invalid {
            reason: format!(
                "g-r color {g_r:.2} outside plausible range ({}, {})",
                COLOR_DOMAIN.0, COLOR_DOMAIN.1
            ),
        });
    }
    if !(abs_r > ABS_MAG_DOMAIN.0 && abs_r < ABS_MAG_DOMAIN.1) {
        return property(PropertyOutcome::Invalid {
            reason: format!(
                "absolute magnitude M_r {abs_r:.2} outside plausible range ({}, {})",
                ABS_MAG_DOMAIN.0, ABS_MAG_DOMAIN.1
            ),
        });
    }

    let value = match method {
        MassMethod::Taylor11 => -0.406 + 1.097 * g_r - 0.4 * abs_r - 0.0158 * g_r * g_r,
        MassMethod::Bell03 => {
            let log_ml = -0.4 + 1.0 * g_r;
            let log_l = -0.4 * (abs_r - M_SUN_R);
            log_ml + log_l
        }
    };

    property(PropertyOutcome::Value { value, err: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Photometry;

    fn config(g: f64, r: f64, d_mpc: f64) -> PipelineConfig {
        PipelineConfig {
            photometry: Some(Photometry { g_mag: g, r_mag: r }),
            luminosity_distance_mpc: Some(d_mpc),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn taylor11_reference_value() {
        // d = 100 Mpc -> μ = 35; r = 14.5 -> M_r = -20.5; g-r = 0.7.
        let prop = estimate_stellar_mass(&config(15.2, 14.5, 100.0));
        match prop.outcome {
            PropertyOutcome::Value { value, .. } => {
                let expected = -0.406 + 1.097 * 0.7 - 0.4 * (-20.5) - 0.0158 * 0.49;
                assert!((value - expected).abs() < 1e-9);
            }
            PropertyOutcome::Invalid { reason } => panic!("unexpected: {reason}"),
        }
    }

    #[test]
    fn bell03_tracks_color() {
        let blue = match estimate_stellar_mass(&PipelineConfig {
            mass_method: MassMethod::Bell03,
            ..config(14.8, 14.5, 100.0)
        })
        .outcome
        {
            PropertyOutcome::Value { value, .. } => value,
            _ => panic!(),
        };
        let red = match estimate_stellar_mass(&PipelineConfig {
            mass_method: MassMethod::Bell03,
            ..config(15.4, 14.5, 100.0)
        })
        .outcome
        {
            PropertyOutcome::Value { value, .. } => value,
            _ => panic!(),
        };
        assert!(red > blue, "redder color means higher M/L at fixed M_r");
    }

    #[test]
    fn missing_photometry_is_invalid() {
        let config = PipelineConfig {
            luminosity_distance_mpc: Some(100.0),
            ..PipelineConfig::default()
        };
        assert!(!estimate_stellar_mass(&config).outcome.is_valid());
    }

    #[test]
    fn implausible_magnitude_is_flagged() {
        // d = 1 Mpc -> μ = 25; r = 30 -> M_r = +5, far outside the domain.
        let prop = estimate_stellar_mass(&config(30.7, 30.0, 1.0));
        match prop.outcome {
            PropertyOutcome::Invalid { reason } => {
                assert!(reason.contains("M_r"), "{reason}");
            }
            PropertyOutcome::Value { .. } => panic!("implausible M_r must invalidate"),
        }
    }
}
