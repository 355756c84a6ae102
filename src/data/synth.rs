//! Synthetic spectrum generation.
//!
//! Builds a noisy spectrum from catalog lines over a flat continuum, with
//! amplitudes chosen per scenario so the resulting line ratios land in a
//! known region of the BPT plane. Used by the `demo` subcommand and by
//! round-trip tests.
//!
//! Generation is deterministic: the RNG seed is derived by hashing the full
//! generation config, so the same inputs always produce the same spectrum.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use clap::ValueEnum;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{C_KMS, Line, Spectrum};
use crate::error::AppError;
use crate::math::gaussian_unit;

/// Rest-frame wavelength coverage of generated spectra (Å). Wide enough for
/// every catalogued complex plus continuum sidebands.
const REST_RANGE: (f64, f64) = (4700.0, 6900.0);

/// Floor for the per-pixel error array when noise is switched off.
const MIN_ERROR: f64 = 1e-3;

/// Line-amplitude presets placing the object in a known BPT region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Scenario {
    /// Strong Balmer lines, weak [NII]: the star-forming sequence.
    StarForming,
    /// Strong [OIII] and [NII]: Seyfert territory.
    Agn,
    /// Elevated [NII] with modest [OIII]: LINER territory.
    Liner,
    /// Barely-there lines: everything falls below the S/N gate.
    Weak,
}

impl Scenario {
    /// Gaussian peak amplitude per line, in continuum flux units.
    pub fn amplitudes(self) -> &'static [(Line, f64)] {
        match self {
            Scenario::StarForming => &[
                (Line::Hbeta, 35.0),
                (Line::Oiii4959, 11.7),
                (Line::Oiii5007, 35.0),
                (Line::Oi6300, 3.0),
                (Line::Nii6548, 6.7),
                (Line::Halpha, 100.0),
                (Line::Nii6583, 20.0),
                (Line::Sii6716, 15.0),
                (Line::Sii6731, 11.0),
            ],
            Scenario::Agn => &[
                (Line::Hbeta, 20.0),
                (Line::Oiii4959, 47.0),
                (Line::Oiii5007, 140.0),
                (Line::Oi6300, 15.0),
                (Line::Nii6548, 33.0),
                (Line::Halpha, 100.0),
                (Line::Nii6583, 100.0),
                (Line::Sii6716, 40.0),
                (Line::Sii6731, 30.0),
            ],
            Scenario::Liner => &[
                (Line::Hbeta, 30.0),
                (Line::Oiii4959, 20.0),
                (Line::Oiii5007, 60.0),
                (Line::Oi6300, 20.0),
                (Line::Nii6548, 37.0),
                (Line::Halpha, 100.0),
                (Line::Nii6583, 110.0),
                (Line::Sii6716, 45.0),
                (Line::Sii6731, 35.0),
            ],
            Scenario::Weak => &[
                (Line::Hbeta, 0.4),
                (Line::Oiii4959, 0.15),
                (Line::Oiii5007, 0.4),
                (Line::Oi6300, 0.2),
                (Line::Nii6548, 0.2),
                (Line::Halpha, 0.8),
                (Line::Nii6583, 0.5),
                (Line::Sii6716, 0.3),
                (Line::Sii6731, 0.25),
            ],
        }
    }
}

/// Generation settings for one synthetic spectrum.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub scenario: Scenario,
    pub redshift: f64,
    /// Per-pixel Gaussian noise standard deviation (flux units).
    pub noise: f64,
    pub seed: u64,
    /// Flat continuum level (flux units).
    pub continuum: f64,
    /// Intrinsic velocity width shared by all lines (km/s).
    pub sigma_kms: f64,
    /// Instrument resolving power attached to the spectrum.
    pub resolution: f64,
    /// Observed-frame pixel spacing (Å).
    pub step: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::StarForming,
            redshift: 0.02,
            noise: 0.5,
            seed: 42,
            continuum: 10.0,
            sigma_kms: 150.0,
            resolution: 2000.0,
            step: 0.8,
        }
    }
}

/// Generate a deterministic synthetic spectrum.
pub fn generate_spectrum(config: &SynthConfig) -> Result<Spectrum, AppError> {
    if !(config.redshift.is_finite() && config.redshift > -1.0) {
        return Err(AppError::new(2, "Invalid redshift for synthetic spectrum."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise level must be finite and >= 0."));
    }
    if !(config.continuum.is_finite() && config.continuum >= 0.0) {
        return Err(AppError::new(2, "Continuum level must be finite and >= 0."));
    }
    if !(config.sigma_kms.is_finite() && config.sigma_kms > 0.0) {
        return Err(AppError::new(2, "Line width must be finite and > 0."));
    }
    if !(config.resolution.is_finite() && config.resolution > 0.0) {
        return Err(AppError::new(2, "Resolution must be finite and > 0."));
    }
    if !(config.step.is_finite() && config.step > 0.0) {
        return Err(AppError::new(2, "Pixel step must be finite and > 0."));
    }

    let shift = 1.0 + config.redshift;
    let lo = REST_RANGE.0 * shift;
    let hi = REST_RANGE.1 * shift;

    let mut wavelength = Vec::new();
    let mut w = lo;
    while w <= hi {
        wavelength.push(w);
        w += config.step;
    }

    let lines: Vec<(f64, f64, f64)> = config
        .scenario
        .amplitudes()
        .iter()
        .map(|&(line, amp)| {
            let center = line.rest_wavelength() * shift;
            let sigma = center * config.sigma_kms / C_KMS;
            (amp, center, sigma)
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(synth_seed(config));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let error_level = config.noise.max(MIN_ERROR);
    let flux: Vec<f64> = wavelength
        .iter()
        .map(|&w| {
            let mut f = config.continuum;
            for &(amp, center, sigma) in &lines {
                f += amp * gaussian_unit(w, center, sigma);
            }
            if config.noise > 0.0 {
                f += config.noise * normal.sample(&mut rng);
            }
            f
        })
        .collect();

    let n = wavelength.len();
    Spectrum::new(
        wavelength,
        flux,
        vec![error_level; n],
        config.redshift,
        Some(config.resolution),
    )
}

/// Seed derived from the full generation config, so equal configs always
/// produce identical spectra.
fn synth_seed(config: &SynthConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.scenario.hash(&mut hasher);
    config.redshift.to_bits().hash(&mut hasher);
    config.noise.to_bits().hash(&mut hasher);
    config.continuum.to_bits().hash(&mut hasher);
    config.sigma_kms.to_bits().hash(&mut hasher);
    config.resolution.to_bits().hash(&mut hasher);
    config.step.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let config = SynthConfig::default();
        let a = generate_spectrum(&config).unwrap();
        let b = generate_spectrum(&config).unwrap();
        assert_eq!(a.flux(), b.flux());
        assert_eq!(a.wavelength(), b.wavelength());
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_spectrum(&SynthConfig::default()).unwrap();
        let b = generate_spectrum(&SynthConfig {
            seed: 7,
            ..SynthConfig::default()
        })
        .unwrap();
        assert_ne!(a.flux(), b.flux());
    }

    #[test]
    fn covers_every_catalog_complex() {
        let spectrum = generate_spectrum(&SynthConfig::default()).unwrap();
        let shift = 1.0 + spectrum.redshift();
        for line in Line::ALL {
            let center = line.rest_wavelength() * shift;
            assert!(*spectrum.wavelength().first().unwrap() < center - 30.0);
            assert!(*spectrum.wavelength().last().unwrap() > center + 30.0);
        }
    }

    #[test]
    fn noiseless_peak_sits_at_continuum_plus_amplitude() {
        let config = SynthConfig {
            noise: 0.0,
            ..SynthConfig::default()
        };
        let spectrum = generate_spectrum(&config).unwrap();
        let ha_center = Line::Halpha.rest_wavelength() * (1.0 + config.redshift);
        let peak = spectrum
            .wavelength()
            .iter()
            .zip(spectrum.flux().iter())
            .filter(|(w, _)| (**w - ha_center).abs() < 5.0)
            .map(|(_, f)| *f)
            .fold(f64::NEG_INFINITY, f64::max);
        // Hα amplitude 100 over continuum 10, slightly reduced by the
        // [NII] neighbors' wings.
        assert!(peak > 105.0 && peak < 115.0, "peak {peak}");
    }
}
