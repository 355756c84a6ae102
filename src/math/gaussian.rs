//! Gaussian line-profile primitives.
//!
//! The fitter relies on two primitive operations:
//! - evaluate a unit-amplitude profile at a wavelength (for design rows)
//! - integrate a profile analytically (for line fluxes)
//!
//! The integral of `A exp(-(x-c)^2 / 2σ^2)` is `A σ sqrt(2π)`, and the full
//! width at half maximum is `2 sqrt(2 ln 2) σ ≈ 2.3548 σ`.

/// FWHM / sigma for a Gaussian: 2 sqrt(2 ln 2).
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// sqrt(2π).
pub const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_5;

/// Unit-amplitude Gaussian profile `exp(-(x-center)^2 / (2 sigma^2))`.
///
/// A non-positive `sigma` contributes nothing (the fitter never produces
/// one, but design-row fill must not divide by zero).
pub fn gaussian_unit(x: f64, center: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let u = (x - center) / sigma;
    (-0.5 * u * u).exp()
}

/// Gaussian profile over a constant continuum.
pub fn gaussian(x: f64, amplitude: f64, center: f64, sigma: f64, continuum: f64) -> f64 {
    continuum + amplitude * gaussian_unit(x, center, sigma)
}

/// Analytic integral of a Gaussian line: `A σ sqrt(2π)`.
pub fn integrated_flux(amplitude: f64, sigma: f64) -> f64 {
    amplitude * sigma * SQRT_TWO_PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_profile_peaks_at_center() {
        assert!((gaussian_unit(5000.0, 5000.0, 2.0) - 1.0).abs() < 1e-12);
        assert!(gaussian_unit(5010.0, 5000.0, 2.0) < 1e-5);
    }

    #[test]
    fn half_maximum_at_half_fwhm() {
        let sigma = 3.0;
        let half_width = 0.5 * FWHM_PER_SIGMA * sigma;
        let v = gaussian_unit(5000.0 + half_width, 5000.0, sigma);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn numeric_integral_matches_analytic() {
        let (amp, center, sigma) = (7.5, 6000.0, 2.5);
        let step = 0.01;
        let mut sum = 0.0;
        let mut x = center - 10.0 * sigma;
        while x <= center + 10.0 * sigma {
            sum += amp * gaussian_unit(x, center, sigma) * step;
            x += step;
        }
        assert!((sum - integrated_flux(amp, sigma)).abs() / sum < 1e-4);
    }

    #[test]
    fn degenerate_sigma_is_flat() {
        assert_eq!(gaussian_unit(5000.0, 5000.0, 0.0), 0.0);
        assert_eq!(gaussian(5000.0, 3.0, 5000.0, -1.0, 2.0), 2.0);
    }
}
