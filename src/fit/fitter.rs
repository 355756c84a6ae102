//! Simultaneous Gaussian fitting of one line complex.
//!
//! Strategy: profile out the linear parameters. Given the shared kinematic
//! pair `(σ_v, Δv)`, the complex model is linear in
//! `[continuum, amp_1..amp_k]`, so for each kinematic candidate we solve a
//! small inverse-variance-weighted least-squares problem and keep the
//! candidate with the lowest χ². A single local refinement pass tightens the
//! kinematics around the best coarse cell.
//!
//! Everything is deterministic: fixed grids, SVD solves, ties broken by grid
//! index. Failure is structured: a complex that cannot be fit yields
//! `converged = false` for every member and never raises.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{C_KMS, Complex, LineFitResult, PipelineConfig, Spectrum};
use crate::error::AppError;
use crate::fit::grid::{lin_space, log_space};
use crate::fit::profile::ComplexProfile;
use crate::fit::window::FitWindow;
use crate::math::FWHM_PER_SIGMA;
use crate::math::wls::{parameter_covariance, solve_least_squares};

/// Steps per axis of the one-shot local refinement grid.
const REFINE_STEPS: usize = 9;

/// χ² values over a kinematic grid, with the best valid cell.
struct GridEval {
    sigma: Vec<f64>,
    dv: Vec<f64>,
    chi2: Vec<Option<f64>>,
    best: Option<(usize, usize)>,
}

impl GridEval {
    fn at(&self, i: usize, j: usize) -> Option<f64> {
        self.chi2[i * self.dv.len() + j]
    }
}

/// Fit every member of a complex simultaneously.
///
/// Data problems (no spectral coverage, underdetermined window, no valid
/// candidate, bound hit, singular covariance) are reported as non-converged
/// results; only invalid grid configuration is an `Err`.
pub fn fit_complex(
    spectrum: &Spectrum,
    complex: Complex,
    config: &PipelineConfig,
) -> Result<Vec<LineFitResult>, AppError> {
    let profile = ComplexProfile::new(complex, spectrum.redshift());

    let Some(window) = FitWindow::extract(spectrum, complex, config) else {
        return Ok(not_converged_all(&profile, 0.0, 0.0));
    };
    let (cont0, cont0_err) = (window.continuum, window.continuum_err);

    // Fewer pixels than free parameters: skip the fit entirely.
    if window.len() < profile.n_free() {
        return Ok(not_converged_all(&profile, cont0, cont0_err));
    }

    let sqrt_w: Vec<f64> = window.error.iter().map(|e| 1.0 / e).collect();

    // Width grid, floored at the instrument velocity resolution; the
    // instrument cannot produce a narrower profile.
    let inst_sigma_kms = C_KMS / (spectrum.resolving_power() * FWHM_PER_SIGMA);
    let sigma_lo = config.sigma_min_kms.max(inst_sigma_kms);
    if sigma_lo >= config.sigma_max_kms {
        return Ok(not_converged_all(&profile, cont0, cont0_err));
    }
    let sigma_grid = log_space(sigma_lo, config.sigma_max_kms, config.sigma_steps)?;
    let dv_grid = lin_space(
        -config.velocity_tol_kms,
        config.velocity_tol_kms,
        config.velocity_steps,
    )?;

    let coarse = eval_grid(&profile, &window, &sqrt_w, sigma_grid, dv_grid);
    let Some((bi, bj)) = coarse.best else {
        return Ok(not_converged_all(&profile, cont0, cont0_err));
    };

    // A minimum pinned at a grid boundary is a parameter-bound hit.
    if bi == 0 || bi + 1 == coarse.sigma.len() || bj == 0 || bj + 1 == coarse.dv.len() {
        return Ok(not_converged_all(&profile, cont0, cont0_err));
    }

    let eval = if config.refine {
        let fine_sigma = log_space(coarse.sigma[bi - 1], coarse.sigma[bi + 1], REFINE_STEPS)?;
        let fine_dv = lin_space(coarse.dv[bj - 1], coarse.dv[bj + 1], REFINE_STEPS)?;
        let fine = eval_grid(&profile, &window, &sqrt_w, fine_sigma, fine_dv);
        if fine.best.is_some() { fine } else { coarse }
    } else {
        coarse
    };
    let Some((i, j)) = eval.best else {
        return Ok(not_converged_all(&profile, cont0, cont0_err));
    };

    let sigma_v = eval.sigma[i];
    let dv = eval.dv[j];
    let Some((beta, cov, chi2)) = solve_candidate(&profile, &window, &sqrt_w, sigma_v, dv) else {
        return Ok(not_converged_all(&profile, cont0, cont0_err));
    };

    let sigma_v_err = parabolic_error(&eval.sigma, i, |k| eval.at(k, j));
    let dv_err = parabolic_error(&eval.dv, j, |k| eval.at(i, k));

    let centers = profile.centers(dv);
    let sigmas = profile.sigmas(&centers, sigma_v);
    let continuum = beta[0];
    let continuum_err = cov[(0, 0)].max(0.0).sqrt();
    let dof = window.len() - profile.n_free();

    let results = profile
        .members()
        .iter()
        .enumerate()
        .map(|(m, &line)| LineFitResult {
            line,
            amplitude: beta[m + 1],
            amplitude_err: cov[(m + 1, m + 1)].max(0.0).sqrt(),
            centroid: centers[m],
            centroid_err: profile.expected_centers()[m] * dv_err / C_KMS,
            sigma: sigmas[m],
            sigma_err: centers[m] * sigma_v_err / C_KMS,
            continuum,
            continuum_err,
            chi2,
            dof,
            converged: true,
        })
        .collect();

    Ok(results)
}

fn not_converged_all(
    profile: &ComplexProfile,
    continuum: f64,
    continuum_err: f64,
) -> Vec<LineFitResult> {
    profile
        .members()
        .iter()
        .map(|&line| LineFitResult::not_converged(line, continuum, continuum_err))
        .collect()
}

/// Evaluate every kinematic candidate (parallel) and pick the χ² minimum.
fn eval_grid(
    profile: &ComplexProfile,
    window: &FitWindow,
    sqrt_w: &[f64],
    sigma: Vec<f64>,
    dv: Vec<f64>,
) -> GridEval {
    let n_dv = dv.len();
    let chi2: Vec<Option<f64>> = (0..sigma.len() * n_dv)
        .into_par_iter()
        .map(|idx| evaluate_candidate(profile, window, sqrt_w, sigma[idx / n_dv], dv[idx % n_dv]))
        .collect();

    // Deterministic selection: minimum χ²; ties keep the lowest grid index.
    let mut best: Option<(usize, f64)> = None;
    for (idx, c) in chi2.iter().enumerate() {
        if let Some(c) = c {
            match best {
                Some((_, b)) if *c >= b => {}
                _ => best = Some((idx, *c)),
            }
        }
    }

    GridEval {
        sigma,
        dv,
        chi2,
        best: best.map(|(idx, _)| (idx / n_dv, idx % n_dv)),
    }
}

/// χ² of one kinematic candidate, `None` when it is invalid (solver failure,
/// negative amplitude, non-finite residual).
fn evaluate_candidate(
    profile: &ComplexProfile,
    window: &FitWindow,
    sqrt_w: &[f64],
    sigma_v: f64,
    dv: f64,
) -> Option<f64> {
    let (xw, yw) = weighted_design(profile, window, sqrt_w, sigma_v, dv);
    let beta = solve_least_squares(&xw, &yw)?;
    // Emission amplitudes must be non-negative; the continuum is free.
    if beta.iter().skip(1).any(|a| *a < 0.0) {
        return None;
    }
    let chi2 = (&yw - &xw * &beta).norm_squared();
    chi2.is_finite().then_some(chi2)
}

/// Full solve at the chosen kinematics: parameters, covariance, χ².
fn solve_candidate(
    profile: &ComplexProfile,
    window: &FitWindow,
    sqrt_w: &[f64],
    sigma_v: f64,
    dv: f64,
) -> Option<(DVector<f64>, DMatrix<f64>, f64)> {
    let (xw, yw) = weighted_design(profile, window, sqrt_w, sigma_v, dv);
    let beta = solve_least_squares(&xw, &yw)?;
    if beta.iter().skip(1).any(|a| *a < 0.0) {
        return None;
    }
    let cov = parameter_covariance(&xw)?;
    let chi2 = (&yw - &xw * &beta).norm_squared();
    if !chi2.is_finite() {
        return None;
    }
    Some((beta, cov, chi2))
}

/// Build the weighted design matrix and observation vector (rows scaled by
/// sqrt(w) = 1/error).
fn weighted_design(
    profile: &ComplexProfile,
    window: &FitWindow,
    sqrt_w: &[f64],
    sigma_v: f64,
    dv: f64,
) -> (DMatrix<f64>, DVector<f64>) {
    let n = window.len();
    let p = profile.n_lines() + 1;
    let centers = profile.centers(dv);
    let sigmas = profile.sigmas(&centers, sigma_v);

    let mut xw = DMatrix::<f64>::zeros(n, p);
    let mut yw = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for i in 0..n {
        profile.fill_design_row(window.wavelength[i], &centers, &sigmas, &mut row);
        let sw = sqrt_w[i];
        for j in 0..p {
            xw[(i, j)] = row[j] * sw;
        }
        yw[i] = window.flux[i] * sw;
    }

    (xw, yw)
}

/// 1σ parameter error along one grid axis from the χ² curvature at the
/// minimum (Δχ² = 1 convention). Falls back to the local grid step when the
/// minimum sits on the refined-grid edge or the curvature is degenerate.
fn parabolic_error(axis: &[f64], i: usize, get: impl Fn(usize) -> Option<f64>) -> f64 {
    if axis.len() < 2 {
        return 0.0;
    }
    if i == 0 {
        return axis[1] - axis[0];
    }
    if i + 1 == axis.len() {
        return axis[i] - axis[i - 1];
    }
    let h = 0.5 * (axis[i + 1] - axis[i - 1]);
    match (get(i - 1), get(i), get(i + 1)) {
        (Some(lo), Some(mid), Some(hi)) => {
            let curv = lo - 2.0 * mid + hi;
            if curv > 0.0 { h * (2.0 / curv).sqrt() } else { h }
        }
        _ => h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Line;
    use crate::math::gaussian_unit;

    /// Noise-free synthetic spectrum: continuum + catalog lines at a shared
    /// velocity width.
    fn synth(
        lines: &[(Line, f64)],
        redshift: f64,
        sigma_v: f64,
        continuum: f64,
        error: f64,
        lo: f64,
        hi: f64,
    ) -> Spectrum {
        let mut wavelength = Vec::new();
        let mut w = lo;
        while w <= hi {
            wavelength.push(w);
            w += 0.8;
        }
        let flux: Vec<f64> = wavelength
            .iter()
            .map(|&w| {
                let mut f = continuum;
                for &(line, amp) in lines {
                    let center = line.rest_wavelength() * (1.0 + redshift);
                    let sigma = center * sigma_v / C_KMS;
                    f += amp * gaussian_unit(w, center, sigma);
                }
                f
            })
            .collect();
        let n = wavelength.len();
        Spectrum::new(wavelength, flux, vec![error; n], redshift, None).unwrap()
    }

    #[test]
    fn recovers_single_line_parameters() {
        let spectrum = synth(&[(Line::Hbeta, 20.0)], 0.0, 150.0, 5.0, 0.1, 4780.0, 4950.0);
        let config = PipelineConfig::default();

        let results = fit_complex(&spectrum, Complex::Hbeta, &config).unwrap();
        assert_eq!(results.len(), 1);
        let fit = &results[0];
        assert!(fit.converged);

        let expected_sigma = Line::Hbeta.rest_wavelength() * 150.0 / C_KMS;
        assert!(
            (fit.amplitude - 20.0).abs() / 20.0 < 0.03,
            "amplitude {}",
            fit.amplitude
        );
        assert!(
            (fit.sigma - expected_sigma).abs() / expected_sigma < 0.03,
            "sigma {} vs {}",
            fit.sigma,
            expected_sigma
        );
        assert!(
            (fit.centroid - Line::Hbeta.rest_wavelength()).abs() < 0.05,
            "centroid {}",
            fit.centroid
        );
        assert!((fit.continuum - 5.0).abs() / 5.0 < 0.02, "continuum {}", fit.continuum);
        assert!(fit.amplitude_err > 0.0);
        assert!(fit.sigma_err > 0.0);
    }

    #[test]
    fn recovers_blended_complex_with_shared_width() {
        let lines = [
            (Line::Nii6548, 6.7),
            (Line::Halpha, 100.0),
            (Line::Nii6583, 20.0),
        ];
        let spectrum = synth(&lines, 0.02, 150.0, 10.0, 0.2, 6630.0, 6780.0);
        let config = PipelineConfig::default();

        let results = fit_complex(&spectrum, Complex::HalphaNii, &config).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.converged));

        let ha = &results[1];
        let nii = &results[2];
        assert!((ha.amplitude - 100.0).abs() / 100.0 < 0.03, "Ha {}", ha.amplitude);
        let ratio = nii.amplitude / ha.amplitude;
        assert!((ratio - 0.2).abs() < 0.02, "NII/Ha amp ratio {ratio}");

        // One shared velocity width across the complex.
        let vel_width_ha = ha.sigma / ha.centroid;
        let vel_width_nii = nii.sigma / nii.centroid;
        assert!((vel_width_ha - vel_width_nii).abs() < 1e-12);
    }

    #[test]
    fn noisy_line_recovers_within_noise_scaled_tolerance() {
        use rand::prelude::*;
        use rand_distr::Normal;

        let noise = 0.3;
        let clean = synth(&[(Line::Hbeta, 20.0)], 0.0, 150.0, 5.0, noise, 4780.0, 4950.0);
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(0.0, noise).unwrap();
        let flux: Vec<f64> = clean.flux().iter().map(|f| f + normal.sample(&mut rng)).collect();
        let spectrum = Spectrum::new(
            clean.wavelength().to_vec(),
            flux,
            clean.error().to_vec(),
            0.0,
            None,
        )
        .unwrap();

        let fit = &fit_complex(&spectrum, Complex::Hbeta, &PipelineConfig::default()).unwrap()[0];
        assert!(fit.converged);

        let expected_sigma = Line::Hbeta.rest_wavelength() * 150.0 / C_KMS;
        assert!((fit.amplitude - 20.0).abs() / 20.0 < 0.1, "amplitude {}", fit.amplitude);
        assert!(
            (fit.sigma - expected_sigma).abs() / expected_sigma < 0.1,
            "sigma {}",
            fit.sigma
        );
        assert!((fit.centroid - Line::Hbeta.rest_wavelength()).abs() < 0.3);
        assert!((fit.continuum - 5.0).abs() < 0.2);
    }

    #[test]
    fn unresolved_line_hits_the_width_bound() {
        // True width 30 km/s sits below the instrument floor (~64 km/s at
        // R=2000), so χ² decreases monotonically toward the narrow end of
        // the grid: the minimum pins at the boundary and the complex is
        // reported not converged.
        let spectrum = synth(&[(Line::Hbeta, 20.0)], 0.0, 30.0, 5.0, 0.1, 4780.0, 4950.0);
        let config = PipelineConfig::default();

        let results = fit_complex(&spectrum, Complex::Hbeta, &config).unwrap();
        assert!(results.iter().all(|r| !r.converged));
        // The window continuum estimate is still reported.
        assert!((results[0].continuum - 5.0).abs() < 0.5);
    }

    #[test]
    fn underdetermined_window_skips_the_fit() {
        let wavelength = vec![4850.0, 4862.0, 4875.0];
        let spectrum = Spectrum::new(
            wavelength,
            vec![5.0, 25.0, 5.0],
            vec![0.1; 3],
            0.0,
            None,
        )
        .unwrap();
        let config = PipelineConfig::default();

        let results = fit_complex(&spectrum, Complex::Hbeta, &config).unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].converged);
    }

    #[test]
    fn uncovered_complex_reports_not_converged() {
        let spectrum = synth(&[(Line::Hbeta, 20.0)], 0.0, 150.0, 5.0, 0.1, 4780.0, 4950.0);
        let config = PipelineConfig::default();

        let results = fit_complex(&spectrum, Complex::HalphaNii, &config).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.converged));
    }

    #[test]
    fn one_complex_failure_does_not_affect_another() {
        // Hβ present, Hα region absent: Hβ fits, Hα does not, independently.
        let spectrum = synth(&[(Line::Hbeta, 20.0)], 0.0, 150.0, 5.0, 0.1, 4780.0, 4950.0);
        let config = PipelineConfig::default();

        let hbeta = fit_complex(&spectrum, Complex::Hbeta, &config).unwrap();
        let halpha = fit_complex(&spectrum, Complex::HalphaNii, &config).unwrap();
        assert!(hbeta[0].converged);
        assert!(halpha.iter().all(|r| !r.converged));
    }
}
