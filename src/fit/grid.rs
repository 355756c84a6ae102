//! Kinematic grid generation.
//!
//! The nonlinear parameters of a complex fit (shared velocity width `σ_v`
//! and shared velocity offset `Δv`) are searched on a deterministic grid.
//!
//! Why grid search?
//! - It avoids the local-minima and divergence failure modes of open-ended
//!   nonlinear optimization on low-S/N windows.
//! - It is deterministic given the same inputs/flags (idempotent pipelines).
//! - The grid caps the fit cost by construction; a window that cannot be
//!   fit within it degrades to "not converged" instead of blocking.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid log grid range: min={min}, max={max} (must be finite, >0, max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Log grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Generate `steps` linearly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid linear grid range: min={min}, max={max} (must be finite, max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Linear grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}
