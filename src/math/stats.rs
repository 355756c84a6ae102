//! Robust summary statistics used by continuum estimation.

/// Median of a mutable slice (sorts in place). `None` when empty.
pub fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Median absolute deviation around a given center.
pub fn mad(values: &[f64], center: f64) -> Option<f64> {
    let mut abs: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median_mut(&mut abs)
}

/// Population standard deviation. `None` for fewer than two values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(var.sqrt())
}
