//! Excitation-mechanism classification.
//!
//! Responsibilities:
//!
//! - published demarcation curves as immutable coefficient data
//! - the BPT priority chain over data-driven diagram descriptors
//! - the WHAN secondary classifier (reported alongside, never merged)

pub mod bpt;
pub mod curves;
pub mod whan;

pub use bpt::*;
pub use curves::*;
pub use whan::*;

use crate::domain::{Line, LineMeasurement};

/// Look up one line's measurement.
pub(crate) fn find_line(measurements: &[LineMeasurement], line: Line) -> Option<&LineMeasurement> {
    measurements.iter().find(|m| m.line == line)
}

/// The S/N gate every classification/property input must pass: measured,
/// significant, and with positive flux.
pub(crate) fn passes_gate(m: &LineMeasurement, snr_threshold: f64) -> bool {
    m.measured && m.snr >= snr_threshold && m.flux > 0.0
}

/// Human-readable reason why a line fails the gate, `None` when it passes.
pub(crate) fn gate_failure(
    measurements: &[LineMeasurement],
    line: Line,
    snr_threshold: f64,
) -> Option<String> {
    let Some(m) = find_line(measurements, line) else {
        return Some(format!("{} not in measurement set", line.label()));
    };
    if !m.measured {
        return Some(format!("{} not measured (fit did not converge)", line.label()));
    }
    if m.snr < snr_threshold {
        return Some(format!(
            "low {} S/N ({:.1} < {:.1})",
            m.line.label(),
            m.snr,
            snr_threshold
        ));
    }
    if m.flux <= 0.0 {
        return Some(format!("{} has non-positive flux", line.label()));
    }
    None
}
