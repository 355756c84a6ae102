//! BPT diagram priority chain.
//!
//! The classifier iterates an ordered list of diagram descriptors. Each
//! descriptor names the lines its x-axis needs (the y-axis is always
//! log10([OIII] 5007 / Hβ)), its demarcation curves, and (through
//! [`evaluate_diagram`]) the classification rule. Adding a diagram means
//! adding a descriptor, not another branch of an if/else ladder.
//!
//! A diagram with invalid input (any required line failing the S/N gate) is
//! skipped with a recorded reason and the chain falls through to the next
//! diagram; when every diagram is invalid the result is `Unclassified`
//! carrying all the reasons.
//!
//! Boundary policy: a point exactly on a curve belongs to the lower class
//! (`<=` keeps Star-forming/Composite; Seyfert requires strictly above the
//! linear split).

use crate::classify::curves::{
    KAUFFMANN03_NII, KEWLEY01_NII, KEWLEY01_OI, KEWLEY01_SII, KEWLEY06_OI, KEWLEY06_SII,
    LinearCurve, PhotoionizationCurve, SCHAWINSKI07_NII,
};
use crate::classify::{find_line, gate_failure};
use crate::domain::{
    ClassificationResult, DiagramKind, DiagramSkip, ExcitationClass, Line, LineMeasurement,
    PipelineConfig, RatioPoint,
};

/// log10(e): d(log10 r) = 0.434 · dr/r for log-ratio error propagation.
const LOG10_ERR: f64 = 0.434;

/// One diagnostic diagram: required x-axis lines and demarcation curves.
#[derive(Debug, Clone)]
pub struct DiagramSpec {
    pub kind: DiagramKind,
    /// X-axis numerator lines (summed; the denominator is always Hα).
    pub x_lines: &'static [Line],
    /// Below this curve (within its domain): star-forming.
    pub sf_boundary: PhotoionizationCurve,
    /// Between the SF boundary and this curve: composite ([NII] only).
    pub composite_boundary: Option<PhotoionizationCurve>,
    /// Above: Seyfert; on or below: LINER.
    pub seyfert_liner: LinearCurve,
}

/// Diagram descriptors in standard priority order.
pub static DIAGRAMS: [DiagramSpec; 3] = [
    DiagramSpec {
        kind: DiagramKind::Nii,
        x_lines: &[Line::Nii6583],
        sf_boundary: KAUFFMANN03_NII,
        composite_boundary: Some(KEWLEY01_NII),
        seyfert_liner: SCHAWINSKI07_NII,
    },
    DiagramSpec {
        kind: DiagramKind::Sii,
        x_lines: &[Line::Sii6716, Line::Sii6731],
        sf_boundary: KEWLEY01_SII,
        composite_boundary: None,
        seyfert_liner: KEWLEY06_SII,
    },
    DiagramSpec {
        kind: DiagramKind::Oi,
        x_lines: &[Line::Oi6300],
        sf_boundary: KEWLEY01_OI,
        composite_boundary: None,
        seyfert_liner: KEWLEY06_OI,
    },
];

/// Descriptor lookup.
pub fn diagram_spec(kind: DiagramKind) -> &'static DiagramSpec {
    match kind {
        DiagramKind::Nii => &DIAGRAMS[0],
        DiagramKind::Sii => &DIAGRAMS[1],
        DiagramKind::Oi => &DIAGRAMS[2],
    }
}

/// Run the priority chain over the configured diagram order.
pub fn classify(measurements: &[LineMeasurement], config: &PipelineConfig) -> ClassificationResult {
    let mut skipped = Vec::new();

    for &kind in &config.diagram_order {
        let spec = diagram_spec(kind);
        match build_input(spec, measurements, config.snr_threshold) {
            Ok(point) => {
                let class = evaluate_diagram(spec, point.x, point.y);
                return ClassificationResult {
                    class,
                    diagram: Some(kind),
                    ratios: Some(point),
                    skipped,
                };
            }
            Err(reason) => skipped.push(DiagramSkip {
                diagram: kind,
                reason,
            }),
        }
    }

    ClassificationResult {
        class: ExcitationClass::Unclassified,
        diagram: None,
        ratios: None,
        skipped,
    }
}

/// Build one diagram's input, or the reason it is invalid.
fn build_input(
    spec: &DiagramSpec,
    measurements: &[LineMeasurement],
    snr_threshold: f64,
) -> Result<RatioPoint, String> {
    let mut required: Vec<Line> = spec.x_lines.to_vec();
    required.extend([Line::Halpha, Line::Oiii5007, Line::Hbeta]);

    let failures: Vec<String> = required
        .iter()
        .filter_map(|&line| gate_failure(measurements, line, snr_threshold))
        .collect();
    if !failures.is_empty() {
        return Err(failures.join("; "));
    }

    let (x, x_err) = log_ratio(measurements, spec.x_lines, Line::Halpha);
    let (y, y_err) = log_ratio(measurements, &[Line::Oiii5007], Line::Hbeta);
    Ok(RatioPoint { x, x_err, y, y_err })
}

/// log10 of a (possibly summed) flux ratio with propagated error.
///
/// Callers guarantee every participating line passed the gate (positive
/// flux), so the logs are well defined.
fn log_ratio(measurements: &[LineMeasurement], numerator: &[Line], denominator: Line) -> (f64, f64) {
    let mut num = 0.0;
    let mut num_var = 0.0;
    for &line in numerator {
        if let Some(m) = find_line(measurements, line) {
            num += m.flux;
            num_var += m.flux_err * m.flux_err;
        }
    }
    let den = find_line(measurements, denominator).map(|m| (m.flux, m.flux_err));
    let (den_flux, den_err) = den.unwrap_or((f64::NAN, f64::NAN));

    let value = (num / den_flux).log10();
    let err = LOG10_ERR
        * ((num_var.sqrt() / num).powi(2) + (den_err / den_flux).powi(2)).sqrt();
    (value, err)
}

/// Place a ratio point on one diagram.
///
/// Exposed separately so boundary behavior is testable with exact
/// coordinates, independent of measurement construction.
pub fn evaluate_diagram(spec: &DiagramSpec, x: f64, y: f64) -> ExcitationClass {
    if spec.sf_boundary.applies(x) && y <= spec.sf_boundary.eval(x) {
        return ExcitationClass::StarForming;
    }
    if let Some(curve) = &spec.composite_boundary {
        if curve.applies(x) && y <= curve.eval(x) {
            return ExcitationClass::Composite;
        }
    }
    if y > spec.seyfert_liner.eval(x) {
        ExcitationClass::Seyfert
    } else {
        ExcitationClass::Liner
    }
}
