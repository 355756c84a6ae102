//! Formatted terminal output for a pipeline run.
//!
//! Formatting lives in one place so:
//! - the fitting/classification code stays clean and testable
//! - output changes are localized
//!
//! The core itself performs no rendering or file I/O; these helpers build
//! strings for the CLI front-end to print.

use crate::domain::{
    LineMeasurement, PhysicalProperty, PipelineConfig, PipelineOutput, PropertyOutcome, Spectrum,
    WhanResult,
};

/// Format the full report: run summary, measurements, classification,
/// properties.
pub fn format_report(
    spectrum: &Spectrum,
    output: &PipelineOutput,
    config: &PipelineConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== spd - emission-line diagnostics ===\n");
    out.push_str(&format!(
        "Spectrum: n={} | range=[{:.1}, {:.1}] A | z={:.4} | R={:.0}\n",
        spectrum.len(),
        spectrum.wavelength().first().copied().unwrap_or(f64::NAN),
        spectrum.wavelength().last().copied().unwrap_or(f64::NAN),
        spectrum.redshift(),
        spectrum.resolving_power(),
    ));
    out.push_str(&format!(
        "Gates: S/N >= {:.1} | distance: {}\n",
        config.snr_threshold,
        match config.luminosity_distance_mpc {
            Some(d) => format!("{d:.1} Mpc"),
            None => "not supplied".to_string(),
        },
    ));
    out.push('\n');

    out.push_str(&format_measurements(&output.measurements));
    out.push('\n');
    out.push_str(&format_classification(output, config));
    out.push('\n');
    out.push_str(&format_properties(&output.properties));

    out
}

/// Format the per-line measurement table.
pub fn format_measurements(measurements: &[LineMeasurement]) -> String {
    let mut out = String::new();

    out.push_str("Line measurements:\n");
    out.push_str(&format!(
        "{:<12} {:>12} {:>8} {:>10} {:>10} {:>10}\n",
        "line", "flux", "S/N", "EW [A]", "v [km/s]", "FWHM"
    ));
    out.push_str(&format!(
        "{:-<12} {:-<12} {:-<8} {:-<10} {:-<10} {:-<10}\n",
        "", "", "", "", "", ""
    ));

    for m in measurements {
        if !m.measured {
            out.push_str(&format!("{:<12} {:>12}\n", m.line.label(), "(not measured)"));
            continue;
        }
        out.push_str(&format!(
            "{:<12} {:>12.3} {:>8.1} {:>10} {:>10.1} {:>10.1}\n",
            m.line.label(),
            m.flux,
            m.snr,
            match &m.ew {
                Some(ew) => format!("{:.2}", ew.value),
                None => "invalid".to_string(),
            },
            m.velocity,
            m.fwhm_kms,
        ));
    }

    out
}

/// Format the classification block (BPT + optional WHAN).
pub fn format_classification(output: &PipelineOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();
    let result = &output.classification;

    out.push_str("Classification:\n");
    match (result.diagram, &result.ratios) {
        (Some(diagram), Some(ratios)) => {
            out.push_str(&format!(
                "- {} via {} diagram (x={:.3}+-{:.3}, y={:.3}+-{:.3})\n",
                result.class.display_name(),
                diagram.display_name(),
                ratios.x,
                ratios.x_err,
                ratios.y,
                ratios.y_err,
            ));
        }
        _ => {
            out.push_str(&format!("- {}\n", result.class.display_name()));
        }
    }
    for skip in &result.skipped {
        out.push_str(&format!(
            "  (skipped {} diagram) {}\n",
            skip.diagram.display_name(),
            skip.reason
        ));
    }

    if config.whan {
        match &output.whan {
            Some(whan) => out.push_str(&format_whan(whan)),
            None => out.push_str("- WHAN: unavailable (inputs below the S/N gate)\n"),
        }
    }

    out
}

fn format_whan(whan: &WhanResult) -> String {
    format!(
        "- WHAN: {} (EW(Ha)={:.2} A, log [NII]/Ha={:.3})\n",
        whan.class.display_name(),
        whan.ew_halpha,
        whan.nii_halpha,
    )
}

/// Format the derived-property block.
pub fn format_properties(properties: &[PhysicalProperty]) -> String {
    let mut out = String::new();

    out.push_str("Derived properties:\n");
    for p in properties {
        match &p.outcome {
            PropertyOutcome::Value { value, err } => {
                let err_part = match err {
                    Some(e) => format!(" +- {e:.3}"),
                    None => String::new(),
                };
                out.push_str(&format!(
                    "- {:<14} {:.3}{} {} [{}]\n",
                    p.kind.display_name(),
                    value,
                    err_part,
                    p.kind.unit_label(),
                    p.method,
                ));
            }
            PropertyOutcome::Invalid { reason } => {
                out.push_str(&format!(
                    "- {:<14} invalid: {} [{}]\n",
                    p.kind.display_name(),
                    reason,
                    p.method,
                ));
            }
        }
    }

    out
}
