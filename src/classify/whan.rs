//! WHAN classifier: EW(Hα) vs log([NII]/Hα).
//!
//! A secondary, independent diagnostic invoked on request. Unlike the BPT
//! chain it stays meaningful for weak-lined galaxies: a small Hα equivalent
//! width marks retired/passive systems whose ionization comes from evolved
//! stars rather than star formation or an AGN. The result is reported
//! alongside the BPT classification and never merged into it.

use crate::classify::{find_line, passes_gate};
use crate::domain::{Line, LineMeasurement, PipelineConfig, WhanClass, WhanResult};

/// EW(Hα) below this (Å) marks a retired/passive galaxy.
pub const WHAN_EW_MIN: f64 = 3.0;

/// log([NII]/Hα) split between star formation and AGN at significant EW.
pub const WHAN_RATIO_SPLIT: f64 = -0.4;

/// Classify on the WHAN plane; `None` when the inputs are invalid
/// (either line fails the S/N gate, or Hα has no valid equivalent width).
pub fn classify_whan(
    measurements: &[LineMeasurement],
    config: &PipelineConfig,
) -> Option<WhanResult> {
    let ha = find_line(measurements, Line::Halpha)?;
    let nii = find_line(measurements, Line::Nii6583)?;
    if !passes_gate(ha, config.snr_threshold) || !passes_gate(nii, config.snr_threshold) {
        return None;
    }
    let ew = ha.ew?;

    let ew_halpha = ew.value.abs();
    let nii_halpha = (nii.flux / ha.flux).log10();

    // EW exactly at the threshold counts as active (the passive class is
    // bounded by EW < 3).
    let class = if ew_halpha < WHAN_EW_MIN {
        WhanClass::RetiredPassive
    } else if nii_halpha < WHAN_RATIO_SPLIT {
        WhanClass::StarForming
    } else {
        WhanClass::Agn
    };

    Some(WhanResult {
        class,
        ew_halpha,
        nii_halpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ew;

    fn meas(line: Line, flux: f64, snr: f64, ew: Option<f64>) -> LineMeasurement {
        LineMeasurement {
            line,
            flux,
            flux_err: if snr > 0.0 { flux / snr } else { 0.0 },
            ew: ew.map(|value| Ew { value, err: 0.1 }),
            velocity: 0.0,
            velocity_err: 0.0,
            fwhm_kms: 200.0,
            snr,
            measured: true,
        }
    }

    #[test]
    fn small_ew_is_retired_passive() {
        let set = vec![
            meas(Line::Halpha, 100.0, 10.0, Some(2.0)),
            meas(Line::Nii6583, 80.0, 10.0, Some(1.5)),
        ];
        let result = classify_whan(&set, &PipelineConfig::default()).unwrap();
        assert_eq!(result.class, WhanClass::RetiredPassive);
    }

    #[test]
    fn strong_ew_splits_on_the_ratio() {
        let config = PipelineConfig::default();

        let sf = vec![
            meas(Line::Halpha, 100.0, 10.0, Some(10.0)),
            meas(Line::Nii6583, 15.0, 10.0, Some(1.0)), // log = -0.82
        ];
        assert_eq!(
            classify_whan(&sf, &config).unwrap().class,
            WhanClass::StarForming
        );

        let agn = vec![
            meas(Line::Halpha, 100.0, 10.0, Some(10.0)),
            meas(Line::Nii6583, 100.0, 10.0, Some(8.0)), // log = 0.0
        ];
        assert_eq!(classify_whan(&agn, &config).unwrap().class, WhanClass::Agn);
    }

    #[test]
    fn threshold_ew_counts_as_active() {
        let set = vec![
            meas(Line::Halpha, 100.0, 10.0, Some(WHAN_EW_MIN)),
            meas(Line::Nii6583, 100.0, 10.0, Some(3.0)),
        ];
        assert_eq!(
            classify_whan(&set, &PipelineConfig::default()).unwrap().class,
            WhanClass::Agn
        );
    }

    #[test]
    fn gated_inputs_yield_no_result() {
        let config = PipelineConfig::default();

        let low_snr = vec![
            meas(Line::Halpha, 100.0, 1.0, Some(10.0)),
            meas(Line::Nii6583, 50.0, 10.0, Some(4.0)),
        ];
        assert!(classify_whan(&low_snr, &config).is_none());

        let no_ew = vec![
            meas(Line::Halpha, 100.0, 10.0, None),
            meas(Line::Nii6583, 50.0, 10.0, Some(4.0)),
        ];
        assert!(classify_whan(&no_ew, &config).is_none());
    }
}
