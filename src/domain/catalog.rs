//! Static emission-line catalog.
//!
//! Rest-frame wavelengths are vacuum values from the SDSS spectral line
//! table. Lines are grouped into *complexes*: sets of lines close enough in
//! wavelength that they must be fit simultaneously, sharing one continuum
//! level and one velocity width (Hα sits between the two [NII] components,
//! the [SII] doublet overlaps itself, and the [OIII] pair shares kinematics).
//!
//! The catalog is immutable `'static` data; nothing here is configurable at
//! runtime.

use serde::{Deserialize, Serialize};

/// A catalogued emission line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    Hbeta,
    Oiii4959,
    Oiii5007,
    Oi6300,
    Nii6548,
    Halpha,
    Nii6583,
    Sii6716,
    Sii6731,
}

impl Line {
    /// All catalogued lines, in wavelength order.
    pub const ALL: [Line; 9] = [
        Line::Hbeta,
        Line::Oiii4959,
        Line::Oiii5007,
        Line::Oi6300,
        Line::Nii6548,
        Line::Halpha,
        Line::Nii6583,
        Line::Sii6716,
        Line::Sii6731,
    ];

    /// Rest-frame vacuum wavelength in Angstroms.
    pub fn rest_wavelength(self) -> f64 {
        match self {
            Line::Hbeta => 4862.68,
            Line::Oiii4959 => 4960.295,
            Line::Oiii5007 => 5008.24,
            Line::Oi6300 => 6302.046,
            Line::Nii6548 => 6549.86,
            Line::Halpha => 6564.61,
            Line::Nii6583 => 6585.27,
            Line::Sii6716 => 6718.29,
            Line::Sii6731 => 6732.67,
        }
    }

    /// Rest-frame fit-window half-width in Angstroms.
    ///
    /// Balmer lines get a little more room for their broader wings; the
    /// forbidden lines are narrow and live in more crowded regions.
    pub fn fit_half_width(self) -> f64 {
        match self {
            Line::Hbeta | Line::Halpha => 25.0,
            Line::Nii6548 | Line::Nii6583 => 25.0,
            Line::Oiii4959 | Line::Oiii5007 => 20.0,
            Line::Oi6300 => 20.0,
            Line::Sii6716 | Line::Sii6731 => 20.0,
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Line::Hbeta => "Hbeta",
            Line::Oiii4959 => "[OIII] 4959",
            Line::Oiii5007 => "[OIII] 5007",
            Line::Oi6300 => "[OI] 6300",
            Line::Nii6548 => "[NII] 6548",
            Line::Halpha => "Halpha",
            Line::Nii6583 => "[NII] 6583",
            Line::Sii6716 => "[SII] 6716",
            Line::Sii6731 => "[SII] 6731",
        }
    }

    /// The complex this line belongs to (exactly one).
    pub fn complex(self) -> Complex {
        match self {
            Line::Hbeta => Complex::Hbeta,
            Line::Oiii4959 | Line::Oiii5007 => Complex::Oiii,
            Line::Oi6300 => Complex::Oi,
            Line::Nii6548 | Line::Halpha | Line::Nii6583 => Complex::HalphaNii,
            Line::Sii6716 | Line::Sii6731 => Complex::Sii,
        }
    }
}

/// A group of lines fit simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complex {
    Hbeta,
    Oiii,
    Oi,
    HalphaNii,
    Sii,
}

impl Complex {
    /// All complexes, in wavelength order.
    pub const ALL: [Complex; 5] = [
        Complex::Hbeta,
        Complex::Oiii,
        Complex::Oi,
        Complex::HalphaNii,
        Complex::Sii,
    ];

    /// Member lines, in wavelength order.
    pub fn members(self) -> &'static [Line] {
        match self {
            Complex::Hbeta => &[Line::Hbeta],
            Complex::Oiii => &[Line::Oiii4959, Line::Oiii5007],
            Complex::Oi => &[Line::Oi6300],
            Complex::HalphaNii => &[Line::Nii6548, Line::Halpha, Line::Nii6583],
            Complex::Sii => &[Line::Sii6716, Line::Sii6731],
        }
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Complex::Hbeta => "Hbeta",
            Complex::Oiii => "[OIII]",
            Complex::Oi => "[OI]",
            Complex::HalphaNii => "Halpha+[NII]",
            Complex::Sii => "[SII]",
        }
    }
}
