//! Published demarcation curves.
//!
//! Two shapes cover every boundary used by the BPT diagrams:
//!
//! - photoionization-model curves `y = a/(x - b) + c`, meaningful only left
//!   of their asymptote `x = b`; to the right of it a point can only sit on
//!   the AGN side, so each curve carries its domain
//! - straight lines `y = m x + q` for the Seyfert/LINER splits
//!
//! Coefficients are immutable `'static` data, initialized at compile time.

use serde::{Deserialize, Serialize};

/// `y = a / (x - b) + c`, valid for `x < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoionizationCurve {
    pub a: f64,
    /// Asymptote position.
    pub b: f64,
    pub c: f64,
}

impl PhotoionizationCurve {
    /// Whether the curve is defined at this x (left of the asymptote).
    pub fn applies(&self, x: f64) -> bool {
        x < self.b
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.a / (x - self.b) + self.c
    }
}

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCurve {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearCurve {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Kauffmann et al. (2003) star-forming boundary, [NII] diagram.
pub const KAUFFMANN03_NII: PhotoionizationCurve = PhotoionizationCurve {
    a: 0.61,
    b: 0.05,
    c: 1.3,
};

/// Kewley et al. (2001) maximum-starburst boundary, [NII] diagram.
pub const KEWLEY01_NII: PhotoionizationCurve = PhotoionizationCurve {
    a: 0.61,
    b: 0.47,
    c: 1.19,
};

/// Kewley et al. (2001) maximum-starburst boundary, [SII] diagram.
pub const KEWLEY01_SII: PhotoionizationCurve = PhotoionizationCurve {
    a: 0.72,
    b: 0.32,
    c: 1.30,
};

/// Kewley et al. (2001) maximum-starburst boundary, [OI] diagram.
pub const KEWLEY01_OI: PhotoionizationCurve = PhotoionizationCurve {
    a: 0.73,
    b: -0.59,
    c: 1.33,
};

/// Schawinski et al. (2007) Seyfert/LINER split, [NII] diagram.
pub const SCHAWINSKI07_NII: LinearCurve = LinearCurve {
    slope: 1.05,
    intercept: 0.45,
};

/// Kewley et al. (2006) Seyfert/LINER split, [SII] diagram.
pub const KEWLEY06_SII: LinearCurve = LinearCurve {
    slope: 1.89,
    intercept: 0.76,
};

/// Kewley et al. (2006) Seyfert/LINER split, [OI] diagram.
pub const KEWLEY06_OI: LinearCurve = LinearCurve {
    slope: 1.18,
    intercept: 1.30,
};
