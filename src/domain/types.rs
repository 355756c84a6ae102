//! Shared domain types.
//!
//! These types are intentionally kept lightweight and (where useful)
//! serializable so they can be:
//!
//! - used in-memory during fitting and classification
//! - handed to a presentation layer for plotting/reporting
//! - compared structurally in tests (the pipeline is deterministic)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Line;
use crate::error::AppError;

/// Instrument resolving power assumed when the spectrum does not carry one.
pub const DEFAULT_RESOLUTION: f64 = 2000.0;

/// A one-dimensional optical spectrum.
///
/// Immutable once constructed; all pipeline components borrow it read-only.
/// Construction is the *only* place malformed data is rejected; downstream
/// code may assume equal lengths, strictly increasing wavelengths, finite
/// values and positive errors.
#[derive(Debug, Clone)]
pub struct Spectrum {
    wavelength: Vec<f64>,
    flux: Vec<f64>,
    error: Vec<f64>,
    redshift: f64,
    resolution: Option<f64>,
}

impl Spectrum {
    /// Validate and build a spectrum.
    ///
    /// Fails fast (exit code 2) on: mismatched array lengths, fewer than two
    /// pixels, non-monotonic wavelengths, non-finite values, non-positive
    /// errors, or an unphysical redshift/resolution.
    pub fn new(
        wavelength: Vec<f64>,
        flux: Vec<f64>,
        error: Vec<f64>,
        redshift: f64,
        resolution: Option<f64>,
    ) -> Result<Self, AppError> {
        if wavelength.len() != flux.len() || wavelength.len() != error.len() {
            return Err(AppError::new(
                2,
                format!(
                    "Malformed spectrum: array length mismatch (wavelength={}, flux={}, error={}).",
                    wavelength.len(),
                    flux.len(),
                    error.len()
                ),
            ));
        }
        if wavelength.len() < 2 {
            return Err(AppError::new(2, "Malformed spectrum: fewer than 2 pixels."));
        }
        if !(redshift.is_finite() && redshift > -1.0) {
            return Err(AppError::new(
                2,
                format!("Malformed spectrum: invalid redshift {redshift}."),
            ));
        }
        if let Some(r) = resolution {
            if !(r.is_finite() && r > 0.0) {
                return Err(AppError::new(
                    2,
                    format!("Malformed spectrum: invalid instrument resolution {r}."),
                ));
            }
        }
        for (i, &w) in wavelength.iter().enumerate() {
            if !w.is_finite() {
                return Err(AppError::new(
                    2,
                    format!("Malformed spectrum: non-finite wavelength at pixel {i}."),
                ));
            }
            if i > 0 && w <= wavelength[i - 1] {
                return Err(AppError::new(
                    2,
                    format!("Malformed spectrum: wavelengths not strictly increasing at pixel {i}."),
                ));
            }
        }
        for (i, (&f, &e)) in flux.iter().zip(error.iter()).enumerate() {
            if !f.is_finite() {
                return Err(AppError::new(
                    2,
                    format!("Malformed spectrum: non-finite flux at pixel {i}."),
                ));
            }
            if !(e.is_finite() && e > 0.0) {
                return Err(AppError::new(
                    2,
                    format!("Malformed spectrum: flux error at pixel {i} must be finite and > 0."),
                ));
            }
        }

        Ok(Self {
            wavelength,
            flux,
            error,
            redshift,
            resolution,
        })
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn error(&self) -> &[f64] {
        &self.error
    }

    pub fn redshift(&self) -> f64 {
        self.redshift
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// Resolving power R = λ/Δλ, falling back to [`DEFAULT_RESOLUTION`].
    pub fn resolving_power(&self) -> f64 {
        self.resolution.unwrap_or(DEFAULT_RESOLUTION)
    }

    /// Width of one resolution element (Δλ, in Å) at the given wavelength.
    pub fn resolution_element(&self, lambda: f64) -> f64 {
        lambda / self.resolving_power()
    }
}

/// Optional broadband photometry used by the stellar-mass proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Photometry {
    pub g_mag: f64,
    pub r_mag: f64,
}

/// SFR calibration choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SfrMethod {
    /// Kennicutt (1998): SFR = 7.9e-42 L(Hα).
    Kennicutt98,
    /// Kennicutt & Evans (2012), Kroupa IMF: SFR = 5.5e-42 L(Hα).
    Kennicutt12,
}

impl SfrMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            SfrMethod::Kennicutt98 => "Kennicutt+98",
            SfrMethod::Kennicutt12 => "Kennicutt+12",
        }
    }
}

/// Strong-line metallicity calibration choice (Pettini & Pagel 2004).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetallicityMethod {
    /// O3N2 index: 12+log(O/H) = 8.73 - 0.32 O3N2.
    O3n2,
    /// N2 index: 12+log(O/H) = 8.90 + 0.57 N2.
    N2,
}

impl MetallicityMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            MetallicityMethod::O3n2 => "PP04 O3N2",
            MetallicityMethod::N2 => "PP04 N2",
        }
    }
}

/// Color-mass relation choice for the stellar-mass proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MassMethod {
    /// Taylor et al. (2011) g-r color-mass relation.
    Taylor11,
    /// Bell et al. (2003) g-r mass-to-light relation.
    Bell03,
}

impl MassMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            MassMethod::Taylor11 => "Taylor+11",
            MassMethod::Bell03 => "Bell+03",
        }
    }
}

/// A BPT diagnostic diagram, identified by its x-axis ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    /// log([NII] 6583 / Hα) vs log([OIII] 5007 / Hβ).
    Nii,
    /// log(([SII] 6716+6731) / Hα) vs log([OIII] 5007 / Hβ).
    Sii,
    /// log([OI] 6300 / Hα) vs log([OIII] 5007 / Hβ).
    Oi,
}

impl DiagramKind {
    pub fn display_name(self) -> &'static str {
        match self {
            DiagramKind::Nii => "[NII]",
            DiagramKind::Sii => "[SII]",
            DiagramKind::Oi => "[OI]",
        }
    }
}

/// Excitation-mechanism class assigned by the BPT chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcitationClass {
    StarForming,
    Composite,
    Seyfert,
    Liner,
    Unclassified,
}

impl ExcitationClass {
    pub fn display_name(self) -> &'static str {
        match self {
            ExcitationClass::StarForming => "Star-forming",
            ExcitationClass::Composite => "Composite",
            ExcitationClass::Seyfert => "Seyfert",
            ExcitationClass::Liner => "LINER",
            ExcitationClass::Unclassified => "Unclassified",
        }
    }
}

/// WHAN class (secondary classifier; never merged into the BPT result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhanClass {
    StarForming,
    Agn,
    RetiredPassive,
}

impl WhanClass {
    pub fn display_name(self) -> &'static str {
        match self {
            WhanClass::StarForming => "Star-forming",
            WhanClass::Agn => "AGN",
            WhanClass::RetiredPassive => "Retired/Passive",
        }
    }
}

/// Per-line Gaussian fit parameters.
///
/// Invariant: `amplitude >= 0` and `sigma > 0` when `converged`; a
/// non-converged result carries zeroed parameters and the continuum estimate
/// that was available for its window (a structured failure, never an error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFitResult {
    pub line: Line,
    pub amplitude: f64,
    pub amplitude_err: f64,
    /// Observed-frame centroid wavelength (Å).
    pub centroid: f64,
    pub centroid_err: f64,
    /// Observed-frame Gaussian width (Å).
    pub sigma: f64,
    pub sigma_err: f64,
    pub continuum: f64,
    pub continuum_err: f64,
    /// Weighted chi-square of the complex fit this line came from.
    pub chi2: f64,
    /// Degrees of freedom of the complex fit (pixels minus free parameters).
    pub dof: usize,
    pub converged: bool,
}

impl LineFitResult {
    /// Structured non-convergence marker for one line.
    pub fn not_converged(line: Line, continuum: f64, continuum_err: f64) -> Self {
        Self {
            line,
            amplitude: 0.0,
            amplitude_err: 0.0,
            centroid: 0.0,
            centroid_err: 0.0,
            sigma: 0.0,
            sigma_err: 0.0,
            continuum,
            continuum_err,
            chi2: 0.0,
            dof: 0,
            converged: false,
        }
    }
}

/// Equivalent width with its uncertainty (Å; positive for emission).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ew {
    pub value: f64,
    pub err: f64,
}

/// Physical quantities derived from one line's fit.
///
/// A non-converged fit still produces a measurement (`measured = false`,
/// `snr = 0`), so downstream code never has to distinguish "missing" from
/// "zero flux".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineMeasurement {
    pub line: Line,
    /// Integrated flux (input flux units x Å).
    pub flux: f64,
    pub flux_err: f64,
    /// Equivalent width; `None` when the continuum level is non-positive.
    pub ew: Option<Ew>,
    /// Line-of-sight velocity offset from the redshifted rest wavelength (km/s).
    pub velocity: f64,
    pub velocity_err: f64,
    /// Full width at half maximum in velocity units (km/s).
    pub fwhm_kms: f64,
    /// |flux| / flux_err when flux_err > 0, else 0.
    pub snr: f64,
    pub measured: bool,
}

impl LineMeasurement {
    /// "Not measured" marker (SNR = 0), produced for non-converged fits.
    pub fn not_measured(line: Line) -> Self {
        Self {
            line,
            flux: 0.0,
            flux_err: 0.0,
            ew: None,
            velocity: 0.0,
            velocity_err: 0.0,
            fwhm_kms: 0.0,
            snr: 0.0,
            measured: false,
        }
    }
}

/// The numeric ratios a diagram decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioPoint {
    /// Diagram x-axis, e.g. log10([NII]/Hα).
    pub x: f64,
    pub x_err: f64,
    /// log10([OIII] 5007 / Hβ).
    pub y: f64,
    pub y_err: f64,
}

/// Why a diagram was skipped (invalid classification input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSkip {
    pub diagram: DiagramKind,
    pub reason: String,
}

/// Outcome of the BPT priority chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub class: ExcitationClass,
    /// The diagram that decided; `None` for `Unclassified`.
    pub diagram: Option<DiagramKind>,
    /// The ratios that drove the decision; `None` for `Unclassified`.
    pub ratios: Option<RatioPoint>,
    /// Diagrams that could not be evaluated, with reasons (always recorded).
    pub skipped: Vec<DiagramSkip>,
}

/// Outcome of the WHAN secondary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhanResult {
    pub class: WhanClass,
    /// EW(Hα) in Å (emission positive).
    pub ew_halpha: f64,
    /// log10([NII] 6583 / Hα).
    pub nii_halpha: f64,
}

/// Which derived physical quantity a property describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Sfr,
    Metallicity,
    StellarMass,
}

impl PropertyKind {
    pub fn display_name(self) -> &'static str {
        match self {
            PropertyKind::Sfr => "SFR",
            PropertyKind::Metallicity => "12+log(O/H)",
            PropertyKind::StellarMass => "log(M*/Msun)",
        }
    }

    pub fn unit_label(self) -> &'static str {
        match self {
            PropertyKind::Sfr => "Msun/yr",
            PropertyKind::Metallicity => "dex",
            PropertyKind::StellarMass => "dex",
        }
    }
}

/// A property either has a value or an explicit reason it does not.
///
/// Out-of-domain and missing-input cases are never clamped, extrapolated or
/// defaulted; they are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOutcome {
    Value { value: f64, err: Option<f64> },
    Invalid { reason: String },
}

impl PropertyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, PropertyOutcome::Value { .. })
    }
}

/// A derived physical quantity with its calibration tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperty {
    pub kind: PropertyKind,
    /// Calibration method tag, e.g. "Kennicutt+98".
    pub method: String,
    pub outcome: PropertyOutcome,
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags (plus defaults) or constructed directly by library
/// callers. Validated once per pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum line S/N for a measurement to enter classification or
    /// property estimation.
    pub snr_threshold: f64,

    /// BPT diagram priority order; the first diagram with valid input wins.
    pub diagram_order: Vec<DiagramKind>,

    /// Override for the per-line rest-frame fit-window half-width (Å);
    /// `None` uses each line's catalog value.
    pub window_half_width: Option<f64>,
    /// Continuum sidebands exclude pixels within this many resolution
    /// elements of any member line center.
    pub continuum_exclusion_res: f64,
    /// Minimum sideband pixel count before falling back to the whole window
    /// (with a wide uncertainty).
    pub min_continuum_pixels: usize,

    /// Velocity-width grid bounds (km/s); the lower bound is additionally
    /// floored at the instrument velocity resolution.
    pub sigma_min_kms: f64,
    pub sigma_max_kms: f64,
    pub sigma_steps: usize,
    /// Shared velocity-offset search half-range (km/s).
    pub velocity_tol_kms: f64,
    pub velocity_steps: usize,
    /// Refine once on a finer grid around the best coarse cell.
    pub refine: bool,

    /// Also run the WHAN secondary classifier.
    pub whan: bool,

    /// Luminosity distance in Mpc; required for SFR and stellar mass.
    /// Never defaulted.
    pub luminosity_distance_mpc: Option<f64>,
    pub photometry: Option<Photometry>,

    pub sfr_method: SfrMethod,
    pub metallicity_method: MetallicityMethod,
    pub mass_method: MassMethod,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            snr_threshold: 3.0,
            diagram_order: vec![DiagramKind::Nii, DiagramKind::Sii, DiagramKind::Oi],
            window_half_width: None,
            continuum_exclusion_res: 3.0,
            min_continuum_pixels: 4,
            sigma_min_kms: 20.0,
            sigma_max_kms: 600.0,
            sigma_steps: 24,
            velocity_tol_kms: 400.0,
            velocity_steps: 17,
            refine: true,
            whan: false,
            luminosity_distance_mpc: None,
            photometry: None,
            sfr_method: SfrMethod::Kennicutt98,
            metallicity_method: MetallicityMethod::O3n2,
            mass_method: MassMethod::Taylor11,
        }
    }
}

impl PipelineConfig {
    /// Validate configuration values (exit code 2 on violation).
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.snr_threshold.is_finite() && self.snr_threshold >= 0.0) {
            return Err(AppError::new(2, "SNR threshold must be finite and >= 0."));
        }
        if self.diagram_order.is_empty() {
            return Err(AppError::new(2, "Diagram priority order must not be empty."));
        }
        if let Some(w) = self.window_half_width {
            if !(w.is_finite() && w > 0.0) {
                return Err(AppError::new(2, "Fit-window half-width must be finite and > 0."));
            }
        }
        if !(self.continuum_exclusion_res.is_finite() && self.continuum_exclusion_res > 0.0) {
            return Err(AppError::new(2, "Continuum exclusion must be finite and > 0."));
        }
        if !(self.sigma_min_kms.is_finite()
            && self.sigma_max_kms.is_finite()
            && self.sigma_min_kms > 0.0
            && self.sigma_max_kms > self.sigma_min_kms)
        {
            return Err(AppError::new(
                2,
                format!(
                    "Invalid velocity-width range: [{}, {}] km/s (must be finite, >0, max>min).",
                    self.sigma_min_kms, self.sigma_max_kms
                ),
            ));
        }
        if self.sigma_steps < 2 {
            return Err(AppError::new(2, "Velocity-width grid needs >= 2 steps."));
        }
        if !(self.velocity_tol_kms.is_finite() && self.velocity_tol_kms > 0.0) {
            return Err(AppError::new(2, "Velocity tolerance must be finite and > 0."));
        }
        if self.velocity_steps < 3 {
            return Err(AppError::new(2, "Velocity-offset grid needs >= 3 steps."));
        }
        if let Some(d) = self.luminosity_distance_mpc {
            if !(d.is_finite() && d > 0.0) {
                return Err(AppError::new(2, "Luminosity distance must be finite and > 0."));
            }
        }
        Ok(())
    }
}

/// All computed outputs of a single pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Per-line fit parameters (diagnostics; complex order, member order).
    pub fits: Vec<LineFitResult>,
    /// Per-line physical measurements, one per catalogued line.
    pub measurements: Vec<LineMeasurement>,
    pub classification: ClassificationResult,
    /// Present only when the WHAN classifier was requested *and* its inputs
    /// passed the S/N gate.
    pub whan: Option<WhanResult>,
    pub properties: Vec<PhysicalProperty>,
}
