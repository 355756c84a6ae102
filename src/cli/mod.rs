//! Command-line parsing for the spectral diagnostics tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the fitting/classification code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::Scenario;
use crate::domain::{MassMethod, MetallicityMethod, SfrMethod};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "spd", version, about = "Emission-line diagnostics for optical spectra")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a CSV spectrum, classify it, and print the report.
    Fit(FitArgs),
    /// Run the pipeline on a seeded synthetic spectrum.
    ///
    /// Useful as executable documentation and for eyeballing the report
    /// without real data at hand.
    Demo(DemoArgs),
}

/// Options shared by every pipeline run.
#[derive(Debug, Parser, Clone)]
pub struct PipelineArgs {
    /// Minimum line S/N for classification and property inputs.
    #[arg(long, default_value_t = 3.0)]
    pub snr_threshold: f64,

    /// Override the per-line rest-frame fit-window half-width (Angstroms).
    #[arg(long)]
    pub window: Option<f64>,

    /// Minimum velocity width for the grid search (km/s).
    #[arg(long, default_value_t = 20.0)]
    pub sigma_min: f64,

    /// Maximum velocity width for the grid search (km/s).
    #[arg(long, default_value_t = 600.0)]
    pub sigma_max: f64,

    /// Velocity-width grid steps.
    #[arg(long, default_value_t = 24)]
    pub sigma_steps: usize,

    /// Velocity-offset search half-range (km/s).
    #[arg(long, default_value_t = 400.0)]
    pub velocity_tol: f64,

    /// Velocity-offset grid steps.
    #[arg(long, default_value_t = 17)]
    pub velocity_steps: usize,

    /// Skip the local grid refinement pass.
    #[arg(long)]
    pub no_refine: bool,

    /// Also run the WHAN classifier.
    #[arg(long)]
    pub whan: bool,

    /// Luminosity distance in Mpc (required for SFR and stellar mass).
    #[arg(long)]
    pub distance_mpc: Option<f64>,

    /// Apparent g-band magnitude (needs --r-mag too).
    #[arg(long)]
    pub g_mag: Option<f64>,

    /// Apparent r-band magnitude (needs --g-mag too).
    #[arg(long)]
    pub r_mag: Option<f64>,

    /// SFR calibration.
    #[arg(long, value_enum, default_value_t = SfrMethod::Kennicutt98)]
    pub sfr_method: SfrMethod,

    /// Metallicity calibration.
    #[arg(long, value_enum, default_value_t = MetallicityMethod::O3n2)]
    pub metallicity_method: MetallicityMethod,

    /// Stellar-mass calibration.
    #[arg(long, value_enum, default_value_t = MassMethod::Taylor11)]
    pub mass_method: MassMethod,
}

/// Options for fitting a CSV spectrum.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV with wavelength,flux,error columns (observed frame).
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Redshift of the target.
    #[arg(short = 'z', long)]
    pub redshift: f64,

    /// Instrument resolving power R = lambda/dlambda.
    #[arg(long)]
    pub resolution: Option<f64>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Options for the synthetic demo.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Synthetic scenario to generate.
    #[arg(long, value_enum, default_value_t = Scenario::StarForming)]
    pub scenario: Scenario,

    /// Random seed for the synthetic noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Per-pixel Gaussian noise level (flux units).
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Redshift of the synthetic target.
    #[arg(short = 'z', long, default_value_t = 0.02)]
    pub redshift: f64,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}
