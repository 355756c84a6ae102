//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates a spectrum
//! - runs the diagnostic pipeline
//! - prints the terminal report

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, FitArgs, PipelineArgs};
use crate::data::{SynthConfig, generate_spectrum};
use crate::domain::{Photometry, PipelineConfig, Spectrum};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `spd` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.pipeline)?;
    let spectrum = crate::io::load_spectrum_csv(&args.csv, args.redshift, args.resolution)?;
    run_and_report(&spectrum, &config)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.pipeline)?;
    let spectrum = generate_spectrum(&SynthConfig {
        scenario: args.scenario,
        seed: args.seed,
        noise: args.noise,
        redshift: args.redshift,
        ..SynthConfig::default()
    })?;
    run_and_report(&spectrum, &config)
}

fn run_and_report(spectrum: &Spectrum, config: &PipelineConfig) -> Result<(), AppError> {
    let output = pipeline::run_pipeline(spectrum, config)?;
    println!("{}", crate::report::format_report(spectrum, &output, config));
    Ok(())
}

/// Map shared CLI flags onto a [`PipelineConfig`].
pub fn pipeline_config_from_args(args: &PipelineArgs) -> Result<PipelineConfig, AppError> {
    let photometry = match (args.g_mag, args.r_mag) {
        (Some(g_mag), Some(r_mag)) => Some(Photometry { g_mag, r_mag }),
        (None, None) => None,
        _ => {
            return Err(AppError::new(
                2,
                "Provide both --g-mag and --r-mag, or neither.",
            ));
        }
    };

    Ok(PipelineConfig {
        snr_threshold: args.snr_threshold,
        window_half_width: args.window,
        sigma_min_kms: args.sigma_min,
        sigma_max_kms: args.sigma_max,
        sigma_steps: args.sigma_steps,
        velocity_tol_kms: args.velocity_tol,
        velocity_steps: args.velocity_steps,
        refine: !args.no_refine,
        whan: args.whan,
        luminosity_distance_mpc: args.distance_mpc,
        photometry,
        sfr_method: args.sfr_method,
        metallicity_method: args.metallicity_method,
        mass_method: args.mass_method,
        ..PipelineConfig::default()
    })
}
