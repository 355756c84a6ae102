//! CSV spectrum ingest.
//!
//! Turns a `wavelength,flux,error` CSV into a validated [`Spectrum`].
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors, exit code 2)
//! - **Fail fast**: malformed content is rejected here, before any fitting
//! - **Row-numbered messages** so bad cells are easy to locate
//!
//! Network retrieval, caching and archive formats are the data-retrieval
//! layer's concern; this module only covers the local-file boundary the CLI
//! needs.

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Spectrum;
use crate::error::AppError;

/// Accepted header aliases, all case-insensitive.
const WAVELENGTH_ALIASES: [&str; 3] = ["wavelength", "lambda", "wave"];
const FLUX_ALIASES: [&str; 1] = ["flux"];
const ERROR_ALIASES: [&str; 3] = ["error", "flux_error", "err"];

struct ColumnIndex {
    wavelength: usize,
    flux: usize,
    error: usize,
}

/// Load a spectrum from CSV; wavelengths are observed-frame Å.
pub fn load_spectrum_csv(
    path: &Path,
    redshift: f64,
    resolution: Option<f64>,
) -> Result<Spectrum, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV header: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut wavelength = Vec::new();
    let mut flux = Vec::new();
    let mut error = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let row = i + 2; // 1-based, after the header line
        let record =
            record.map_err(|e| AppError::new(2, format!("CSV parse error at row {row}: {e}")))?;
        wavelength.push(parse_field(&record, columns.wavelength, "wavelength", row)?);
        flux.push(parse_field(&record, columns.flux, "flux", row)?);
        error.push(parse_field(&record, columns.error, "error", row)?);
    }

    if wavelength.is_empty() {
        return Err(AppError::new(
            3,
            format!("CSV '{}' contains no data rows.", path.display()),
        ));
    }

    Spectrum::new(wavelength, flux, error, redshift, resolution)
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnIndex, AppError> {
    let find = |aliases: &[&str]| {
        headers
            .iter()
            .position(|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)))
    };

    let missing = |name: &str| {
        AppError::new(
            2,
            format!(
                "CSV is missing a '{name}' column (headers found: {}).",
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        )
    };

    Ok(ColumnIndex {
        wavelength: find(&WAVELENGTH_ALIASES).ok_or_else(|| missing("wavelength"))?,
        flux: find(&FLUX_ALIASES).ok_or_else(|| missing("flux"))?,
        error: find(&ERROR_ALIASES).ok_or_else(|| missing("error"))?,
    })
}

fn parse_field(
    record: &StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, AppError> {
    let raw = record.get(index).ok_or_else(|| {
        AppError::new(2, format!("Row {row}: missing '{name}' field."))
    })?;
    raw.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!("Row {row}: '{name}' value '{raw}' is not a number."),
        )
    })
}
