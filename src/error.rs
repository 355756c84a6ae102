//! Crate-wide error type.
//!
//! One exit-coded error covers every failure path:
//!
//! - `2`: invalid input or usage (bad config values, malformed spectra/CSV)
//! - `3`: insufficient data (nothing usable after validation)
//! - `4`: internal/data error (unexpected numerical failure)
//!
//! Recoverable conditions (non-convergence, low S/N, out-of-domain
//! calibrations) are *not* errors; they surface as structured flags on the
//! result types.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
