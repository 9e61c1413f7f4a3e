//! Crate-wide error type.
//!
//! Every variant maps to a process exit code so `main` can stay a thin wrapper:
//!
//! - `2`: bad input (arguments, files, malformed observations)
//! - `3`: nothing left to fit after ingest
//! - `4`: numerical/domain failures

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// Malformed caller input (empty sets, bad maturities, mismatched lengths).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Parse(String),

    #[error("no data: {0}")]
    NoData(String),

    /// Inputs outside the domain of a pricing formula.
    #[error("domain error: {0}")]
    Domain(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidInput(_) | AppError::Io(_) | AppError::Parse(_) => 2,
            AppError::NoData(_) => 3,
            AppError::Domain(_) => 4,
        }
    }
}
