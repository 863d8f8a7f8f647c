//! CLI error types

use hostevm_harness::HarnessError;
use hostevm_ledger::LedgerError;
use hostevm_vectors::VectorError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid emulated address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid field element or ledger address
    #[error("Invalid felt: {0}")]
    InvalidFelt(String),

    /// Harness error
    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),

    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Vector loading error
    #[error("Vector error: {0}")]
    Vectors(#[from] VectorError),
}
