//! Derivation errors

use hostevm_primitives::FeltError;
use thiserror::Error;

/// Address derivation error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    /// A fixed-width input was malformed
    #[error("invalid input `{field}`: {source}")]
    InvalidInput {
        /// Which argument was rejected
        field: &'static str,
        /// Underlying width or range violation
        #[source]
        source: FeltError,
    },
}
