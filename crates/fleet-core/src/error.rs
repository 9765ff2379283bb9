//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `FleetError` where a
//! core failure (bad mode string, bad identifier) can surface.

use thiserror::Error;

/// The top-level error type for `fleet-core`.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("invalid run mode {0:?}: expected \"Mode\" followed by three 0/1 flags")]
    InvalidMode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `fleet-core`.
pub type FleetResult<T> = Result<T, FleetError>;
