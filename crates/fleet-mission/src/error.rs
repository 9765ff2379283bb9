use std::path::PathBuf;

use fleet_core::VehicleId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("{what} file not found: {}", path.display())]
    ConfigurationMissing {
        what: &'static str,
        path: PathBuf,
    },

    #[error("mission parse error: {0}")]
    Parse(String),

    #[error("vehicle {0} has more than one mission")]
    DuplicateMission(VehicleId),

    #[error("mission for {0} violates action ordering (done prefix, single current action)")]
    InvalidOrdering(VehicleId),

    #[error("mission generator: {0}")]
    Generator(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MissionResult<T> = Result<T, MissionError>;
