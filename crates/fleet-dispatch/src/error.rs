//! Dispatch error type.

use fleet_adapter::AdapterError;
use fleet_core::{ResourceId, VehicleId};
use fleet_mission::{ActionDefect, MissionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("simulator adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("mission store error: {0}")]
    Mission(#[from] MissionError),

    #[error("malformed action for {vehicle}: {defect}")]
    MalformedAction {
        vehicle: VehicleId,
        defect:  ActionDefect,
    },

    #[error("no usable alternative to {resource} for {vehicle}")]
    ResourceUnresolvable {
        vehicle:  VehicleId,
        resource: ResourceId,
    },

    #[error("required input missing: {0}")]
    ConfigurationMissing(String),

    #[error("dispatch configuration error: {0}")]
    Config(String),

    #[error("dispatcher already terminated")]
    Terminated,
}

impl DispatchError {
    /// `true` if the run cannot continue.
    pub fn is_fatal(&self) -> bool {
        match self {
            DispatchError::Adapter(e) => e.is_fatal(),
            DispatchError::MalformedAction { .. } | DispatchError::ResourceUnresolvable { .. } => false,
            _ => true,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
