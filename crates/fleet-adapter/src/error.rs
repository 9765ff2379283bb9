//! Adapter error type.

use fleet_core::{EdgeId, LaneId, ResourceId, VehicleId};
use thiserror::Error;

/// A query or command the Simulator rejected or could not answer.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("vehicle {0} is not in the simulation")]
    UnknownVehicle(VehicleId),

    #[error("resource {0} is not known to the simulator")]
    UnknownResource(ResourceId),

    #[error("edge {0} is not known to the simulator")]
    UnknownEdge(EdgeId),

    #[error("lane {0} is not known to the simulator")]
    UnknownLane(LaneId),

    #[error("{command} rejected for {subject}: {reason}")]
    Rejected {
        command: &'static str,
        subject: String,
        reason:  String,
    },

    #[error("simulator connection closed")]
    Disconnected,

    #[error("simulator connection failed: {0}")]
    Connection(String),
}

impl AdapterError {
    /// `true` for failures that end the run rather than one vehicle's tick.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AdapterError::Disconnected | AdapterError::Connection(_))
    }

    pub(crate) fn rejected(command: &'static str, subject: impl ToString, reason: impl Into<String>) -> Self {
        AdapterError::Rejected {
            command,
            subject: subject.to_string(),
            reason:  reason.into(),
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
