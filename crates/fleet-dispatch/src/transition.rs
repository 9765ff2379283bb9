//! Per-action state machine.
//!
//! ```text
//!   Pending ──assign──▶ Assigned ──stopped at resource──▶ Arrived ──moving again──▶ Done
//!                          │
//!                          └──(Go) no edges ahead──────────────────────────────────▶ Done
//! ```
//!
//! [`settle`] is a pure function of the observed stop state and route
//! progress; only [`assign`] talks to the Simulator.  Each call moves an
//! action at most one state.

use fleet_adapter::{SimulatorAdapter, StopState};
use fleet_core::VehicleId;
use fleet_mission::{Action, ActionKind, ActionStatus};
use tracing::debug;

use crate::config::{StopDurations, StopMasks};
use crate::{DispatchError, DispatchResult};

/// What the Simulator reported about a vehicle this tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct Progress {
    pub stop_state:  StopState,
    /// Edges still ahead after the current one; only read for `Go`.
    pub edges_ahead: Option<usize>,
}

/// The status `action` moves to given `progress`, or `None` to stay put.
///
/// `Pending` is never settled here; it needs [`assign`].
pub fn settle(action: &Action, progress: Progress, masks: &StopMasks) -> Option<ActionStatus> {
    let at_resource = progress.stop_state.intersects(masks.for_kind(action.kind));
    match (action.status, action.kind) {
        (ActionStatus::Assigned, ActionKind::Go) => {
            (progress.edges_ahead == Some(0)).then_some(ActionStatus::Done)
        }
        (ActionStatus::Assigned, _) => at_resource.then_some(ActionStatus::Arrived),
        (ActionStatus::Arrived, _) => (!at_resource).then_some(ActionStatus::Done),
        (ActionStatus::Pending | ActionStatus::Done, _) => None,
    }
}

/// Route the vehicle to the action's edge and, for kinds that stop, order
/// a stop at its resource.  On success the action becomes `Assigned`.
///
/// A malformed action is refused and stays `Pending`.  If a Simulator
/// command fails the action also stays `Pending` and is retried next tick.
pub fn assign<A: SimulatorAdapter>(
    adapter:   &mut A,
    vehicle:   &VehicleId,
    action:    &mut Action,
    durations: &StopDurations,
) -> DispatchResult<()> {
    if let Some(defect) = action.defect() {
        return Err(DispatchError::MalformedAction {
            vehicle: vehicle.clone(),
            defect,
        });
    }
    adapter.change_target(vehicle, &action.edge)?;
    if let Some(duration) = durations.for_kind(action.kind) {
        adapter.set_resource_stop(vehicle, &action.target, duration)?;
    }
    action.status = ActionStatus::Assigned;
    debug!(
        vehicle = %vehicle,
        kind = %action.kind,
        target = %action.target,
        edge = %action.edge,
        "action assigned"
    );
    Ok(())
}
