//! The `SimulatorAdapter` trait.
//!
//! # Pluggability
//!
//! The dispatcher never talks to a Simulator directly.  Every query and
//! command goes through [`SimulatorAdapter`], so a live TraCI connection and
//! the in-memory [`ScriptedSimulator`](crate::ScriptedSimulator) are
//! interchangeable.
//!
//! # Error model
//!
//! Every call returns [`AdapterResult`].  Per-vehicle failures
//! (`UnknownVehicle`, `Rejected`) are recoverable and the dispatcher skips
//! that vehicle for the tick; [`AdapterError::is_fatal`] failures end the run.
//!
//! # Units
//!
//! Distances are metres, speeds metres per second, durations seconds and
//! emissions milligrams per second, matching SUMO.

use fleet_core::{EdgeId, LaneId, ResourceId, VehicleId};

use crate::{AdapterResult, StopState};

/// Connection to a microscopic traffic Simulator.
///
/// Methods take `&mut self` because a real client serialises every request
/// over one socket; queries are not free.
pub trait SimulatorAdapter {
    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Open the connection.  Called once, before the first `step`.
    fn connect(&mut self) -> AdapterResult<()>;

    /// Advance the Simulator by one step.
    fn step(&mut self) -> AdapterResult<()>;

    /// Release the connection.  Must be safe to call more than once.
    fn close(&mut self) -> AdapterResult<()>;

    /// Simulated seconds per step.
    fn step_length_secs(&self) -> f64 {
        1.0
    }

    // ── Vehicle queries ───────────────────────────────────────────────────────

    /// Vehicles currently present, in a stable order.
    fn vehicle_ids(&mut self) -> AdapterResult<Vec<VehicleId>>;

    /// The vehicle's full planned route.
    fn route(&mut self, vehicle: &VehicleId) -> AdapterResult<Vec<EdgeId>>;

    /// Position in [`route`](Self::route), or `None` before the vehicle has
    /// entered its first edge.
    fn route_index(&mut self, vehicle: &VehicleId) -> AdapterResult<Option<usize>>;

    /// The edge the vehicle is on.
    fn road_id(&mut self, vehicle: &VehicleId) -> AdapterResult<EdgeId>;

    fn lane_id(&mut self, vehicle: &VehicleId) -> AdapterResult<LaneId>;

    /// Distance from the start of the current lane.
    fn lane_position(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    fn speed(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    fn stop_state(&mut self, vehicle: &VehicleId) -> AdapterResult<StopState>;

    /// Seconds spent below the Simulator's halting speed.
    fn accumulated_waiting_time(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    /// Odometer reading since departure.
    fn distance(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    /// CO2 emitted during the last step.
    fn co2_emission(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    /// NOx emitted during the last step.
    fn nox_emission(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    fn speed_factor(&mut self, vehicle: &VehicleId) -> AdapterResult<f64>;

    // ── Vehicle commands ──────────────────────────────────────────────────────

    fn set_speed_factor(&mut self, vehicle: &VehicleId, factor: f64) -> AdapterResult<()>;

    /// Reroute the vehicle so that its route ends on `edge`.
    fn change_target(&mut self, vehicle: &VehicleId, edge: &EdgeId) -> AdapterResult<()>;

    /// Order a stop at `resource` for `duration_secs` once the vehicle
    /// reaches it.  Replaces any stop already pending.
    fn set_resource_stop(
        &mut self,
        vehicle: &VehicleId,
        resource: &ResourceId,
        duration_secs: f64,
    ) -> AdapterResult<()>;

    /// Cancel the pending stop, if any.
    fn clear_stop(&mut self, vehicle: &VehicleId) -> AdapterResult<()>;

    /// Teleport the vehicle to `position` on `lane`.
    fn move_to(&mut self, vehicle: &VehicleId, lane: &LaneId, position: f64) -> AdapterResult<()>;

    // ── Network ───────────────────────────────────────────────────────────────

    fn lane_length(&mut self, lane: &LaneId) -> AdapterResult<f64>;

    fn edge_max_speed(&mut self, edge: &EdgeId) -> AdapterResult<f64>;

    fn set_edge_max_speed(&mut self, edge: &EdgeId, speed: f64) -> AdapterResult<()>;

    // ── Resources ─────────────────────────────────────────────────────────────

    /// Vehicles currently occupying `resource`.
    fn resource_occupancy(&mut self, resource: &ResourceId) -> AdapterResult<u32>;

    /// Declared capacity, or `None` if the Simulator does not publish one.
    fn resource_capacity(&mut self, resource: &ResourceId) -> AdapterResult<Option<u32>>;

    // ── Derived queries ───────────────────────────────────────────────────────

    /// Edges still to be entered after the current one.  Before departure
    /// the whole route is ahead.
    fn edges_ahead(&mut self, vehicle: &VehicleId) -> AdapterResult<usize> {
        let len = self.route(vehicle)?.len();
        Ok(match self.route_index(vehicle)? {
            Some(index) => len.saturating_sub(index + 1),
            None => len,
        })
    }
}
