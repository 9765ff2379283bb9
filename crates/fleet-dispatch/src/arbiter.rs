//! Resource Arbitrator: fullness checks and substitute selection.
//!
//! # Fail-open
//!
//! A resource whose occupancy or capacity cannot be read is treated as *not
//! full*.  Treating it as full would send every vehicle bound for it hunting
//! for alternatives on each tick that the telemetry gap lasts.
//!
//! # Policies
//!
//! | Policy      | Reassigns a `Park` action when…                                 |
//! |-------------|-----------------------------------------------------------------|
//! | Reactive    | the vehicle is waiting to park (near its target, not moving)    |
//! | Proactive   | the target is full *and* the alternative is confirmed not full  |
//!
//! Both substitute at most once per evaluation; the replaced action goes back
//! to `Pending` and is assigned by the state machine on the next tick.

use std::collections::HashSet;

use fleet_adapter::{AdapterResult, SimulatorAdapter};
use fleet_core::{ArbitrationPolicy, ResourceId, VehicleId};
use fleet_mission::{Action, ResourceEntry, ResourcePool};
use tracing::{info, warn};

use crate::config::ArbitrationConfig;

/// Fullness from a raw reading.  Unknown or zero capacity is never full.
#[inline]
pub fn is_full_reading(occupancy: u32, capacity: Option<u32>) -> bool {
    match capacity {
        Some(cap) if cap > 0 => occupancy >= cap,
        _ => false,
    }
}

/// What the arbitrator wants done with a `Park` action this tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Leave the action alone.
    Keep,
    /// Substitute this resource.
    Reassign(ResourceEntry),
    /// Substitution is warranted but no usable alternative exists.
    Unresolvable,
}

pub struct ResourceArbitrator {
    pool:        ResourcePool,
    policy:      ArbitrationPolicy,
    config:      ArbitrationConfig,
    /// Resources already reported as having no capacity; warned once each.
    unknown_cap: HashSet<ResourceId>,
}

impl ResourceArbitrator {
    pub fn new(pool: ResourcePool, policy: ArbitrationPolicy, config: ArbitrationConfig) -> Self {
        Self {
            pool,
            policy,
            config,
            unknown_cap: HashSet::new(),
        }
    }

    #[inline]
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    #[inline]
    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    /// `true` iff occupancy has reached a known, non-zero capacity.
    pub fn is_full<A: SimulatorAdapter>(&mut self, adapter: &mut A, resource: &ResourceId) -> bool {
        let occupancy = match adapter.resource_occupancy(resource) {
            Ok(n) => n,
            Err(e) => {
                warn!(resource = %resource, error = %e, "occupancy unavailable; assuming not full");
                return false;
            }
        };
        let capacity = match adapter.resource_capacity(resource) {
            Ok(c) => c,
            Err(e) => {
                warn!(resource = %resource, error = %e, "capacity unavailable; assuming not full");
                return false;
            }
        };
        if capacity.is_none_or(|c| c == 0) && self.unknown_cap.insert(resource.clone()) {
            warn!(resource = %resource, "capacity unknown; resource treated as never full");
        }
        is_full_reading(occupancy, capacity)
    }

    /// First pool entry other than `excluded`.
    #[inline]
    pub fn find_alternative(&self, excluded: &ResourceId) -> Option<&ResourceEntry> {
        self.pool.find_alternative(excluded)
    }

    /// Decide whether `action` (an `Assigned` `Park` action of a vehicle that
    /// is not parked) should move to another resource.
    ///
    /// `speed` is the vehicle's current speed; it is only consulted by the
    /// reactive policy.
    pub fn evaluate<A: SimulatorAdapter>(
        &mut self,
        adapter: &mut A,
        vehicle: &VehicleId,
        action:  &Action,
        speed:   f64,
    ) -> AdapterResult<Verdict> {
        match self.policy {
            ArbitrationPolicy::Reactive => {
                if !self.is_waiting_to_park(adapter, vehicle, speed)? {
                    return Ok(Verdict::Keep);
                }
                Ok(match self.find_alternative(&action.target) {
                    Some(alt) => Verdict::Reassign(alt.clone()),
                    None => Verdict::Unresolvable,
                })
            }
            ArbitrationPolicy::Proactive => {
                if !self.is_full(adapter, &action.target) {
                    return Ok(Verdict::Keep);
                }
                let Some(alt) = self.find_alternative(&action.target).cloned() else {
                    return Ok(Verdict::Unresolvable);
                };
                if self.is_full(adapter, &alt.id) {
                    return Ok(Verdict::Unresolvable);
                }
                Ok(Verdict::Reassign(alt))
            }
        }
    }

    /// Near the end of its route and not moving.
    pub fn is_waiting_to_park<A: SimulatorAdapter>(
        &self,
        adapter: &mut A,
        vehicle: &VehicleId,
        speed:   f64,
    ) -> AdapterResult<bool> {
        if speed >= self.config.park_wait_speed {
            return Ok(false);
        }
        Ok(adapter.edges_ahead(vehicle)? <= self.config.park_wait_edges_ahead)
    }

    /// Cancel the pending stop and point `action` at `alt`.  The action
    /// returns to `Pending`.
    pub fn reassign<A: SimulatorAdapter>(
        &self,
        adapter: &mut A,
        vehicle: &VehicleId,
        action:  &mut Action,
        alt:     &ResourceEntry,
    ) -> AdapterResult<()> {
        adapter.clear_stop(vehicle)?;
        info!(
            vehicle = %vehicle,
            from = %action.target,
            to = %alt.id,
            policy = ?self.policy,
            "resource reassigned"
        );
        action.retarget(alt.id.clone(), alt.edge.clone());
        Ok(())
    }
}
