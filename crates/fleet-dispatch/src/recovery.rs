//! Recovery Monitor: relocates background vehicles that stay stalled.
//!
//! Every vehicle gets a consecutive-idle-tick counter.  Once it exceeds the
//! threshold for a vehicle outside the fleet, the vehicle is moved forward
//! along its lane.  Fleet vehicles are counted but never moved; relocating
//! them would invalidate their mission progress.

use fleet_adapter::{AdapterResult, SimulatorAdapter};
use fleet_core::VehicleId;
use tracing::{info, warn};

use crate::config::RecoveryConfig;

#[cfg(feature = "fx-hash")]
type CounterMap = rustc_hash::FxHashMap<VehicleId, u32>;
#[cfg(not(feature = "fx-hash"))]
type CounterMap = std::collections::HashMap<VehicleId, u32>;

pub struct RecoveryMonitor {
    config:      RecoveryConfig,
    counters:    CounterMap,
    relocations: u64,
}

impl RecoveryMonitor {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            counters: CounterMap::default(),
            relocations: 0,
        }
    }

    /// Update the idle counter from this tick's speed and return it.
    pub fn observe(&mut self, vehicle: &VehicleId, speed: f64) -> u32 {
        let counter = self.counters.entry(vehicle.clone()).or_insert(0);
        if speed < self.config.idle_speed {
            *counter += 1;
        } else {
            *counter = 0;
        }
        *counter
    }

    pub fn counter(&self, vehicle: &VehicleId) -> u32 {
        self.counters.get(vehicle).copied().unwrap_or(0)
    }

    /// `true` once the counter has passed the threshold.
    pub fn is_stuck(&self, vehicle: &VehicleId) -> bool {
        self.counter(vehicle) > self.config.stuck_ticks
    }

    /// Move the vehicle `relocation_offset` metres forward on its lane,
    /// stopping `lane_end_margin` short of the lane end.  Returns the new
    /// position, or `None` when the vehicle already sits within the margin
    /// and there is no room ahead.
    ///
    /// The counter is reset whether or not the move succeeds, so a vehicle
    /// the Simulator refuses to move is retried only after another full idle
    /// period.
    pub fn relocate<A: SimulatorAdapter>(
        &mut self,
        adapter: &mut A,
        vehicle: &VehicleId,
    ) -> AdapterResult<Option<f64>> {
        let idle = self.counter(vehicle);
        self.counters.insert(vehicle.clone(), 0);

        let result = self.move_forward(adapter, vehicle);
        match &result {
            Ok(Some(position)) => {
                self.relocations += 1;
                info!(vehicle = %vehicle, idle_ticks = idle, position = *position, "stalled vehicle relocated");
            }
            Ok(None) => info!(vehicle = %vehicle, idle_ticks = idle, "stalled vehicle at lane end; not moved"),
            Err(e) => warn!(vehicle = %vehicle, idle_ticks = idle, error = %e, "relocation failed"),
        }
        result
    }

    fn move_forward<A: SimulatorAdapter>(&self, adapter: &mut A, vehicle: &VehicleId) -> AdapterResult<Option<f64>> {
        let lane = adapter.lane_id(vehicle)?;
        let position = adapter.lane_position(vehicle)?;
        let length = adapter.lane_length(&lane)?;
        let limit = length - self.config.lane_end_margin;
        if position >= limit {
            return Ok(None);
        }
        let target = (position + self.config.relocation_offset).min(limit).max(position);
        adapter.move_to(vehicle, &lane, target)?;
        Ok(Some(target))
    }

    /// Drop counters of vehicles for which `keep` is false.
    pub fn retain(&mut self, mut keep: impl FnMut(&VehicleId) -> bool) {
        self.counters.retain(|v, _| keep(v));
    }

    pub fn tracked(&self) -> usize {
        self.counters.len()
    }

    pub fn relocations(&self) -> u64 {
        self.relocations
    }
}
