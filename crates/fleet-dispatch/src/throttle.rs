//! Speed throttling while a vehicle's target is full.
//!
//! Independent of reassignment: the vehicle keeps its target but slows to
//! `reduced_factor` until the target has room again, then returns to
//! `normal_factor`.

use fleet_adapter::{AdapterResult, SimulatorAdapter};
use fleet_core::{ResourceId, VehicleId};
use tracing::debug;

use crate::arbiter::ResourceArbitrator;
use crate::config::ThrottleConfig;

#[derive(Copy, Clone, Debug)]
pub struct ContentionThrottle {
    reduced: f64,
    normal:  f64,
}

impl ContentionThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            reduced: config.reduced_factor,
            normal:  config.normal_factor,
        }
    }

    /// The factor to apply given the target's fullness, or `None` to leave
    /// the current factor alone.
    pub fn decide(&self, target_full: bool, current_factor: f64) -> Option<f64> {
        if target_full && current_factor > self.reduced {
            Some(self.reduced)
        } else if !target_full && current_factor < self.normal {
            Some(self.normal)
        } else {
            None
        }
    }

    /// Check `target` and adjust the vehicle's speed factor.  Returns the
    /// factor that was set, if any.
    pub fn regulate<A: SimulatorAdapter>(
        &self,
        adapter:        &mut A,
        arbiter:        &mut ResourceArbitrator,
        vehicle:        &VehicleId,
        target:         &ResourceId,
        current_factor: f64,
    ) -> AdapterResult<Option<f64>> {
        let full = arbiter.is_full(adapter, target);
        let Some(factor) = self.decide(full, current_factor) else {
            return Ok(None);
        };
        adapter.set_speed_factor(vehicle, factor)?;
        debug!(vehicle = %vehicle, target = %target, full, factor, "speed factor adjusted");
        Ok(Some(factor))
    }
}
