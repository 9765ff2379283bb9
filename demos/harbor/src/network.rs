//! The harbor network and its resources.
//!
//! ```text
//!  -13963 ─▶ approach ─┬─▶ yard_a (S_A1)  ─┐
//!  (gate in)           ├─▶ yard_b (S_B1)  ─┤
//!                      ├─▶ park_north (P_N)┼─▶ exit_road ─▶ -2252
//!                      └─▶ park_south (P_S)┘               (gate out)
//! ```
//!
//! Both gates are the chokepoints whose speed the run mode sets.

use fleet_adapter::{ResourceKind, ScriptedSimulator, VehicleSpec};
use fleet_core::{EdgeId, VehicleId};
use fleet_mission::{ResourceEntry, ResourcePool};

pub const GATE_IN:  &str = "-13963";
pub const GATE_OUT: &str = "-2252";

/// Slots in the north lot already taken when the run starts.
const NORTH_LOT_PREOCCUPIED: u32 = 3;

/// Ticks between consecutive fleet departures.
const FLEET_HEADWAY: u64 = 15;

const BACKGROUND_VEHICLES: usize = 6;
const BACKGROUND_HEADWAY:  u64   = 40;

pub struct Harbor {
    pub stops:    Vec<ResourceEntry>,
    pub parkings: Vec<ResourceEntry>,
    pub exits:    Vec<EdgeId>,
}

impl Default for Harbor {
    fn default() -> Self {
        Self {
            stops:    vec![ResourceEntry::new("S_A1", "yard_a"), ResourceEntry::new("S_B1", "yard_b")],
            parkings: vec![
                ResourceEntry::new("P_N", "park_north").with_capacity_hint(4),
                ResourceEntry::new("P_S", "park_south").with_capacity_hint(3),
            ],
            exits:    vec![EdgeId::new(GATE_OUT)],
        }
    }
}

impl Harbor {
    /// Parking areas a blocked `Park` action may be moved to.
    pub fn pool(&self) -> ResourcePool {
        ResourcePool::new(self.parkings.clone())
    }

    /// A simulator with the fleet `fleet` departing at the
    /// gate in turn, plus through traffic that never takes a mission.
    pub fn simulator(&self, fleet: &[VehicleId]) -> ScriptedSimulator {
        let mut sim = ScriptedSimulator::new(1.0)
            .with_edge(GATE_IN, 120.0, 8.33)
            .with_edge("approach", 400.0, 13.89)
            .with_edge("yard_a", 200.0, 8.33)
            .with_edge("yard_b", 200.0, 8.33)
            .with_edge("park_north", 150.0, 5.56)
            .with_edge("park_south", 150.0, 5.56)
            .with_edge("exit_road", 300.0, 13.89)
            .with_edge(GATE_OUT, 120.0, 8.33)
            .with_resource("S_A1", "yard_a", ResourceKind::LoadingBay, None)
            .with_resource("S_B1", "yard_b", ResourceKind::LoadingBay, None)
            .with_resource("P_N", "park_north", ResourceKind::ParkingArea, Some(4))
            .with_resource("P_S", "park_south", ResourceKind::ParkingArea, Some(3));
        sim.set_background_occupancy("P_N", NORTH_LOT_PREOCCUPIED);

        for (i, id) in fleet.iter().enumerate() {
            sim.add_vehicle(
                VehicleSpec::new(id.clone(), [GATE_IN, "approach"])
                    .departing_at(1 + i as u64 * FLEET_HEADWAY)
                    .max_speed(11.0),
            );
        }
        for i in 0..BACKGROUND_VEHICLES {
            sim.add_vehicle(
                VehicleSpec::new(format!("car{}", i + 1), [GATE_IN, "approach", "exit_road", GATE_OUT])
                    .departing_at(5 + i as u64 * BACKGROUND_HEADWAY),
            );
        }
        sim
    }
}
