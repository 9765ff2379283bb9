//! Report records handed to observers and persisted by output backends.

use std::fmt;

use fleet_core::{Tick, VehicleId};
use serde::Serialize;

/// One fleet vehicle's figures for one reporting interval.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleSeriesPoint {
    pub vehicle:          VehicleId,
    pub distance_km:      f64,
    /// Speed sum over the interval divided by the interval length, so ticks
    /// the vehicle was absent count as zero.
    pub avg_speed_kmh:    f64,
    pub avg_speed_factor: f64,
    pub co2_g:            f64,
    pub nox_g:            f64,
}

/// Fleet-wide figures for one reporting interval.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FleetSummary {
    pub tick:          Tick,
    /// Interval ordinal, starting at 1.
    pub interval:      u64,
    /// `tick / report_interval`.
    pub time_units:    f64,
    /// Fleet vehicles seen so far.
    pub seen:          usize,
    pub distance_km:   f64,
    /// Mean of every fleet speed sample taken this interval.
    pub avg_speed_kmh: f64,
    /// Vehicles occupying pool resources at flush time.
    pub parked:        u32,
    /// `parked` as a percentage of the pool's known capacity.
    pub parking_pct:   f64,
    pub co2_g:         f64,
    pub nox_g:         f64,
    /// Fleet vehicle-ticks spent below the idle speed.
    pub waiting_ticks: u64,
    pub exited:        usize,
    pub active:        usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntervalReport {
    pub summary:  FleetSummary,
    pub vehicles: Vec<VehicleSeriesPoint>,
}

/// Why the Dispatch Loop stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every fleet vehicle appeared and then left the simulation.
    FleetCompleted,
    /// The configured tick budget was used up.
    TickBudget,
    /// The Simulator connection failed.
    AdapterFailure,
    /// An operator asked the run to stop.
    Cancelled,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminationReason::FleetCompleted => "fleet completed",
            TerminationReason::TickBudget     => "tick budget reached",
            TerminationReason::AdapterFailure => "simulator failure",
            TerminationReason::Cancelled      => "cancelled",
        })
    }
}

/// End-of-run aggregate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub final_tick:        Tick,
    pub reason:            TerminationReason,
    pub fleet_size:        usize,
    pub seen:              usize,
    pub completed:         usize,
    /// Fleet vehicles whose mission has actions left.
    pub incomplete:        Vec<VehicleId>,
    /// Fleet vehicles with an action that could not be assigned.
    pub malformed:         Vec<VehicleId>,
    pub reassignments:     u64,
    pub relocations:       u64,
    pub telemetry_dropped: u64,
}
