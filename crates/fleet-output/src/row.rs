//! Flat rows written by the output backends.
//!
//! Built from the dispatcher's report records; every field is a plain
//! number or string so each backend can write it without further lookups.

use fleet_core::VehicleId;
use fleet_dispatch::{FleetSummary, RunSummary, VehicleSeriesPoint};

/// One fleet vehicle's figures for one reporting interval.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSeriesRow {
    pub tick:             u64,
    pub interval:         u64,
    pub vehicle:          String,
    pub distance_km:      f64,
    pub avg_speed_kmh:    f64,
    pub avg_speed_factor: f64,
    pub co2_g:            f64,
    pub nox_g:            f64,
}

impl VehicleSeriesRow {
    pub fn new(summary: &FleetSummary, point: &VehicleSeriesPoint) -> Self {
        Self {
            tick:             summary.tick.0,
            interval:         summary.interval,
            vehicle:          point.vehicle.to_string(),
            distance_km:      point.distance_km,
            avg_speed_kmh:    point.avg_speed_kmh,
            avg_speed_factor: point.avg_speed_factor,
            co2_g:            point.co2_g,
            nox_g:            point.nox_g,
        }
    }
}

/// Fleet-wide figures for one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetSummaryRow {
    pub tick:          u64,
    pub interval:      u64,
    pub time_units:    f64,
    pub seen:          u64,
    pub distance_km:   f64,
    pub avg_speed_kmh: f64,
    pub parked:        u32,
    pub parking_pct:   f64,
    pub co2_g:         f64,
    pub nox_g:         f64,
    pub waiting_ticks: u64,
    pub exited:        u64,
    pub active:        u64,
}

impl From<&FleetSummary> for FleetSummaryRow {
    fn from(s: &FleetSummary) -> Self {
        Self {
            tick:          s.tick.0,
            interval:      s.interval,
            time_units:    s.time_units,
            seen:          s.seen as u64,
            distance_km:   s.distance_km,
            avg_speed_kmh: s.avg_speed_kmh,
            parked:        s.parked,
            parking_pct:   s.parking_pct,
            co2_g:         s.co2_g,
            nox_g:         s.nox_g,
            waiting_ticks: s.waiting_ticks,
            exited:        s.exited as u64,
            active:        s.active as u64,
        }
    }
}

/// The end-of-run aggregate.  Vehicle lists are `;`-separated.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalReportRow {
    pub final_tick:        u64,
    pub reason:            String,
    pub fleet_size:        u64,
    pub seen:              u64,
    pub completed:         u64,
    pub incomplete:        String,
    pub malformed:         String,
    pub reassignments:     u64,
    pub relocations:       u64,
    pub telemetry_dropped: u64,
}

fn join_ids(ids: &[VehicleId]) -> String {
    ids.iter().map(VehicleId::as_str).collect::<Vec<_>>().join(";")
}

impl From<&RunSummary> for FinalReportRow {
    fn from(s: &RunSummary) -> Self {
        Self {
            final_tick:        s.final_tick.0,
            reason:            s.reason.to_string(),
            fleet_size:        s.fleet_size as u64,
            seen:              s.seen as u64,
            completed:         s.completed as u64,
            incomplete:        join_ids(&s.incomplete),
            malformed:         join_ids(&s.malformed),
            reassignments:     s.reassignments,
            relocations:       s.relocations,
            telemetry_dropped: s.telemetry_dropped,
        }
    }
}
