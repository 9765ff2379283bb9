//! Interval statistics.
//!
//! Per-vehicle accumulators are indexed by fleet position and reset at
//! every flush.  Distance comes from odometer deltas, so a missed tick does
//! not lose distance.

use fleet_core::{Tick, VehicleId};

use crate::report::{FleetSummary, IntervalReport, VehicleSeriesPoint};

const MS_TO_KMH: f64 = 3.6;

/// Raw per-tick reading of a fleet vehicle.
#[derive(Copy, Clone, Debug, Default)]
pub struct VehicleSample {
    pub speed_ms:     f64,
    pub odometer_m:   f64,
    pub speed_factor: f64,
    /// Emission rates as reported by the Simulator (mg/s).
    pub co2_mg_s:     f64,
    pub nox_mg_s:     f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Totals {
    distance_km:   f64,
    speed_sum_kmh: f64,
    factor_sum:    f64,
    co2_g:         f64,
    nox_g:         f64,
}

/// Occupancy of the resource pool at flush time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolOccupancy {
    pub parked:   u32,
    pub capacity: u32,
}

impl PoolOccupancy {
    pub fn percent(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            f64::from(self.parked) * 100.0 / f64::from(self.capacity)
        }
    }
}

/// Fleet head-counts at flush time.
#[derive(Copy, Clone, Debug, Default)]
pub struct FleetCounts {
    pub seen:   usize,
    pub exited: usize,
    pub active: usize,
}

pub struct IntervalStats {
    vehicles:      Vec<VehicleId>,
    totals:        Vec<Totals>,
    odometer:      Vec<Option<f64>>,
    speeds_kmh:    Vec<f64>,
    waiting_ticks: u64,
    idle_speed:    f64,
    step_secs:     f64,
    flushes:       u64,
}

impl IntervalStats {
    /// `vehicles` fixes the fleet order used by [`record`](Self::record).
    pub fn new(vehicles: Vec<VehicleId>, idle_speed: f64, step_secs: f64) -> Self {
        let n = vehicles.len();
        Self {
            vehicles,
            totals: vec![Totals::default(); n],
            odometer: vec![None; n],
            speeds_kmh: Vec::new(),
            waiting_ticks: 0,
            idle_speed,
            step_secs,
            flushes: 0,
        }
    }

    /// Add one tick's reading for fleet vehicle `index`.
    pub fn record(&mut self, index: usize, sample: &VehicleSample) {
        let Some(totals) = self.totals.get_mut(index) else {
            return;
        };
        let previous = self.odometer[index].replace(sample.odometer_m).unwrap_or(0.0);
        let delta = sample.odometer_m - previous;
        if delta > 0.0 {
            totals.distance_km += delta / 1000.0;
        }
        let kmh = sample.speed_ms * MS_TO_KMH;
        totals.speed_sum_kmh += kmh;
        totals.factor_sum += sample.speed_factor.max(0.0);
        totals.co2_g += sample.co2_mg_s.max(0.0) * self.step_secs / 1000.0;
        totals.nox_g += sample.nox_mg_s.max(0.0) * self.step_secs / 1000.0;
        self.speeds_kmh.push(kmh);
        if sample.speed_ms < self.idle_speed {
            self.waiting_ticks += 1;
        }
    }

    /// Distance accumulated for `index` since the last flush.
    pub fn pending_distance_km(&self, index: usize) -> f64 {
        self.totals.get(index).map_or(0.0, |t| t.distance_km)
    }

    /// Number of flushes so far.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Close the interval ending at `tick`, produce its report, and reset
    /// the accumulators.
    ///
    /// `span` is the number of ticks the interval actually covered; it is
    /// shorter than `interval` only for the last, partial interval of a run.
    /// Per-vehicle averages divide by `span`.
    pub fn flush(
        &mut self,
        tick:     Tick,
        interval: u64,
        span:     u64,
        pool:     PoolOccupancy,
        counts:   FleetCounts,
    ) -> IntervalReport {
        self.flushes += 1;
        let len = span.max(1) as f64;

        let vehicles: Vec<VehicleSeriesPoint> = self
            .vehicles
            .iter()
            .zip(&self.totals)
            .map(|(vehicle, t)| VehicleSeriesPoint {
                vehicle:          vehicle.clone(),
                distance_km:      t.distance_km,
                avg_speed_kmh:    t.speed_sum_kmh / len,
                avg_speed_factor: t.factor_sum / len,
                co2_g:            t.co2_g,
                nox_g:            t.nox_g,
            })
            .collect();

        let avg_speed_kmh = if self.speeds_kmh.is_empty() {
            0.0
        } else {
            self.speeds_kmh.iter().sum::<f64>() / self.speeds_kmh.len() as f64
        };

        let summary = FleetSummary {
            tick,
            interval:      self.flushes,
            time_units:    tick.0 as f64 / interval.max(1) as f64,
            seen:          counts.seen,
            distance_km:   vehicles.iter().map(|v| v.distance_km).sum(),
            avg_speed_kmh,
            parked:        pool.parked,
            parking_pct:   pool.percent(),
            co2_g:         vehicles.iter().map(|v| v.co2_g).sum(),
            nox_g:         vehicles.iter().map(|v| v.nox_g).sum(),
            waiting_ticks: self.waiting_ticks,
            exited:        counts.exited,
            active:        counts.active,
        };

        self.totals.iter_mut().for_each(|t| *t = Totals::default());
        self.speeds_kmh.clear();
        self.waiting_ticks = 0;

        IntervalReport { summary, vehicles }
    }
}
