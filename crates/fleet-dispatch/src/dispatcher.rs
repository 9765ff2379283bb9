//! The `Dispatcher` and its tick loop.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use fleet_adapter::{AdapterResult, SimulatorAdapter, StopState};
use fleet_core::{ChokepointProfile, EdgeId, SimClock, Tick, VehicleId};
use fleet_mission::{ActionKind, ActionStatus, MissionStore};
use tracing::{debug, error, info, warn};

use crate::arbiter::{ResourceArbitrator, Verdict};
use crate::config::DispatchConfig;
use crate::recovery::RecoveryMonitor;
use crate::report::{IntervalReport, RunSummary, TerminationReason};
use crate::stats::{FleetCounts, IntervalStats, PoolOccupancy, VehicleSample};
use crate::telemetry::{TelemetryPublisher, VehicleSnapshot};
use crate::throttle::ContentionThrottle;
use crate::transition::{self, Progress};
use crate::{CancelToken, DispatchError, DispatchObserver, DispatchResult};

const MS_TO_KMH: f64 = 3.6;

/// Lifecycle of a run.
///
/// ```text
/// Initializing ──start──▶ Running ──termination──▶ Draining ──▶ Terminated
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Initializing,
    Running,
    Draining,
    Terminated,
}

/// Everything read from the Simulator about one fleet vehicle in one tick.
struct VehicleReading {
    road:         EdgeId,
    waiting_secs: f64,
    stop_state:   StopState,
    sample:       VehicleSample,
}

fn read_vehicle<A: SimulatorAdapter>(adapter: &mut A, vehicle: &VehicleId) -> AdapterResult<VehicleReading> {
    Ok(VehicleReading {
        road:         adapter.road_id(vehicle)?,
        waiting_secs: adapter.accumulated_waiting_time(vehicle)?,
        stop_state:   adapter.stop_state(vehicle)?,
        sample:       VehicleSample {
            speed_ms:     adapter.speed(vehicle)?,
            odometer_m:   adapter.distance(vehicle)?,
            speed_factor: adapter.speed_factor(vehicle)?,
            co2_mg_s:     adapter.co2_emission(vehicle)?,
            nox_mg_s:     adapter.nox_emission(vehicle)?,
        },
    })
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// The Dispatch Loop.
///
/// Each tick:
///
/// 1. **Step** the Simulator and advance the clock.
/// 2. **Fleet vehicles** (in the Simulator's reported order): read state,
///    record statistics, build a telemetry snapshot, then advance the current
///    action at most one state, throttling and arbitrating as the run mode
///    asks.
/// 3. **Recovery**: update idle counters for every vehicle and relocate
///    stalled non-fleet vehicles.
/// 4. **Publish** the tick's snapshots; note fleet vehicles that left.
/// 5. **Flush** interval statistics when the reporting interval closes.
/// 6. **Terminate** if the fleet has completed, the tick budget is spent,
///    the Simulator failed, or the run was cancelled.
///
/// Per-vehicle Simulator errors skip that vehicle for the rest of the tick.
/// Create via [`DispatcherBuilder`][crate::DispatcherBuilder].
pub struct Dispatcher<A: SimulatorAdapter> {
    pub config:    DispatchConfig,
    pub clock:     SimClock,
    adapter:       A,
    store:         MissionStore,
    arbiter:       ResourceArbitrator,
    throttle:      Option<ContentionThrottle>,
    recovery:      RecoveryMonitor,
    stats:         IntervalStats,
    telemetry:     Option<TelemetryPublisher>,
    cancel:        CancelToken,
    snapshot_path: Option<PathBuf>,
    phase:         RunPhase,
    /// Fleet ids in store order; the flags below share this indexing.
    fleet:         Vec<VehicleId>,
    seen:          Vec<bool>,
    present:       Vec<bool>,
    exited:        Vec<bool>,
    malformed:     BTreeSet<VehicleId>,
    reassignments: u64,
    /// Tick of the last statistics flush.
    last_flush:    Tick,
    summary:       Option<RunSummary>,
}

impl<A: SimulatorAdapter> Dispatcher<A> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config:        DispatchConfig,
        adapter:       A,
        store:         MissionStore,
        arbiter:       ResourceArbitrator,
        telemetry:     Option<TelemetryPublisher>,
        cancel:        CancelToken,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        let fleet: Vec<VehicleId> = store.vehicle_ids().cloned().collect();
        let n = fleet.len();
        let throttle = config.mode.throttle.then(|| ContentionThrottle::new(config.throttle));
        Self {
            clock: SimClock::new(adapter.step_length_secs()),
            stats: IntervalStats::new(
                fleet.clone(),
                config.recovery.idle_speed,
                adapter.step_length_secs(),
            ),
            recovery: RecoveryMonitor::new(config.recovery),
            throttle,
            config,
            adapter,
            store,
            arbiter,
            telemetry,
            cancel,
            snapshot_path,
            phase: RunPhase::Initializing,
            fleet,
            seen: vec![false; n],
            present: vec![false; n],
            exited: vec![false; n],
            malformed: BTreeSet::new(),
            reassignments: 0,
            last_flush: Tick::ZERO,
            summary: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn store(&self) -> &MissionStore {
        &self.store
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn arbiter(&self) -> &ResourceArbitrator {
        &self.arbiter
    }

    pub fn recovery(&self) -> &RecoveryMonitor {
        &self.recovery
    }

    /// A handle that stops the run after the current tick.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn reassignments(&self) -> u64 {
        self.reassignments
    }

    /// Fleet vehicles that have appeared in the Simulator so far.
    pub fn seen_count(&self) -> usize {
        self.seen.iter().filter(|&&s| s).count()
    }

    /// The final summary, once the run has drained.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Give back the adapter and the Mission Store.
    pub fn into_parts(self) -> (A, MissionStore) {
        (self.adapter, self.store)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Connect to the Simulator and apply the chokepoint profile.  Called
    /// implicitly by [`run`](Self::run) and [`step`](Self::step).
    pub fn start(&mut self) -> DispatchResult<()> {
        match self.phase {
            RunPhase::Initializing => {}
            RunPhase::Running => return Ok(()),
            RunPhase::Draining | RunPhase::Terminated => return Err(DispatchError::Terminated),
        }
        self.adapter.connect()?;
        self.apply_chokepoints();
        self.phase = RunPhase::Running;
        info!(
            fleet = self.fleet.len(),
            resources = self.arbiter.pool().len(),
            mode = %self.config.mode,
            max_ticks = self.config.max_ticks,
            "dispatch started"
        );
        Ok(())
    }

    /// Run until a termination condition holds, then drain.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: DispatchObserver>(&mut self, observer: &mut O) -> DispatchResult<RunSummary> {
        self.start()?;
        let reason = loop {
            if let Some(reason) = self.step(observer)? {
                break reason;
            }
        };
        self.drain(reason, observer)
    }

    /// Run at most `n` ticks without draining.  Returns the termination
    /// reason if one fired.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: DispatchObserver>(
        &mut self,
        n:        u64,
        observer: &mut O,
    ) -> DispatchResult<Option<TerminationReason>> {
        self.start()?;
        for _ in 0..n {
            if let Some(reason) = self.step(observer)? {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    /// Process one tick.  Returns `Some(reason)` when the run should end;
    /// the caller then calls [`drain`](Self::drain).
    pub fn step<O: DispatchObserver>(&mut self, observer: &mut O) -> DispatchResult<Option<TerminationReason>> {
        match self.phase {
            RunPhase::Initializing => self.start()?,
            RunPhase::Running => {}
            RunPhase::Draining | RunPhase::Terminated => return Err(DispatchError::Terminated),
        }
        if self.clock.current_tick.0 >= self.config.max_ticks {
            return Ok(Some(TerminationReason::TickBudget));
        }
        if self.cancel.is_cancelled() {
            return Ok(Some(TerminationReason::Cancelled));
        }

        if let Err(e) = self.adapter.step() {
            error!(tick = %self.clock.current_tick, error = %e, "simulator step failed");
            return Ok(Some(TerminationReason::AdapterFailure));
        }
        self.clock.advance();
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let active = match self.adapter.vehicle_ids() {
            Ok(ids) => ids,
            Err(e) => {
                error!(tick = %now, error = %e, "vehicle list unavailable");
                return Ok(Some(TerminationReason::AdapterFailure));
            }
        };

        let mut fatal = false;
        let mut snapshots = Vec::new();
        self.present.iter_mut().for_each(|p| *p = false);

        for vehicle in &active {
            let fleet_index = self.store.fleet_index(vehicle.as_str());
            let speed = match fleet_index {
                Some(index) => self.process_fleet_vehicle(index, vehicle, now, &mut snapshots, &mut fatal),
                None => self.read_background_speed(vehicle, &mut fatal),
            };
            if let Some(speed) = speed {
                self.check_recovery(vehicle, speed, fleet_index.is_some(), &mut fatal);
            }
        }

        let active_set: HashSet<&VehicleId> = active.iter().collect();
        self.recovery.retain(|v| active_set.contains(v));

        if !snapshots.is_empty() {
            if let Some(publisher) = self.telemetry.as_mut() {
                publisher.publish(now, snapshots);
            }
        }

        self.note_exits(now);

        if now.closes_interval(self.config.report_interval) {
            let report = self.flush_interval(now);
            observer.on_interval(&report);
        }

        observer.on_tick_end(now, active.len());
        Ok(self.termination(now, fatal))
    }

    /// Persist, publish the end-of-stream marker, and disconnect.
    pub fn drain<O: DispatchObserver>(
        &mut self,
        reason:   TerminationReason,
        observer: &mut O,
    ) -> DispatchResult<RunSummary> {
        if matches!(self.phase, RunPhase::Draining | RunPhase::Terminated) {
            return Err(DispatchError::Terminated);
        }
        self.phase = RunPhase::Draining;
        info!(tick = %self.clock.current_tick, %reason, "draining");

        // Ticks since the last full interval still go into the series.
        let now = self.clock.current_tick;
        if now > self.last_flush {
            let report = self.flush_interval(now);
            observer.on_interval(&report);
        }

        if let Some(path) = &self.snapshot_path {
            match self.store.save_snapshot(path) {
                Ok(()) => info!(path = %path.display(), "mission snapshot saved"),
                Err(e) => error!(path = %path.display(), error = %e, "mission snapshot failed"),
            }
        }

        let summary = self.build_summary(reason);
        observer.on_run_end(&summary);

        if let Some(publisher) = self.telemetry.as_mut() {
            publisher.finish();
        }
        if let Err(e) = self.adapter.close() {
            warn!(error = %e, "simulator close failed");
        }
        self.phase = RunPhase::Terminated;

        info!(
            final_tick = %summary.final_tick,
            reason = %summary.reason,
            completed = summary.completed,
            fleet = summary.fleet_size,
            reassignments = summary.reassignments,
            relocations = summary.relocations,
            "run finished"
        );
        if !summary.incomplete.is_empty() {
            let names: Vec<&str> = summary.incomplete.iter().map(VehicleId::as_str).collect();
            warn!(count = names.len(), vehicles = %names.join(","), "missions not completed");
        }

        self.summary = Some(summary.clone());
        Ok(summary)
    }

    // ── Initialisation ────────────────────────────────────────────────────

    fn apply_chokepoints(&mut self) {
        let profile = self.config.mode.chokepoints;
        for point in &self.config.chokepoints {
            let speed = match profile {
                ChokepointProfile::Restricted => point.restricted_speed,
                ChokepointProfile::Open => point.open_speed,
            };
            match self.adapter.set_edge_max_speed(&point.edge, speed) {
                Ok(()) => debug!(edge = %point.edge, speed, ?profile, "chokepoint speed set"),
                Err(e) => warn!(edge = %point.edge, error = %e, "chokepoint speed not applied"),
            }
        }
    }

    // ── Per-vehicle processing ────────────────────────────────────────────

    /// Returns the vehicle's speed for the Recovery Monitor, or `None` if
    /// it was skipped.
    fn process_fleet_vehicle(
        &mut self,
        index:     usize,
        vehicle:   &VehicleId,
        now:       Tick,
        snapshots: &mut Vec<VehicleSnapshot>,
        fatal:     &mut bool,
    ) -> Option<f64> {
        self.present[index] = true;
        if !self.seen[index] {
            self.seen[index] = true;
            info!(vehicle = %vehicle, tick = %now, "fleet vehicle entered");
        }

        let reading = match read_vehicle(&mut self.adapter, vehicle) {
            Ok(reading) => reading,
            Err(e) => {
                *fatal |= e.is_fatal();
                warn!(vehicle = %vehicle, tick = %now, error = %e, "vehicle state unavailable; skipped this tick");
                if let Some(mission) = self.store.get(vehicle.as_str()) {
                    snapshots.push(VehicleSnapshot::for_mission(mission));
                }
                return None;
            }
        };

        self.raise_alerts(vehicle, &reading);
        self.stats.record(index, &reading.sample);

        if let Some(mission) = self.store.get(vehicle.as_str()) {
            let mut snapshot = VehicleSnapshot::for_mission(mission);
            snapshot.location = reading.road.to_string();
            snapshot.speed_kmh = reading.sample.speed_ms * MS_TO_KMH;
            snapshot.waiting_secs = reading.waiting_secs;
            snapshots.push(snapshot);
        }

        match self.advance_mission(vehicle, &reading) {
            Ok(()) => {}
            Err(DispatchError::MalformedAction { vehicle, defect }) => {
                if self.malformed.insert(vehicle.clone()) {
                    warn!(vehicle = %vehicle, %defect, "malformed action left pending");
                }
            }
            Err(DispatchError::ResourceUnresolvable { vehicle, resource }) => {
                debug!(vehicle = %vehicle, resource = %resource, "no usable alternative; keeping target");
            }
            Err(DispatchError::Adapter(e)) => {
                *fatal |= e.is_fatal();
                warn!(vehicle = %vehicle, tick = %now, error = %e, "mission step failed; vehicle skipped this tick");
            }
            Err(e) => warn!(vehicle = %vehicle, error = %e, "mission step failed"),
        }
        Some(reading.sample.speed_ms)
    }

    /// Advance the vehicle's current action by at most one state.
    fn advance_mission(&mut self, vehicle: &VehicleId, reading: &VehicleReading) -> DispatchResult<()> {
        let Self {
            adapter,
            store,
            arbiter,
            throttle,
            config,
            reassignments,
            ..
        } = self;

        let Some(action) = store.get_mut(vehicle.as_str()).and_then(|m| m.current_mut()) else {
            return Ok(());
        };
        let stopped = reading.stop_state.is_stopped();

        match action.status {
            ActionStatus::Pending => transition::assign(adapter, vehicle, action, &config.stops),
            ActionStatus::Assigned => {
                if let Some(throttle) = throttle.as_ref() {
                    if action.kind != ActionKind::Go && !stopped {
                        throttle.regulate(adapter, arbiter, vehicle, &action.target, reading.sample.speed_factor)?;
                    }
                }

                let edges_ahead = match action.kind {
                    ActionKind::Go => Some(adapter.edges_ahead(vehicle)?),
                    _ => None,
                };
                let progress = Progress {
                    stop_state: reading.stop_state,
                    edges_ahead,
                };
                if let Some(next) = transition::settle(action, progress, &config.masks) {
                    debug!(vehicle = %vehicle, kind = %action.kind, from = %action.status, to = %next, "action transition");
                    action.status = next;
                    return Ok(());
                }

                if action.kind == ActionKind::Park && !stopped {
                    match arbiter.evaluate(adapter, vehicle, action, reading.sample.speed_ms)? {
                        Verdict::Keep => {}
                        Verdict::Reassign(alt) => {
                            arbiter.reassign(adapter, vehicle, action, &alt)?;
                            *reassignments += 1;
                        }
                        Verdict::Unresolvable => {
                            return Err(DispatchError::ResourceUnresolvable {
                                vehicle:  vehicle.clone(),
                                resource: action.target.clone(),
                            });
                        }
                    }
                }
                Ok(())
            }
            ActionStatus::Arrived => {
                let progress = Progress {
                    stop_state:  reading.stop_state,
                    edges_ahead: None,
                };
                if let Some(next) = transition::settle(action, progress, &config.masks) {
                    debug!(vehicle = %vehicle, kind = %action.kind, from = %action.status, to = %next, "action transition");
                    action.status = next;
                }
                Ok(())
            }
            ActionStatus::Done => Ok(()),
        }
    }

    fn raise_alerts(&self, vehicle: &VehicleId, reading: &VehicleReading) {
        let speed_kmh = reading.sample.speed_ms * MS_TO_KMH;
        if speed_kmh > self.config.alerts.max_speed_kmh {
            warn!(vehicle = %vehicle, speed_kmh, "speed alert");
        }
        if reading.sample.speed_factor > self.config.alerts.max_speed_factor {
            warn!(vehicle = %vehicle, speed_factor = reading.sample.speed_factor, "speed factor alert");
        }
    }

    fn read_background_speed(&mut self, vehicle: &VehicleId, fatal: &mut bool) -> Option<f64> {
        match self.adapter.speed(vehicle) {
            Ok(speed) => Some(speed),
            Err(e) => {
                *fatal |= e.is_fatal();
                warn!(vehicle = %vehicle, error = %e, "speed unavailable; recovery skipped this tick");
                None
            }
        }
    }

    fn check_recovery(&mut self, vehicle: &VehicleId, speed: f64, is_fleet: bool, fatal: &mut bool) {
        self.recovery.observe(vehicle, speed);
        if is_fleet || !self.recovery.is_stuck(vehicle) {
            return;
        }
        if let Err(e) = self.recovery.relocate(&mut self.adapter, vehicle) {
            *fatal |= e.is_fatal();
        }
    }

    // ── End of tick ───────────────────────────────────────────────────────

    fn note_exits(&mut self, now: Tick) {
        for (i, vehicle) in self.fleet.iter().enumerate() {
            if self.seen[i] && !self.present[i] && !self.exited[i] {
                self.exited[i] = true;
                info!(vehicle = %vehicle, tick = %now, "fleet vehicle exited");
            }
        }
    }

    fn pool_occupancy(&mut self) -> PoolOccupancy {
        let mut occupancy = PoolOccupancy::default();
        for entry in self.arbiter.pool().entries() {
            match self.adapter.resource_occupancy(&entry.id) {
                Ok(n) => occupancy.parked += n,
                Err(e) => warn!(resource = %entry.id, error = %e, "occupancy unavailable for report"),
            }
            match self.adapter.resource_capacity(&entry.id) {
                Ok(capacity) => occupancy.capacity += capacity.unwrap_or(0),
                Err(e) => warn!(resource = %entry.id, error = %e, "capacity unavailable for report"),
            }
        }
        occupancy
    }

    fn flush_interval(&mut self, now: Tick) -> IntervalReport {
        let pool = self.pool_occupancy();
        let count = |flags: &[bool]| flags.iter().filter(|&&f| f).count();
        let counts = FleetCounts {
            seen:   count(&self.seen),
            exited: count(&self.exited),
            active: count(&self.present),
        };
        let span = now.since(self.last_flush);
        self.last_flush = now;
        let report = self.stats.flush(now, self.config.report_interval, span, pool, counts);
        let s = &report.summary;
        info!(
            tick = %now,
            interval = s.interval,
            span,
            seen = s.seen,
            active = s.active,
            distance_km = s.distance_km,
            avg_speed_kmh = s.avg_speed_kmh,
            parked = s.parked,
            parking_pct = s.parking_pct,
            "interval flushed"
        );
        report
    }

    fn termination(&self, now: Tick, fatal: bool) -> Option<TerminationReason> {
        first_termination(Stops {
            fleet_completed: !self.fleet.is_empty() && self.exited.iter().all(|&e| e),
            budget_reached:  now.0 >= self.config.max_ticks,
            adapter_failed:  fatal,
            cancelled:       self.cancel.is_cancelled(),
        })
    }

    fn build_summary(&self, reason: TerminationReason) -> RunSummary {
        RunSummary {
            final_tick:        self.clock.current_tick,
            reason,
            fleet_size:        self.fleet.len(),
            seen:              self.seen_count(),
            completed:         self.store.iter().filter(|m| m.is_complete()).count(),
            incomplete:        self.store.incomplete().cloned().collect(),
            malformed:         self.malformed.iter().cloned().collect(),
            reassignments:     self.reassignments,
            relocations:       self.recovery.relocations(),
            telemetry_dropped: self.telemetry.as_ref().map_or(0, TelemetryPublisher::dropped),
        }
    }
}

// ── Termination ───────────────────────────────────────────────────────────────

/// Stop conditions observed at the end of a tick.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Stops {
    pub fleet_completed: bool,
    pub budget_reached:  bool,
    pub adapter_failed:  bool,
    pub cancelled:       bool,
}

/// First condition that holds wins, in the order fleet completed, tick
/// budget, Simulator failure, cancellation.
pub(crate) fn first_termination(stops: Stops) -> Option<TerminationReason> {
    if stops.fleet_completed {
        Some(TerminationReason::FleetCompleted)
    } else if stops.budget_reached {
        Some(TerminationReason::TickBudget)
    } else if stops.adapter_failed {
        Some(TerminationReason::AdapterFailure)
    } else if stops.cancelled {
        Some(TerminationReason::Cancelled)
    } else {
        None
    }
}
