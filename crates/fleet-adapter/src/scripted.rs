//! A deterministic, in-memory Simulator.
//!
//! `ScriptedSimulator` models just enough traffic for the dispatcher to be
//! exercised end to end without an external process:
//!
//! - Edges have a length and a speed limit; each edge has a single lane
//!   `"<edge>_0"`.
//! - A vehicle departs at its scheduled tick, drives its route at
//!   `min(vehicle max, edge max) * speed_factor` and leaves the simulation
//!   when it runs off the end of the last edge.
//! - A pending resource stop halts the vehicle halfway along the resource's
//!   edge.  If the resource is full the vehicle queues there at zero speed
//!   until a slot frees; otherwise it occupies a slot for the stop duration
//!   and then drives on.
//!
//! Test hooks (`hold`, `poison`, `fail_step_at`, background occupancy) let
//! tests provoke stalls, per-vehicle query failures and lost connections.

use std::collections::{BTreeMap, HashMap, HashSet};

use fleet_core::{EdgeId, LaneId, ResourceId, VehicleId};

use crate::{AdapterError, AdapterResult, SimulatorAdapter, StopState};

/// Below this speed a vehicle counts as waiting.
const HALTING_SPEED: f64 = 0.1;

const CO2_IDLE_MG_S:  f64 = 1_600.0;
const CO2_PER_MPS:    f64 = 420.0;
const NOX_IDLE_MG_S:  f64 = 6.0;
const NOX_PER_MPS:    f64 = 1.4;

/// Resources sit this far along their edge (as a fraction of its length).
const STOP_POSITION: f64 = 0.5;

// ── Public scripting types ────────────────────────────────────────────────────

/// What a resource looks like to a vehicle stopped at it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    ParkingArea,
    LoadingBay,
}

impl ResourceKind {
    /// Stop-state flags reported while a vehicle occupies this resource.
    pub fn stop_state(self) -> StopState {
        match self {
            ResourceKind::ParkingArea => {
                StopState::STOPPED | StopState::PARKING | StopState::PARKING_AREA
            }
            ResourceKind::LoadingBay => StopState::STOPPED | StopState::CONTAINER_STOP,
        }
    }
}

/// A vehicle to insert into the simulation.
#[derive(Clone, Debug)]
pub struct VehicleSpec {
    pub id:        VehicleId,
    pub route:     Vec<EdgeId>,
    pub depart:    u64,
    pub max_speed: f64,
}

impl VehicleSpec {
    pub fn new<E: Into<EdgeId>>(id: impl Into<VehicleId>, route: impl IntoIterator<Item = E>) -> Self {
        Self {
            id:        id.into(),
            route:     route.into_iter().map(Into::into).collect(),
            depart:    0,
            max_speed: 13.89,
        }
    }

    /// First tick at which the vehicle may enter the network.
    pub fn departing_at(mut self, tick: u64) -> Self {
        self.depart = tick;
        self
    }

    pub fn max_speed(mut self, speed: f64) -> Self {
        self.max_speed = speed;
        self
    }
}

/// A command the Simulator accepted, recorded in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    ChangeTarget { vehicle: VehicleId, edge: EdgeId },
    SetResourceStop { vehicle: VehicleId, resource: ResourceId, duration_secs: f64 },
    ClearStop { vehicle: VehicleId },
    MoveTo { vehicle: VehicleId, lane: LaneId, position: f64 },
    SetSpeedFactor { vehicle: VehicleId, factor: f64 },
    SetEdgeMaxSpeed { edge: EdgeId, speed: f64 },
}

// ── Internal state ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct EdgeSpec {
    length:    f64,
    max_speed: f64,
}

#[derive(Debug)]
struct ResourceSlot {
    edge:       EdgeId,
    kind:       ResourceKind,
    capacity:   Option<u32>,
    occupants:  Vec<VehicleId>,
    /// Slots taken by vehicles outside the scripted population.
    background: u32,
}

impl ResourceSlot {
    fn occupancy(&self) -> u32 {
        self.occupants.len() as u32 + self.background
    }

    /// A missing or zero capacity never blocks.
    fn has_room(&self) -> bool {
        match self.capacity {
            Some(cap) if cap > 0 => self.occupancy() < cap,
            _ => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Scheduled,
    Driving,
    Stopped,
    Gone,
}

#[derive(Clone, Debug)]
struct PendingStop {
    resource: ResourceId,
    duration: f64,
}

#[derive(Debug)]
struct SimVehicle {
    id:             VehicleId,
    route:          Vec<EdgeId>,
    index:          usize,
    pos:            f64,
    speed:          f64,
    max_speed:      f64,
    factor:         f64,
    depart:         u64,
    phase:          Phase,
    pending:        Option<PendingStop>,
    stopped_at:     Option<ResourceId>,
    stop_remaining: f64,
    held:           bool,
    waiting:        f64,
    odometer:       f64,
    co2:            f64,
    nox:            f64,
}

impl SimVehicle {
    fn from_spec(spec: VehicleSpec) -> Self {
        Self {
            id:             spec.id,
            route:          spec.route,
            index:          0,
            pos:            0.0,
            speed:          0.0,
            max_speed:      spec.max_speed,
            factor:         1.0,
            depart:         spec.depart,
            phase:          Phase::Scheduled,
            pending:        None,
            stopped_at:     None,
            stop_remaining: 0.0,
            held:           false,
            waiting:        0.0,
            odometer:       0.0,
            co2:            0.0,
            nox:            0.0,
        }
    }

    fn is_present(&self) -> bool {
        matches!(self.phase, Phase::Driving | Phase::Stopped)
    }

    fn current_edge(&self) -> Option<&EdgeId> {
        self.route.get(self.index)
    }

    /// Record `moved` metres over a step of `dt` seconds.
    fn record_motion(&mut self, moved: f64, dt: f64) {
        self.speed = if dt > 0.0 { moved / dt } else { 0.0 };
        self.odometer += moved;
        if self.speed < HALTING_SPEED {
            self.waiting += dt;
        }
        self.co2 = CO2_IDLE_MG_S + CO2_PER_MPS * self.speed;
        self.nox = NOX_IDLE_MG_S + NOX_PER_MPS * self.speed;
    }

    fn record_engine_off(&mut self) {
        self.speed = 0.0;
        self.co2 = 0.0;
        self.nox = 0.0;
    }
}

// ── ScriptedSimulator ─────────────────────────────────────────────────────────

/// In-memory [`SimulatorAdapter`] with fully deterministic behaviour.
///
/// ```
/// use fleet_adapter::{ResourceKind, ScriptedSimulator, SimulatorAdapter, VehicleSpec};
///
/// let mut sim = ScriptedSimulator::new(1.0)
///     .with_edge("in", 100.0, 10.0)
///     .with_edge("out", 100.0, 10.0)
///     .with_resource("P1", "in", ResourceKind::ParkingArea, Some(2))
///     .with_vehicle(VehicleSpec::new("trk1", ["in", "out"]));
/// sim.connect().unwrap();
/// sim.step().unwrap();
/// assert_eq!(sim.vehicle_ids().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct ScriptedSimulator {
    step_length:  f64,
    tick:         u64,
    connected:    bool,
    closed:       bool,
    edges:        BTreeMap<EdgeId, EdgeSpec>,
    resources:    BTreeMap<ResourceId, ResourceSlot>,
    vehicles:     Vec<SimVehicle>,
    index:        HashMap<VehicleId, usize>,
    poisoned:     HashSet<VehicleId>,
    fail_step_at: Option<u64>,
    commands:     Vec<SimCommand>,
}

impl ScriptedSimulator {
    pub fn new(step_length_secs: f64) -> Self {
        Self {
            step_length:  step_length_secs,
            tick:         0,
            connected:    false,
            closed:       false,
            edges:        BTreeMap::new(),
            resources:    BTreeMap::new(),
            vehicles:     Vec::new(),
            index:        HashMap::new(),
            poisoned:     HashSet::new(),
            fail_step_at: None,
            commands:     Vec::new(),
        }
    }

    // ── Scenario setup ────────────────────────────────────────────────────────

    pub fn with_edge(mut self, id: impl Into<EdgeId>, length: f64, max_speed: f64) -> Self {
        self.edges.insert(id.into(), EdgeSpec { length, max_speed });
        self
    }

    /// Add a resource on `edge`.  `capacity: None` models a Simulator that
    /// does not publish the capacity parameter.
    pub fn with_resource(
        mut self,
        id: impl Into<ResourceId>,
        edge: impl Into<EdgeId>,
        kind: ResourceKind,
        capacity: Option<u32>,
    ) -> Self {
        self.resources.insert(
            id.into(),
            ResourceSlot {
                edge: edge.into(),
                kind,
                capacity,
                occupants: Vec::new(),
                background: 0,
            },
        );
        self
    }

    pub fn with_vehicle(mut self, spec: VehicleSpec) -> Self {
        self.add_vehicle(spec);
        self
    }

    /// Insert a vehicle, possibly mid-run.  A duplicate id replaces nothing
    /// and is ignored.
    pub fn add_vehicle(&mut self, spec: VehicleSpec) {
        if self.index.contains_key(&spec.id) {
            tracing::warn!(vehicle = %spec.id, "duplicate vehicle ignored");
            return;
        }
        self.index.insert(spec.id.clone(), self.vehicles.len());
        self.vehicles.push(SimVehicle::from_spec(spec));
    }

    // ── Test hooks ────────────────────────────────────────────────────────────

    /// Pin the vehicle at zero speed until [`release`](Self::release).
    pub fn hold(&mut self, vehicle: &str) -> bool {
        self.set_held(vehicle, true)
    }

    pub fn release(&mut self, vehicle: &str) -> bool {
        self.set_held(vehicle, false)
    }

    fn set_held(&mut self, vehicle: &str, held: bool) -> bool {
        match self.index.get(vehicle) {
            Some(&i) => {
                self.vehicles[i].held = held;
                true
            }
            None => false,
        }
    }

    /// Make every query and command about `vehicle` fail.
    pub fn poison(&mut self, vehicle: impl Into<VehicleId>) {
        self.poisoned.insert(vehicle.into());
    }

    pub fn cure(&mut self, vehicle: &str) {
        self.poisoned.remove(vehicle);
    }

    /// Occupy `count` slots of `resource` with vehicles outside the script.
    pub fn set_background_occupancy(&mut self, resource: &str, count: u32) -> bool {
        match self.resources.get_mut(resource) {
            Some(slot) => {
                slot.background = count;
                true
            }
            None => false,
        }
    }

    /// Drop the connection when the clock is about to pass `tick`.
    pub fn fail_step_at(&mut self, tick: u64) {
        self.fail_step_at = Some(tick);
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Accepted commands, oldest first.
    pub fn commands(&self) -> &[SimCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// `true` once the vehicle has driven off the end of its route.
    pub fn has_left(&self, vehicle: &str) -> bool {
        self.index
            .get(vehicle)
            .is_some_and(|&i| self.vehicles[i].phase == Phase::Gone)
    }

    /// The resource the vehicle is ordered to stop at, if any.
    pub fn pending_stop(&self, vehicle: &str) -> Option<&ResourceId> {
        let &i = self.index.get(vehicle)?;
        self.vehicles[i].pending.as_ref().map(|p| &p.resource)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn ensure_connected(&self) -> AdapterResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(AdapterError::Disconnected)
        }
    }

    fn slot_of(&self, vehicle: &VehicleId) -> AdapterResult<usize> {
        self.ensure_connected()?;
        if self.poisoned.contains(vehicle) {
            return Err(AdapterError::rejected("query", vehicle, "vehicle state unavailable"));
        }
        match self.index.get(vehicle) {
            Some(&i) if self.vehicles[i].is_present() => Ok(i),
            _ => Err(AdapterError::UnknownVehicle(vehicle.clone())),
        }
    }

    fn vehicle(&self, vehicle: &VehicleId) -> AdapterResult<&SimVehicle> {
        let i = self.slot_of(vehicle)?;
        Ok(&self.vehicles[i])
    }

    fn vehicle_mut(&mut self, vehicle: &VehicleId) -> AdapterResult<&mut SimVehicle> {
        let i = self.slot_of(vehicle)?;
        Ok(&mut self.vehicles[i])
    }

    fn edge_of_lane(&self, lane: &LaneId) -> AdapterResult<(EdgeId, &EdgeSpec)> {
        let edge = lane.edge().ok_or_else(|| AdapterError::UnknownLane(lane.clone()))?;
        let spec = self
            .edges
            .get(&edge)
            .ok_or_else(|| AdapterError::UnknownLane(lane.clone()))?;
        Ok((edge, spec))
    }
}

// ── Kinematics ────────────────────────────────────────────────────────────────

fn advance(
    v: &mut SimVehicle,
    edges: &BTreeMap<EdgeId, EdgeSpec>,
    resources: &mut BTreeMap<ResourceId, ResourceSlot>,
    tick: u64,
    dt: f64,
) {
    match v.phase {
        Phase::Gone => {}
        Phase::Scheduled => {
            if tick >= v.depart {
                v.phase = if v.route.is_empty() { Phase::Gone } else { Phase::Driving };
                v.index = 0;
                v.pos = 0.0;
                v.record_engine_off();
            }
        }
        Phase::Stopped => {
            v.record_engine_off();
            v.stop_remaining -= dt;
            if v.stop_remaining <= 0.0 {
                if let Some(resource) = v.stopped_at.take() {
                    if let Some(slot) = resources.get_mut(&resource) {
                        slot.occupants.retain(|o| o != &v.id);
                    }
                }
                v.phase = Phase::Driving;
            }
        }
        Phase::Driving => drive(v, edges, resources, dt),
    }
}

fn drive(
    v: &mut SimVehicle,
    edges: &BTreeMap<EdgeId, EdgeSpec>,
    resources: &mut BTreeMap<ResourceId, ResourceSlot>,
    dt: f64,
) {
    let Some(edge_id) = v.current_edge().cloned() else {
        v.phase = Phase::Gone;
        return;
    };
    let Some(edge) = edges.get(&edge_id) else {
        tracing::warn!(vehicle = %v.id, edge = %edge_id, "route enters unknown edge; vehicle removed");
        v.phase = Phase::Gone;
        return;
    };
    if v.held {
        v.record_motion(0.0, dt);
        return;
    }

    let travel = v.max_speed.min(edge.max_speed) * v.factor * dt;
    let to_end = (edge.length - v.pos).max(0.0);

    // A stop on this edge caps movement at the halting point.
    let stop_here = v
        .pending
        .as_ref()
        .filter(|p| resources.get(&p.resource).is_some_and(|r| r.edge == edge_id))
        .map(|p| p.resource.clone());

    if let Some(resource) = stop_here {
        let halt_at = (edge.length * STOP_POSITION).max(v.pos);
        let reached = travel >= halt_at - v.pos;
        let moved = if reached { halt_at - v.pos } else { travel };
        v.pos = if reached { halt_at } else { v.pos + travel };
        v.record_motion(moved, dt);
        if reached {
            if let Some(slot) = resources.get_mut(&resource) {
                if slot.has_room() {
                    slot.occupants.push(v.id.clone());
                    let duration = v.pending.take().map_or(0.0, |p| p.duration);
                    v.phase = Phase::Stopped;
                    v.stopped_at = Some(resource);
                    v.stop_remaining = duration;
                    v.record_engine_off();
                }
            }
        }
        return;
    }

    if travel < to_end {
        v.pos += travel;
        v.record_motion(travel, dt);
    } else if v.index + 1 < v.route.len() {
        v.index += 1;
        let next_len = v
            .current_edge()
            .and_then(|e| edges.get(e))
            .map_or(0.0, |e| e.length);
        v.pos = (travel - to_end).min(next_len);
        let moved = to_end + v.pos;
        v.record_motion(moved, dt);
    } else {
        v.pos = edge.length;
        v.record_motion(to_end, dt);
        v.phase = Phase::Gone;
    }
}

// ── SimulatorAdapter ──────────────────────────────────────────────────────────

impl SimulatorAdapter for ScriptedSimulator {
    fn connect(&mut self) -> AdapterResult<()> {
        if self.closed {
            return Err(AdapterError::Connection("simulator already closed".into()));
        }
        self.connected = true;
        Ok(())
    }

    fn step(&mut self) -> AdapterResult<()> {
        self.ensure_connected()?;
        if self.fail_step_at.is_some_and(|t| self.tick >= t) {
            self.connected = false;
            return Err(AdapterError::Connection(format!("connection lost at step {}", self.tick)));
        }
        self.tick += 1;
        let dt = self.step_length;
        for v in &mut self.vehicles {
            advance(v, &self.edges, &mut self.resources, self.tick, dt);
        }
        Ok(())
    }

    fn close(&mut self) -> AdapterResult<()> {
        self.connected = false;
        self.closed = true;
        Ok(())
    }

    fn step_length_secs(&self) -> f64 {
        self.step_length
    }

    fn vehicle_ids(&mut self) -> AdapterResult<Vec<VehicleId>> {
        self.ensure_connected()?;
        Ok(self
            .vehicles
            .iter()
            .filter(|v| v.is_present())
            .map(|v| v.id.clone())
            .collect())
    }

    fn route(&mut self, vehicle: &VehicleId) -> AdapterResult<Vec<EdgeId>> {
        Ok(self.vehicle(vehicle)?.route.clone())
    }

    fn route_index(&mut self, vehicle: &VehicleId) -> AdapterResult<Option<usize>> {
        Ok(Some(self.vehicle(vehicle)?.index))
    }

    fn road_id(&mut self, vehicle: &VehicleId) -> AdapterResult<EdgeId> {
        let v = self.vehicle(vehicle)?;
        v.current_edge()
            .cloned()
            .ok_or_else(|| AdapterError::rejected("road_id", vehicle, "vehicle has no edge"))
    }

    fn lane_id(&mut self, vehicle: &VehicleId) -> AdapterResult<LaneId> {
        let edge = self.road_id(vehicle)?;
        Ok(LaneId::first_of(&edge))
    }

    fn lane_position(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.pos)
    }

    fn speed(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.speed)
    }

    fn stop_state(&mut self, vehicle: &VehicleId) -> AdapterResult<StopState> {
        let v = self.vehicle(vehicle)?;
        if v.phase != Phase::Stopped {
            return Ok(StopState::NONE);
        }
        Ok(v.stopped_at
            .as_ref()
            .and_then(|r| self.resources.get(r))
            .map_or(StopState::STOPPED, |slot| slot.kind.stop_state()))
    }

    fn accumulated_waiting_time(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.waiting)
    }

    fn distance(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.odometer)
    }

    fn co2_emission(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.co2)
    }

    fn nox_emission(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.nox)
    }

    fn speed_factor(&mut self, vehicle: &VehicleId) -> AdapterResult<f64> {
        Ok(self.vehicle(vehicle)?.factor)
    }

    fn set_speed_factor(&mut self, vehicle: &VehicleId, factor: f64) -> AdapterResult<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(AdapterError::rejected(
                "set_speed_factor",
                vehicle,
                format!("factor {factor} must be positive"),
            ));
        }
        self.vehicle_mut(vehicle)?.factor = factor;
        self.commands.push(SimCommand::SetSpeedFactor {
            vehicle: vehicle.clone(),
            factor,
        });
        Ok(())
    }

    fn change_target(&mut self, vehicle: &VehicleId, edge: &EdgeId) -> AdapterResult<()> {
        if !self.edges.contains_key(edge) {
            return Err(AdapterError::UnknownEdge(edge.clone()));
        }
        let v = self.vehicle_mut(vehicle)?;
        let current = v
            .current_edge()
            .cloned()
            .ok_or_else(|| AdapterError::rejected("change_target", vehicle, "vehicle has no edge"))?;
        v.route = if &current == edge {
            vec![current]
        } else {
            vec![current, edge.clone()]
        };
        v.index = 0;
        self.commands.push(SimCommand::ChangeTarget {
            vehicle: vehicle.clone(),
            edge:    edge.clone(),
        });
        Ok(())
    }

    fn set_resource_stop(
        &mut self,
        vehicle: &VehicleId,
        resource: &ResourceId,
        duration_secs: f64,
    ) -> AdapterResult<()> {
        let stop_edge = self
            .resources
            .get(resource)
            .map(|slot| slot.edge.clone())
            .ok_or_else(|| AdapterError::UnknownResource(resource.clone()))?;
        let v = self.vehicle_mut(vehicle)?;
        if !v.route[v.index..].contains(&stop_edge) {
            return Err(AdapterError::rejected(
                "set_resource_stop",
                vehicle,
                format!("edge {stop_edge} of {resource} is not ahead on the route"),
            ));
        }
        v.pending = Some(PendingStop {
            resource: resource.clone(),
            duration: duration_secs,
        });
        self.commands.push(SimCommand::SetResourceStop {
            vehicle: vehicle.clone(),
            resource: resource.clone(),
            duration_secs,
        });
        Ok(())
    }

    fn clear_stop(&mut self, vehicle: &VehicleId) -> AdapterResult<()> {
        self.vehicle_mut(vehicle)?.pending = None;
        self.commands.push(SimCommand::ClearStop {
            vehicle: vehicle.clone(),
        });
        Ok(())
    }

    fn move_to(&mut self, vehicle: &VehicleId, lane: &LaneId, position: f64) -> AdapterResult<()> {
        let (edge, length) = {
            let (edge, spec) = self.edge_of_lane(lane)?;
            (edge, spec.length)
        };
        if !(0.0..=length).contains(&position) {
            return Err(AdapterError::rejected(
                "move_to",
                vehicle,
                format!("position {position:.1} outside lane {lane} (length {length:.1})"),
            ));
        }
        let v = self.vehicle_mut(vehicle)?;
        if v.current_edge() != Some(&edge) {
            return Err(AdapterError::rejected(
                "move_to",
                vehicle,
                format!("lane {lane} is not on the current edge"),
            ));
        }
        v.pos = position;
        self.commands.push(SimCommand::MoveTo {
            vehicle: vehicle.clone(),
            lane: lane.clone(),
            position,
        });
        Ok(())
    }

    fn lane_length(&mut self, lane: &LaneId) -> AdapterResult<f64> {
        self.ensure_connected()?;
        Ok(self.edge_of_lane(lane)?.1.length)
    }

    fn edge_max_speed(&mut self, edge: &EdgeId) -> AdapterResult<f64> {
        self.ensure_connected()?;
        self.edges
            .get(edge)
            .map(|e| e.max_speed)
            .ok_or_else(|| AdapterError::UnknownEdge(edge.clone()))
    }

    fn set_edge_max_speed(&mut self, edge: &EdgeId, speed: f64) -> AdapterResult<()> {
        self.ensure_connected()?;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(AdapterError::rejected(
                "set_edge_max_speed",
                edge,
                format!("speed {speed} must be positive"),
            ));
        }
        let spec = self
            .edges
            .get_mut(edge)
            .ok_or_else(|| AdapterError::UnknownEdge(edge.clone()))?;
        spec.max_speed = speed;
        self.commands.push(SimCommand::SetEdgeMaxSpeed {
            edge: edge.clone(),
            speed,
        });
        Ok(())
    }

    fn resource_occupancy(&mut self, resource: &ResourceId) -> AdapterResult<u32> {
        self.ensure_connected()?;
        self.resources
            .get(resource)
            .map(ResourceSlot::occupancy)
            .ok_or_else(|| AdapterError::UnknownResource(resource.clone()))
    }

    fn resource_capacity(&mut self, resource: &ResourceId) -> AdapterResult<Option<u32>> {
        self.ensure_connected()?;
        self.resources
            .get(resource)
            .map(|slot| slot.capacity)
            .ok_or_else(|| AdapterError::UnknownResource(resource.clone()))
    }
}
