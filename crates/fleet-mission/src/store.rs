//! The `MissionStore`: every fleet vehicle's mission, keyed by vehicle id.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use fleet_core::VehicleId;

use crate::{Mission, MissionError, MissionResult};

/// In-memory home of all missions.
///
/// Missions are kept in insertion order; that order defines each vehicle's
/// *fleet index*, which report writers use as a stable column order.  The
/// store is owned by the dispatch loop and handed out by reference only.
#[derive(Clone, Debug, Default)]
pub struct MissionStore {
    missions: Vec<Mission>,
    index:    HashMap<VehicleId, usize>,
}

impl MissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `missions`, rejecting duplicate vehicles and
    /// missions whose statuses break the ordering invariant.
    pub fn from_missions(missions: Vec<Mission>) -> MissionResult<Self> {
        let mut store = Self::new();
        for mission in missions {
            store.insert(mission)?;
        }
        Ok(store)
    }

    /// Add one mission to the end of the fleet order.
    pub fn insert(&mut self, mission: Mission) -> MissionResult<()> {
        if self.index.contains_key(&mission.vehicle) {
            return Err(MissionError::DuplicateMission(mission.vehicle));
        }
        if !mission.is_well_ordered() {
            return Err(MissionError::InvalidOrdering(mission.vehicle));
        }
        self.index.insert(mission.vehicle.clone(), self.missions.len());
        self.missions.push(mission);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// `true` if `vehicle` belongs to the managed fleet.
    #[inline]
    pub fn contains(&self, vehicle: &str) -> bool {
        self.index.contains_key(vehicle)
    }

    /// Position of `vehicle` in fleet order.
    #[inline]
    pub fn fleet_index(&self, vehicle: &str) -> Option<usize> {
        self.index.get(vehicle).copied()
    }

    pub fn get(&self, vehicle: &str) -> Option<&Mission> {
        self.fleet_index(vehicle).map(|i| &self.missions[i])
    }

    pub fn get_mut(&mut self, vehicle: &str) -> Option<&mut Mission> {
        let i = self.fleet_index(vehicle)?;
        Some(&mut self.missions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mission> {
        self.missions.iter()
    }

    /// Vehicle ids in fleet order.
    pub fn vehicle_ids(&self) -> impl Iterator<Item = &VehicleId> {
        self.missions.iter().map(|m| &m.vehicle)
    }

    /// Vehicles whose mission is not complete, in fleet order.
    pub fn incomplete(&self) -> impl Iterator<Item = &VehicleId> {
        self.missions
            .iter()
            .filter(|m| !m.is_complete())
            .map(|m| &m.vehicle)
    }

    // ── Final-state snapshot ──────────────────────────────────────────────

    /// Write every mission (with per-action status) as pretty JSON.
    pub fn write_snapshot_json<W: Write>(&self, writer: W) -> MissionResult<()> {
        serde_json::to_writer_pretty(writer, &self.missions)?;
        Ok(())
    }

    /// Write the snapshot to `path`, creating or truncating the file.
    pub fn save_snapshot(&self, path: &Path) -> MissionResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_snapshot_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Rebuild a store from a snapshot written by
    /// [`write_snapshot_json`][Self::write_snapshot_json].
    pub fn read_snapshot_json<R: Read>(reader: R) -> MissionResult<Self> {
        let missions: Vec<Mission> = serde_json::from_reader(BufReader::new(reader))?;
        Self::from_missions(missions)
    }
}
