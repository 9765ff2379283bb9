//! CSV mission and resource loaders.
//!
//! # Missions CSV
//!
//! One row per action, in mission order.  Rows for the same vehicle need not
//! be contiguous; fleet order follows each vehicle's first appearance.
//!
//! ```csv
//! vehicle_id,kind,target,edge,status
//! trk1,Load,Stop2,-9012,pending
//! trk1,Park,Prk1,--101938#11,
//! trk1,Go,-2252,-2252,0
//! ```
//!
//! | Column   | Accepted values                                             |
//! |----------|-------------------------------------------------------------|
//! | `kind`   | `Load`, `Unload`, `Park`, `Go` (any case) or `L`/`U`/`P`/`G` |
//! | `status` | `pending`/`assigned`/`arrived`/`done`, legacy `0`..`3`, or empty |
//!
//! Empty `target`/`edge` cells are loaded as-is; the dispatcher refuses to
//! assign such actions and reports them.
//!
//! # Resources CSV
//!
//! ```csv
//! resource_id,edge,capacity
//! Prk1,--101938#11,10
//! Prk2,--101932,
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fleet_core::VehicleId;

use crate::{Action, Mission, MissionError, MissionResult, MissionStore, ResourceEntry, ResourcePool};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MissionRecord {
    vehicle_id: String,
    kind:       String,
    #[serde(default)]
    target:     String,
    #[serde(default)]
    edge:       String,
    #[serde(default)]
    status:     String,
}

#[derive(Deserialize)]
struct ResourceRecord {
    resource_id: String,
    edge:        String,
    #[serde(default)]
    capacity:    Option<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the Mission Store from a CSV file.
///
/// A missing file is reported as [`MissionError::ConfigurationMissing`]:
/// without missions there is nothing to dispatch.
pub fn load_missions_csv(path: &Path) -> MissionResult<MissionStore> {
    let file = open_config(path, "missions")?;
    load_missions_reader(file)
}

/// Like [`load_missions_csv`] but accepts any `Read` source.
pub fn load_missions_reader<R: Read>(reader: R) -> MissionResult<MissionStore> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut order: Vec<VehicleId> = Vec::new();
    let mut by_vehicle: HashMap<VehicleId, Vec<Action>> = HashMap::new();

    for (line, result) in csv_reader.deserialize::<MissionRecord>().enumerate() {
        let row = result?;
        let vehicle = VehicleId::new(row.vehicle_id.trim());
        if vehicle.is_empty() {
            return Err(MissionError::Parse(format!("row {}: empty vehicle_id", line + 1)));
        }

        let action = Action {
            kind:   row.kind.parse()?,
            target: row.target.trim().into(),
            edge:   row.edge.trim().into(),
            status: row.status.parse()?,
        };

        by_vehicle
            .entry(vehicle.clone())
            .or_insert_with(|| {
                order.push(vehicle);
                Vec::new()
            })
            .push(action);
    }

    let missions = order
        .into_iter()
        .map(|vehicle| {
            let actions = by_vehicle.remove(&vehicle).unwrap_or_default();
            Mission::new(vehicle, actions)
        })
        .collect();

    let store = MissionStore::from_missions(missions)?;
    tracing::debug!(missions = store.len(), "loaded mission store");
    Ok(store)
}

/// Load the resource pool from a CSV file.
pub fn load_resources_csv(path: &Path) -> MissionResult<ResourcePool> {
    let file = open_config(path, "resource pool")?;
    load_resources_reader(file)
}

/// Like [`load_resources_csv`] but accepts any `Read` source.
pub fn load_resources_reader<R: Read>(reader: R) -> MissionResult<ResourcePool> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();

    for result in csv_reader.deserialize::<ResourceRecord>() {
        let row = result?;
        let id = row.resource_id.trim();
        let edge = row.edge.trim();
        if id.is_empty() || edge.is_empty() {
            return Err(MissionError::Parse(format!(
                "resource row {id:?}: both resource_id and edge are required"
            )));
        }
        entries.push(ResourceEntry {
            id:            id.into(),
            edge:          edge.into(),
            capacity_hint: row.capacity,
        });
    }

    tracing::debug!(resources = entries.len(), "loaded resource pool");
    Ok(ResourcePool::new(entries))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open_config(path: &Path, what: &'static str) -> MissionResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MissionError::ConfigurationMissing {
            what,
            path: path.to_path_buf(),
        },
        _ => MissionError::Io(e),
    })
}
