//! Dispatch configuration.
//!
//! Every tunable of the Dispatch Loop lives in [`DispatchConfig`].  All
//! sections implement `Default`, and `#[serde(default)]` lets a TOML file
//! override any subset:
//!
//! ```toml
//! mode = "Mode011"
//! max_ticks = 7200
//!
//! [stops]
//! park_secs = 300.0
//!
//! [[chokepoints]]
//! edge = "-13963"
//! restricted_speed = 0.3
//! open_speed = 1.0
//! ```

use std::path::Path;

use fleet_adapter::StopState;
use fleet_core::{EdgeId, RunMode};
use fleet_mission::ActionKind;
use serde::{Deserialize, Serialize};

use crate::{DispatchError, DispatchResult};

// ── Sections ──────────────────────────────────────────────────────────────────

/// How long each kind of action keeps the vehicle at its resource.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopDurations {
    pub load_unload_secs: f64,
    pub park_secs:        f64,
}

impl Default for StopDurations {
    fn default() -> Self {
        Self {
            load_unload_secs: 180.0,
            park_secs:        600.0,
        }
    }
}

impl StopDurations {
    /// Stop duration for `kind`, or `None` for kinds that never stop.
    pub fn for_kind(&self, kind: ActionKind) -> Option<f64> {
        match kind {
            ActionKind::Load | ActionKind::Unload => Some(self.load_unload_secs),
            ActionKind::Park => Some(self.park_secs),
            ActionKind::Go => None,
        }
    }
}

/// Stop-state bits that mean "at the resource" for each kind of action.
///
/// Bit meanings drift between Simulator versions; only these masks are
/// consulted when deciding `Assigned → Arrived` and `Arrived → Done`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopMasks {
    /// Contact with a loading/unloading point.
    pub loading: StopState,
    /// Parked at a parking resource.
    pub parked:  StopState,
}

impl Default for StopMasks {
    fn default() -> Self {
        Self {
            loading: StopState::CONTAINER_STOP | StopState::BUS_STOP | StopState::PARKING_AREA,
            parked:  StopState::STOPPED,
        }
    }
}

impl StopMasks {
    /// The mask that signals arrival for `kind`.  `Go` never stops.
    pub fn for_kind(&self, kind: ActionKind) -> StopState {
        match kind {
            ActionKind::Load | ActionKind::Unload => self.loading,
            ActionKind::Park => self.parked,
            ActionKind::Go => StopState::NONE,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Speed (m/s) below which a vehicle counts as idle.
    pub idle_speed:        f64,
    /// Idle ticks tolerated before a non-fleet vehicle is relocated.
    pub stuck_ticks:       u32,
    /// Distance (m) a relocation moves the vehicle forward.
    pub relocation_offset: f64,
    /// Relocations never land closer than this to the lane end.
    pub lane_end_margin:   f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            idle_speed:        0.1,
            stuck_ticks:       60,
            relocation_offset: 15.0,
            lane_end_margin:   1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrationConfig {
    /// A parking vehicle is "waiting to park" with at most this many edges
    /// left after the current one...
    pub park_wait_edges_ahead: usize,
    /// ...and a speed (m/s) below this.
    pub park_wait_speed:       f64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            park_wait_edges_ahead: 1,
            park_wait_speed:       0.1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub reduced_factor: f64,
    pub normal_factor:  f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            reduced_factor: 0.5,
            normal_factor:  1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub max_speed_kmh:    f64,
    pub max_speed_factor: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_speed_kmh:    100.0,
            max_speed_factor: 2.0,
        }
    }
}

/// An edge whose speed limit depends on the chokepoint profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chokepoint {
    pub edge:             EdgeId,
    pub restricted_speed: f64,
    pub open_speed:       f64,
}

impl Chokepoint {
    pub fn new(edge: impl Into<EdgeId>, restricted_speed: f64, open_speed: f64) -> Self {
        Self {
            edge: edge.into(),
            restricted_speed,
            open_speed,
        }
    }
}

/// Port entry and exit gates.
fn default_chokepoints() -> Vec<Chokepoint> {
    vec![
        Chokepoint::new("-13963", 0.3, 1.0),
        Chokepoint::new("-2252", 0.5, 1.0),
    ]
}

// ── DispatchConfig ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub mode:               RunMode,
    /// The run ends after this many ticks.
    pub max_ticks:          u64,
    /// Statistics flush every this many ticks.
    pub report_interval:    u64,
    pub stops:              StopDurations,
    pub masks:              StopMasks,
    pub recovery:           RecoveryConfig,
    pub arbitration:        ArbitrationConfig,
    pub throttle:           ThrottleConfig,
    pub alerts:             AlertConfig,
    pub chokepoints:        Vec<Chokepoint>,
    /// Bounded telemetry channel size, in ticks.
    pub telemetry_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode:               RunMode::default(),
            max_ticks:          30_000,
            report_interval:    60,
            stops:              StopDurations::default(),
            masks:              StopMasks::default(),
            recovery:           RecoveryConfig::default(),
            arbitration:        ArbitrationConfig::default(),
            throttle:           ThrottleConfig::default(),
            alerts:             AlertConfig::default(),
            chokepoints:        default_chokepoints(),
            telemetry_capacity: 64,
        }
    }
}

impl DispatchConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> DispatchResult<Self> {
        let config: DispatchConfig =
            toml::from_str(text).map_err(|e| DispatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> DispatchResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DispatchError::ConfigurationMissing(format!("config file {}", path.display()))
            }
            _ => DispatchError::Config(format!("{}: {e}", path.display())),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), mode = %config.mode, "dispatch config loaded");
        Ok(config)
    }

    /// Reject values that would make the loop misbehave.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.report_interval == 0 {
            return Err(DispatchError::Config("report_interval must be at least 1".into()));
        }
        if self.telemetry_capacity == 0 {
            return Err(DispatchError::Config("telemetry_capacity must be at least 1".into()));
        }
        if !(self.throttle.reduced_factor > 0.0 && self.throttle.normal_factor > 0.0) {
            return Err(DispatchError::Config("throttle factors must be positive".into()));
        }
        if self.throttle.reduced_factor > self.throttle.normal_factor {
            return Err(DispatchError::Config(
                "throttle reduced_factor must not exceed normal_factor".into(),
            ));
        }
        if self.stops.load_unload_secs < 0.0 || self.stops.park_secs < 0.0 {
            return Err(DispatchError::Config("stop durations must not be negative".into()));
        }
        Ok(())
    }
}
