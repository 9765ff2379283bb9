//! `fleet-dispatch`: the Dispatch Loop of the rust_fleet engine.
//!
//! # Tick loop
//!
//! ```text
//! loop:
//!   ① Step        advance the Simulator one step, advance the clock.
//!   ② Fleet       per fleet vehicle: read state, record statistics,
//!                 snapshot, advance the current action one state
//!                 (throttle / arbitrate per run mode).
//!   ③ Recovery    idle counters for all vehicles; relocate stalled
//!                 non-fleet vehicles.
//!   ④ Publish     telemetry snapshots; note exited fleet vehicles.
//!   ⑤ Flush       interval statistics when the interval closes.
//!   ⑥ Terminate?  fleet completed, tick budget, Simulator failure,
//!                 cancellation.
//! ```
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`dispatcher`]  | `Dispatcher`, `RunPhase`                                |
//! | [`builder`]     | `DispatcherBuilder`                                     |
//! | [`config`]      | `DispatchConfig` and its sections, TOML loading         |
//! | [`transition`]  | Per-action state machine (`settle`, `assign`)           |
//! | [`arbiter`]     | `ResourceArbitrator`, fail-open fullness checks         |
//! | [`throttle`]    | `ContentionThrottle` speed factors                      |
//! | [`recovery`]    | `RecoveryMonitor` stalled-vehicle relocation            |
//! | [`stats`]       | `IntervalStats` accumulators                            |
//! | [`report`]      | `IntervalReport`, `RunSummary`, `TerminationReason`     |
//! | [`telemetry`]   | Drop-oldest `TelemetryPublisher`, `VehicleSnapshot`     |
//! | [`monitor`]     | Monitor thread, `MonitorBoard`, `LogMonitor`            |
//! | [`observer`]    | `DispatchObserver`, `NoopObserver`                      |
//! | [`cancel`]      | `CancelToken`                                           |
//! | [`error`]       | `DispatchError`, `DispatchResult<T>`                    |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | FxHashMap for the Recovery Monitor's per-vehicle counters |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_dispatch::{DispatchConfig, DispatcherBuilder, NoopObserver};
//!
//! let mut dispatcher = DispatcherBuilder::new(simulator, DispatchConfig::default())
//!     .missions(store)
//!     .resources(pool)
//!     .build()?;
//! let summary = dispatcher.run(&mut NoopObserver)?;
//! ```

pub mod arbiter;
pub mod builder;
pub mod cancel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod monitor;
pub mod observer;
pub mod recovery;
pub mod report;
pub mod stats;
pub mod telemetry;
pub mod throttle;
pub mod transition;


pub use arbiter::{ResourceArbitrator, Verdict};
pub use builder::DispatcherBuilder;
pub use cancel::CancelToken;
pub use config::{
    AlertConfig, ArbitrationConfig, Chokepoint, DispatchConfig, RecoveryConfig, StopDurations, StopMasks,
    ThrottleConfig,
};
pub use dispatcher::{Dispatcher, RunPhase};
pub use error::{DispatchError, DispatchResult};
pub use monitor::{LogMonitor, MonitorBoard, TelemetryObserver, spawn_monitor};
pub use observer::{DispatchObserver, NoopObserver};
pub use recovery::RecoveryMonitor;
pub use report::{FleetSummary, IntervalReport, RunSummary, TerminationReason, VehicleSeriesPoint};
pub use stats::{FleetCounts, IntervalStats, PoolOccupancy, VehicleSample};
pub use telemetry::{NOT_AVAILABLE, TelemetryMessage, TelemetryPublisher, VehicleSnapshot, telemetry_channel};
pub use throttle::ContentionThrottle;
