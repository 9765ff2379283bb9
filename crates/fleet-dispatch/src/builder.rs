//! Fluent builder for constructing a [`Dispatcher`].

use std::path::PathBuf;

use fleet_adapter::SimulatorAdapter;
use fleet_mission::{MissionStore, ResourcePool};

use crate::arbiter::ResourceArbitrator;
use crate::config::DispatchConfig;
use crate::telemetry::TelemetryPublisher;
use crate::{CancelToken, DispatchError, DispatchResult, Dispatcher};

/// Fluent builder for [`Dispatcher<A>`].
///
/// # Required inputs
///
/// - `A: SimulatorAdapter`: the Simulator connection (not yet connected)
/// - [`DispatchConfig`]: run mode, tick budget, thresholds
/// - `.missions(store)`: the Mission Store
/// - `.resources(pool)`: substitution candidates for `Park` actions
///
/// # Optional inputs
///
/// | Method              | Default                          |
/// |---------------------|----------------------------------|
/// | `.telemetry(p)`     | No telemetry is published        |
/// | `.cancel_token(t)`  | A fresh, never-cancelled token   |
/// | `.snapshot_to(path)`| No final-state snapshot          |
///
/// # Example
///
/// ```rust,ignore
/// let (publisher, rx) = telemetry_channel(config.telemetry_capacity);
/// let mut dispatcher = DispatcherBuilder::new(simulator, config)
///     .missions(store)
///     .resources(pool)
///     .telemetry(publisher)
///     .build()?;
/// let summary = dispatcher.run(&mut NoopObserver)?;
/// ```
pub struct DispatcherBuilder<A: SimulatorAdapter> {
    adapter:       A,
    config:        DispatchConfig,
    missions:      Option<MissionStore>,
    resources:     Option<ResourcePool>,
    telemetry:     Option<TelemetryPublisher>,
    cancel:        Option<CancelToken>,
    snapshot_path: Option<PathBuf>,
}

impl<A: SimulatorAdapter> DispatcherBuilder<A> {
    pub fn new(adapter: A, config: DispatchConfig) -> Self {
        Self {
            adapter,
            config,
            missions:      None,
            resources:     None,
            telemetry:     None,
            cancel:        None,
            snapshot_path: None,
        }
    }

    pub fn missions(mut self, store: MissionStore) -> Self {
        self.missions = Some(store);
        self
    }

    /// An empty pool is allowed; `Park` actions are then never reassigned.
    pub fn resources(mut self, pool: ResourcePool) -> Self {
        self.resources = Some(pool);
        self
    }

    pub fn telemetry(mut self, publisher: TelemetryPublisher) -> Self {
        self.telemetry = Some(publisher);
        self
    }

    /// Share a token so another thread can stop the run.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Write the Mission Store as JSON to `path` while draining.
    pub fn snapshot_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Validate inputs and return a ready-to-run [`Dispatcher`].
    pub fn build(self) -> DispatchResult<Dispatcher<A>> {
        self.config.validate()?;
        let store = self
            .missions
            .ok_or_else(|| DispatchError::ConfigurationMissing("mission store".into()))?;
        let pool = self
            .resources
            .ok_or_else(|| DispatchError::ConfigurationMissing("resource pool".into()))?;

        let arbiter = ResourceArbitrator::new(pool, self.config.mode.arbitration, self.config.arbitration);

        Ok(Dispatcher::from_parts(
            self.config,
            self.adapter,
            store,
            arbiter,
            self.telemetry,
            self.cancel.unwrap_or_default(),
            self.snapshot_path,
        ))
    }
}
