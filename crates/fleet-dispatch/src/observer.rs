//! Dispatch observer trait for progress reporting and data collection.

use fleet_core::Tick;

use crate::report::{IntervalReport, RunSummary};

/// Callbacks invoked by [`Dispatcher`][crate::Dispatcher] during a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: interval printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl DispatchObserver for Printer {
///     fn on_interval(&mut self, report: &IntervalReport) {
///         println!("{}: {:.1} km", report.summary.tick, report.summary.distance_km);
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// Called after the Simulator has stepped, before any vehicle is
    /// processed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after every vehicle has been processed.  `active` is the
    /// number of vehicles the Simulator reported this tick.
    fn on_tick_end(&mut self, _tick: Tick, _active: usize) {}

    /// Called when a reporting interval closes.
    fn on_interval(&mut self, _report: &IntervalReport) {}

    /// Called once while draining, after the final tick.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`DispatchObserver`] that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}
