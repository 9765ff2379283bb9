//! `ReportObserver<W>`: bridges `DispatchObserver` to a `ReportWriter`.

use fleet_dispatch::{DispatchObserver, IntervalReport, RunSummary};
use tracing::warn;

use crate::row::{FinalReportRow, FleetSummaryRow, VehicleSeriesRow};
use crate::writer::ReportWriter;
use crate::{OutputError, OutputResult};

/// A [`DispatchObserver`] that persists interval reports and the final
/// summary through any [`ReportWriter`] backend.
///
/// Errors from the writer are stored because observer methods have no
/// return value.  After `dispatcher.run()` returns, check with
/// [`take_error`][Self::take_error].
pub struct ReportObserver<W: ReportWriter> {
    writer:     W,
    intervals:  u64,
    last_error: Option<OutputError>,
}

impl<W: ReportWriter> ReportObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            intervals:  0,
            last_error: None,
        }
    }

    /// Take the first stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Intervals handed to the writer so far.
    pub fn intervals(&self) -> u64 {
        self.intervals
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "report write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: ReportWriter> DispatchObserver for ReportObserver<W> {
    fn on_interval(&mut self, report: &IntervalReport) {
        self.intervals += 1;
        let rows: Vec<VehicleSeriesRow> = report
            .vehicles
            .iter()
            .map(|point| VehicleSeriesRow::new(&report.summary, point))
            .collect();
        if !rows.is_empty() {
            let result = self.writer.write_series(&rows);
            self.store_err(result);
        }
        let result = self.writer.write_summary(&FleetSummaryRow::from(&report.summary));
        self.store_err(result);
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        let result = self.writer.write_final(&FinalReportRow::from(summary));
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
