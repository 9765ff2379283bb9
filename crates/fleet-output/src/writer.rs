//! The `ReportWriter` trait implemented by all backend writers.

use crate::{FinalReportRow, FleetSummaryRow, OutputResult, VehicleSeriesRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors reach the dispatcher's caller through
/// [`ReportObserver::take_error`][crate::ReportObserver::take_error].
pub trait ReportWriter {
    /// Write one interval's per-vehicle rows.
    fn write_series(&mut self, rows: &[VehicleSeriesRow]) -> OutputResult<()>;

    /// Write one fleet summary row.
    fn write_summary(&mut self, row: &FleetSummaryRow) -> OutputResult<()>;

    /// Write the end-of-run aggregate.
    fn write_final(&mut self, row: &FinalReportRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
