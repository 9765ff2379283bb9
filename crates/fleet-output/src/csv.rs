//! CSV output backend.
//!
//! Creates three files in the output directory:
//! - `vehicle_series.csv`: one row per fleet vehicle per interval
//! - `fleet_summary.csv`: one row per interval
//! - `final_report.csv`: one row at the end of the run

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::ReportWriter;
use crate::{FinalReportRow, FleetSummaryRow, OutputResult, VehicleSeriesRow};

pub const SERIES_HEADER: [&str; 8] = [
    "tick", "interval", "vehicle", "distance_km", "avg_speed_kmh", "avg_speed_factor", "co2_g", "nox_g",
];

pub const SUMMARY_HEADER: [&str; 13] = [
    "tick", "time", "interval", "seen", "distance_km", "avg_speed_kmh", "parked", "parking_pct", "co2_g",
    "nox_g", "waiting_ticks", "exited", "active",
];

pub const FINAL_HEADER: [&str; 10] = [
    "final_tick", "reason", "fleet_size", "seen", "completed", "incomplete", "malformed", "reassignments",
    "relocations", "telemetry_dropped",
];

/// Writes reports to three CSV files.
pub struct CsvWriter {
    series:   Writer<File>,
    summary:  Writer<File>,
    last:     Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the three CSV files in `dir` and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut series = Writer::from_path(dir.join("vehicle_series.csv"))?;
        series.write_record(SERIES_HEADER)?;

        let mut summary = Writer::from_path(dir.join("fleet_summary.csv"))?;
        summary.write_record(SUMMARY_HEADER)?;

        let mut last = Writer::from_path(dir.join("final_report.csv"))?;
        last.write_record(FINAL_HEADER)?;

        Ok(Self {
            series,
            summary,
            last,
            finished: false,
        })
    }
}

impl ReportWriter for CsvWriter {
    fn write_series(&mut self, rows: &[VehicleSeriesRow]) -> OutputResult<()> {
        for row in rows {
            self.series.write_record(&[
                row.tick.to_string(),
                row.interval.to_string(),
                row.vehicle.clone(),
                format!("{:.3}", row.distance_km),
                format!("{:.2}", row.avg_speed_kmh),
                format!("{:.3}", row.avg_speed_factor),
                format!("{:.3}", row.co2_g),
                format!("{:.3}", row.nox_g),
            ])?;
        }
        Ok(())
    }

    fn write_summary(&mut self, row: &FleetSummaryRow) -> OutputResult<()> {
        self.summary.write_record(&[
            row.tick.to_string(),
            format!("{:.2}", row.time_units),
            row.interval.to_string(),
            row.seen.to_string(),
            format!("{:.3}", row.distance_km),
            format!("{:.2}", row.avg_speed_kmh),
            row.parked.to_string(),
            format!("{:.1}", row.parking_pct),
            format!("{:.3}", row.co2_g),
            format!("{:.3}", row.nox_g),
            row.waiting_ticks.to_string(),
            row.exited.to_string(),
            row.active.to_string(),
        ])?;
        Ok(())
    }

    fn write_final(&mut self, row: &FinalReportRow) -> OutputResult<()> {
        self.last.write_record(&[
            row.final_tick.to_string(),
            row.reason.clone(),
            row.fleet_size.to_string(),
            row.seen.to_string(),
            row.completed.to_string(),
            row.incomplete.clone(),
            row.malformed.clone(),
            row.reassignments.to_string(),
            row.relocations.to_string(),
            row.telemetry_dropped.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.series.flush()?;
        self.summary.flush()?;
        self.last.flush()?;
        Ok(())
    }
}
