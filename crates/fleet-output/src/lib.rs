//! `fleet-output`: report writers for the rust_fleet dispatch engine.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                                                  |
//! |-----------|---------|----------------------------------------------------------------|
//! | *(none)*  | CSV     | `vehicle_series.csv`, `fleet_summary.csv`, `final_report.csv`  |
//! | `sqlite`  | SQLite  | `reports.db`                                                   |
//!
//! Both implement [`ReportWriter`] and are driven by [`ReportObserver`],
//! which implements `fleet_dispatch::DispatchObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fleet_output::{CsvWriter, ReportObserver};
//!
//! let writer = CsvWriter::new(Path::new("./reports"))?;
//! let mut obs = ReportObserver::new(writer);
//! dispatcher.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("report error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ReportObserver;
pub use row::{FinalReportRow, FleetSummaryRow, VehicleSeriesRow};
pub use writer::ReportWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
