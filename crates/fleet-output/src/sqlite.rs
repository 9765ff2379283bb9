//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `reports.db` in the output directory with three tables:
//! `vehicle_series`, `fleet_summary` and `final_report`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::ReportWriter;
use crate::{FinalReportRow, FleetSummaryRow, OutputResult, VehicleSeriesRow};

/// Writes reports to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `reports.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("reports.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS vehicle_series (
                 tick             INTEGER NOT NULL,
                 interval         INTEGER NOT NULL,
                 vehicle          TEXT    NOT NULL,
                 distance_km      REAL    NOT NULL,
                 avg_speed_kmh    REAL    NOT NULL,
                 avg_speed_factor REAL    NOT NULL,
                 co2_g            REAL    NOT NULL,
                 nox_g            REAL    NOT NULL,
                 PRIMARY KEY (tick, vehicle)
             );
             CREATE TABLE IF NOT EXISTS fleet_summary (
                 tick          INTEGER PRIMARY KEY,
                 time_units    REAL    NOT NULL,
                 interval      INTEGER NOT NULL,
                 seen          INTEGER NOT NULL,
                 distance_km   REAL    NOT NULL,
                 avg_speed_kmh REAL    NOT NULL,
                 parked        INTEGER NOT NULL,
                 parking_pct   REAL    NOT NULL,
                 co2_g         REAL    NOT NULL,
                 nox_g         REAL    NOT NULL,
                 waiting_ticks INTEGER NOT NULL,
                 exited        INTEGER NOT NULL,
                 active        INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS final_report (
                 final_tick        INTEGER NOT NULL,
                 reason            TEXT    NOT NULL,
                 fleet_size        INTEGER NOT NULL,
                 seen              INTEGER NOT NULL,
                 completed         INTEGER NOT NULL,
                 incomplete        TEXT    NOT NULL,
                 malformed         TEXT    NOT NULL,
                 reassignments     INTEGER NOT NULL,
                 relocations       INTEGER NOT NULL,
                 telemetry_dropped INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl ReportWriter for SqliteWriter {
    fn write_series(&mut self, rows: &[VehicleSeriesRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO vehicle_series \
                 (tick, interval, vehicle, distance_km, avg_speed_kmh, avg_speed_factor, co2_g, nox_g) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.interval as i64,
                    row.vehicle,
                    row.distance_km,
                    row.avg_speed_kmh,
                    row.avg_speed_factor,
                    row.co2_g,
                    row.nox_g,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_summary(&mut self, row: &FleetSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO fleet_summary \
             (tick, time_units, interval, seen, distance_km, avg_speed_kmh, parked, parking_pct, \
              co2_g, nox_g, waiting_ticks, exited, active) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                row.tick as i64,
                row.time_units,
                row.interval as i64,
                row.seen as i64,
                row.distance_km,
                row.avg_speed_kmh,
                row.parked,
                row.parking_pct,
                row.co2_g,
                row.nox_g,
                row.waiting_ticks as i64,
                row.exited as i64,
                row.active as i64,
            ],
        )?;
        Ok(())
    }

    fn write_final(&mut self, row: &FinalReportRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO final_report \
             (final_tick, reason, fleet_size, seen, completed, incomplete, malformed, \
              reassignments, relocations, telemetry_dropped) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                row.final_tick as i64,
                row.reason,
                row.fleet_size as i64,
                row.seen as i64,
                row.completed as i64,
                row.incomplete,
                row.malformed,
                row.reassignments as i64,
                row.relocations as i64,
                row.telemetry_dropped as i64,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
