//! Unit and integration tests for fleet-output.

use fleet_core::{Tick, VehicleId};
use fleet_dispatch::{FleetSummary, RunSummary, TerminationReason, VehicleSeriesPoint};

use crate::row::{FinalReportRow, FleetSummaryRow, VehicleSeriesRow};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn summary(tick: u64) -> FleetSummary {
    FleetSummary {
        tick:          Tick(tick),
        interval:      tick / 60,
        time_units:    tick as f64 / 60.0,
        seen:          3,
        distance_km:   1.25,
        avg_speed_kmh: 21.5,
        parked:        2,
        parking_pct:   50.0,
        co2_g:         812.0,
        nox_g:         3.1,
        waiting_ticks: 17,
        exited:        1,
        active:        2,
    }
}

fn point(vehicle: &str) -> VehicleSeriesPoint {
    VehicleSeriesPoint {
        vehicle:          VehicleId::new(vehicle),
        distance_km:      0.6,
        avg_speed_kmh:    30.0,
        avg_speed_factor: 1.0,
        co2_g:            400.0,
        nox_g:            1.5,
    }
}

fn run_summary() -> RunSummary {
    RunSummary {
        final_tick:        Tick(480),
        reason:            TerminationReason::TickBudget,
        fleet_size:        3,
        seen:              3,
        completed:         1,
        incomplete:        vec![VehicleId::new("trk2"), VehicleId::new("trk3")],
        malformed:         vec![VehicleId::new("trk3")],
        reassignments:     4,
        relocations:       1,
        telemetry_dropped: 0,
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use super::*;

    #[test]
    fn series_row_carries_interval_key() {
        let row = VehicleSeriesRow::new(&summary(120), &point("trk1"));
        assert_eq!(row.tick, 120);
        assert_eq!(row.interval, 2);
        assert_eq!(row.vehicle, "trk1");
        assert_eq!(row.co2_g, 400.0);
    }

    #[test]
    fn final_row_joins_vehicle_lists() {
        let row = FinalReportRow::from(&run_summary());
        assert_eq!(row.reason, "tick budget reached");
        assert_eq!(row.incomplete, "trk2;trk3");
        assert_eq!(row.malformed, "trk3");

        let mut clean = run_summary();
        clean.incomplete.clear();
        clean.malformed.clear();
        let row = FinalReportRow::from(&clean);
        assert_eq!(row.incomplete, "");
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::{CsvWriter, FINAL_HEADER, SERIES_HEADER, SUMMARY_HEADER};
    use crate::writer::ReportWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    fn records(path: &std::path::Path) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(headers(&dir.path().join("vehicle_series.csv")), SERIES_HEADER);
        assert_eq!(headers(&dir.path().join("fleet_summary.csv")), SUMMARY_HEADER);
        assert_eq!(headers(&dir.path().join("final_report.csv")), FINAL_HEADER);
    }

    #[test]
    fn rows_are_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let s = summary(60);
        w.write_series(&[VehicleSeriesRow::new(&s, &point("trk1")), VehicleSeriesRow::new(&s, &point("trk2"))])
            .unwrap();
        w.write_summary(&FleetSummaryRow::from(&s)).unwrap();
        w.write_final(&FinalReportRow::from(&run_summary())).unwrap();
        w.finish().unwrap();

        let series = records(&dir.path().join("vehicle_series.csv"));
        assert_eq!(series.len(), 2);
        assert_eq!(&series[0][0], "60");
        assert_eq!(&series[1][2], "trk2");
        assert_eq!(&series[0][3], "0.600");

        let fleet = records(&dir.path().join("fleet_summary.csv"));
        assert_eq!(fleet.len(), 1);
        assert_eq!(&fleet[0][1], "1.00"); // time = tick / interval
        assert_eq!(&fleet[0][7], "50.0"); // parking %

        let last = records(&dir.path().join("final_report.csv"));
        assert_eq!(last.len(), 1);
        assert_eq!(&last[0][1], "tick budget reached");
        assert_eq!(&last[0][5], "trk2;trk3");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("nope")).is_err());
    }
}

// ── Observer bridge ───────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use fleet_adapter::{ResourceKind, ScriptedSimulator, VehicleSpec};
    use fleet_dispatch::{DispatchConfig, DispatchObserver, DispatcherBuilder, IntervalReport};
    use fleet_mission::{Action, ActionKind, Mission, MissionStore, ResourcePool};

    use super::*;
    use crate::{CsvWriter, OutputError, OutputResult, ReportObserver, ReportWriter};

    /// Counts calls; optionally fails every summary write.
    #[derive(Default)]
    struct Counting {
        series:       usize,
        summaries:    usize,
        finals:       usize,
        finishes:     usize,
        fail_summary: bool,
    }

    impl ReportWriter for Counting {
        fn write_series(&mut self, rows: &[VehicleSeriesRow]) -> OutputResult<()> {
            self.series += rows.len();
            Ok(())
        }

        fn write_summary(&mut self, _row: &FleetSummaryRow) -> OutputResult<()> {
            if self.fail_summary {
                return Err(OutputError::Io(std::io::Error::other("disk full")));
            }
            self.summaries += 1;
            Ok(())
        }

        fn write_final(&mut self, _row: &FinalReportRow) -> OutputResult<()> {
            self.finals += 1;
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    fn report(tick: u64, vehicles: &[&str]) -> IntervalReport {
        IntervalReport {
            summary:  summary(tick),
            vehicles: vehicles.iter().map(|v| point(v)).collect(),
        }
    }

    #[test]
    fn intervals_and_run_end_reach_writer() {
        let mut obs = ReportObserver::new(Counting::default());
        obs.on_interval(&report(60, &["trk1", "trk2"]));
        obs.on_interval(&report(120, &["trk1", "trk2"]));
        obs.on_run_end(&run_summary());
        assert!(obs.take_error().is_none());
        assert_eq!(obs.intervals(), 2);

        let w = obs.into_writer();
        assert_eq!(w.series, 4);
        assert_eq!(w.summaries, 2);
        assert_eq!(w.finals, 1);
        assert_eq!(w.finishes, 1);
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = ReportObserver::new(Counting {
            fail_summary: true,
            ..Counting::default()
        });
        obs.on_interval(&report(60, &["trk1"]));
        obs.on_interval(&report(120, &["trk1"]));
        obs.on_run_end(&run_summary());

        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
        // A failing summary does not stop the rest of the run's output.
        assert_eq!(obs.into_writer().finals, 1);
    }

    #[test]
    fn dispatcher_run_to_csv() {
        let sim = ScriptedSimulator::new(1.0)
            .with_edge("in", 100.0, 10.0)
            .with_edge("yard1", 100.0, 10.0)
            .with_edge("exit", 100.0, 10.0)
            .with_resource("S1", "yard1", ResourceKind::LoadingBay, None)
            .with_vehicle(VehicleSpec::new("trk1", ["in", "yard1", "exit"]));
        let mission = Mission::new(
            "trk1",
            vec![
                Action::new(ActionKind::Load, "S1", "yard1"),
                Action::new(ActionKind::Go, "exit", "exit"),
            ],
        );
        let mut config = DispatchConfig {
            report_interval: 10,
            chokepoints: Vec::new(),
            ..DispatchConfig::default()
        };
        config.stops.load_unload_secs = 5.0;

        let mut dispatcher = DispatcherBuilder::new(sim, config)
            .missions(MissionStore::from_missions(vec![mission]).unwrap())
            .resources(ResourcePool::default())
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = ReportObserver::new(CsvWriter::new(dir.path()).unwrap());
        let summary = dispatcher.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(summary.reason, TerminationReason::FleetCompleted);

        // Gone at tick 36: intervals close at 10, 20 and 30, plus the
        // partial one ending at 36.
        let mut rdr = csv::Reader::from_path(dir.path().join("fleet_summary.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[2][0], "30");
        assert_eq!(&rows[3][0], "36");

        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_series.csv")).unwrap();
        assert_eq!(rdr.records().count(), 4);

        let mut rdr = csv::Reader::from_path(dir.path().join("final_report.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "36");
        assert_eq!(&rows[0][1], "fleet completed");
        assert_eq!(&rows[0][4], "1");
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::sqlite::SqliteWriter;
    use crate::writer::ReportWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("reports.db").exists());
    }

    #[test]
    fn series_and_summary_rows_stored() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let s = summary(60);
        w.write_series(&[VehicleSeriesRow::new(&s, &point("trk1")), VehicleSeriesRow::new(&s, &point("trk2"))])
            .unwrap();
        w.write_summary(&FleetSummaryRow::from(&s)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("reports.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vehicle_series WHERE tick = 60", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
        let (parked, pct): (i64, f64) = conn
            .query_row("SELECT parked, parking_pct FROM fleet_summary WHERE tick = 60", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(parked, 2);
        assert_eq!(pct, 50.0);
    }

    #[test]
    fn final_report_stored() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_final(&FinalReportRow::from(&run_summary())).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("reports.db")).unwrap();
        let (reason, incomplete): (String, String) = conn
            .query_row("SELECT reason, incomplete FROM final_report", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(reason, "tick budget reached");
        assert_eq!(incomplete, "trk2;trk3");
    }
}
