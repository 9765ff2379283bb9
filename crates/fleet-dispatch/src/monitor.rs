//! Telemetry consumers.
//!
//! [`spawn_monitor`] runs a [`TelemetryObserver`] on its own thread.  The
//! thread only ever sees owned snapshots, never the Mission Store.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use fleet_core::{Tick, VehicleId};
use tracing::debug;

use crate::telemetry::{TelemetryMessage, VehicleSnapshot};

/// Receives telemetry on the monitor thread.
pub trait TelemetryObserver {
    fn on_snapshot(&mut self, tick: Tick, vehicles: &[VehicleSnapshot]);

    /// The Dispatch Loop has terminated; no more snapshots follow.
    fn on_end_of_stream(&mut self) {}
}

/// Drain `rx` into `observer` on a thread named `fleet-monitor` until the
/// end-of-stream marker arrives or every sender is gone.  The observer is
/// handed back through the join handle.
pub fn spawn_monitor<O>(rx: Receiver<TelemetryMessage>, mut observer: O) -> io::Result<JoinHandle<O>>
where
    O: TelemetryObserver + Send + 'static,
{
    thread::Builder::new()
        .name("fleet-monitor".into())
        .spawn(move || {
            for message in rx.iter() {
                match message {
                    TelemetryMessage::Tick { tick, vehicles } => observer.on_snapshot(tick, &vehicles),
                    TelemetryMessage::EndOfStream => {
                        observer.on_end_of_stream();
                        break;
                    }
                }
            }
            observer
        })
}

// ── MonitorBoard ──────────────────────────────────────────────────────────────

/// Last-known snapshot of every vehicle, sorted by id.
#[derive(Debug, Default)]
pub struct MonitorBoard {
    rows:      BTreeMap<VehicleId, VehicleSnapshot>,
    last_tick: Option<Tick>,
    updates:   u64,
    ended:     bool,
}

impl MonitorBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, vehicle: &str) -> Option<&VehicleSnapshot> {
        self.rows.get(vehicle)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.last_tick
    }

    /// Number of tick messages received.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Plain-text table of the board.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<10} {:<7} {:<12} {:<11} {:<12} {:>8} {:>9}",
            "vehicle", "action", "target", "status", "road", "km/h", "wait[s]"
        );
        for s in self.rows.values() {
            let _ = writeln!(
                out,
                "{:<10} {:<7} {:<12} {:<11} {:<12} {:>8.1} {:>9.0}",
                s.id, s.action_type, s.action_target, s.mission_status, s.location, s.speed_kmh, s.waiting_secs
            );
        }
        out
    }
}

impl TelemetryObserver for MonitorBoard {
    fn on_snapshot(&mut self, tick: Tick, vehicles: &[VehicleSnapshot]) {
        for snapshot in vehicles {
            self.rows.insert(snapshot.id.clone(), snapshot.clone());
        }
        self.last_tick = Some(tick);
        self.updates += 1;
    }

    fn on_end_of_stream(&mut self) {
        self.ended = true;
    }
}

// ── LogMonitor ────────────────────────────────────────────────────────────────

/// A [`MonitorBoard`] that logs its table every `every` updates.
#[derive(Debug)]
pub struct LogMonitor {
    pub board: MonitorBoard,
    every:     u64,
}

impl LogMonitor {
    pub fn new(every: u64) -> Self {
        Self {
            board: MonitorBoard::new(),
            every: every.max(1),
        }
    }
}

impl TelemetryObserver for LogMonitor {
    fn on_snapshot(&mut self, tick: Tick, vehicles: &[VehicleSnapshot]) {
        self.board.on_snapshot(tick, vehicles);
        if self.board.updates().is_multiple_of(self.every) {
            debug!(tick = %tick, vehicles = self.board.len(), "monitor board\n{}", self.board.render());
        }
    }

    fn on_end_of_stream(&mut self) {
        self.board.on_end_of_stream();
        debug!(
            updates = self.board.updates(),
            vehicles = self.board.len(),
            "telemetry stream closed"
        );
    }
}
