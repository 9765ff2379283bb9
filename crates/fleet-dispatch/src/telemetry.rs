//! Telemetry Publisher: per-tick vehicle snapshots for an external monitor.
//!
//! Snapshots cross the thread boundary by value over a bounded crossbeam
//! channel.  Publishing never blocks: when the channel is full the oldest
//! queued tick is discarded to make room.  After the loop ends,
//! [`TelemetryPublisher::finish`] queues [`TelemetryMessage::EndOfStream`]
//! exactly once.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use fleet_core::{Tick, VehicleId};
use fleet_mission::Mission;
use serde::Serialize;

/// Shown in place of a value that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

/// One vehicle's line on the monitor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id:             VehicleId,
    pub action_type:    String,
    pub action_target:  String,
    pub mission_status: String,
    pub location:       String,
    pub speed_kmh:      f64,
    pub waiting_secs:   f64,
}

impl VehicleSnapshot {
    /// A snapshot with mission fields filled from `mission` and sentinel
    /// values for everything read from the Simulator.
    pub fn for_mission(mission: &Mission) -> Self {
        let (action_type, action_target, mission_status) = match mission.current() {
            Some(action) => (
                action.kind.to_string(),
                action.target.to_string(),
                action.status.to_string(),
            ),
            None => match mission.last() {
                Some(action) => (
                    action.kind.to_string(),
                    action.target.to_string(),
                    "Completed".to_owned(),
                ),
                None => (
                    NOT_AVAILABLE.to_owned(),
                    NOT_AVAILABLE.to_owned(),
                    "No Missions".to_owned(),
                ),
            },
        };
        Self {
            id: mission.vehicle.clone(),
            action_type,
            action_target,
            mission_status,
            location:     NOT_AVAILABLE.to_owned(),
            speed_kmh:    0.0,
            waiting_secs: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryMessage {
    Tick {
        tick:     Tick,
        vehicles: Vec<VehicleSnapshot>,
    },
    EndOfStream,
}

/// Create a publisher and the receiver the monitor drains.
pub fn telemetry_channel(capacity: usize) -> (TelemetryPublisher, Receiver<TelemetryMessage>) {
    let (tx, rx) = channel::bounded(capacity.max(1));
    let publisher = TelemetryPublisher {
        tx,
        evict:    rx.clone(),
        dropped:  0,
        finished: false,
    };
    (publisher, rx)
}

/// Non-blocking, drop-oldest sending half of the telemetry channel.
pub struct TelemetryPublisher {
    tx:       Sender<TelemetryMessage>,
    /// Our own handle on the queue, used to evict the oldest message.
    evict:    Receiver<TelemetryMessage>,
    dropped:  u64,
    finished: bool,
}

impl TelemetryPublisher {
    /// Queue one tick's snapshots.  Returns `false` once finished.
    pub fn publish(&mut self, tick: Tick, vehicles: Vec<VehicleSnapshot>) -> bool {
        if self.finished {
            return false;
        }
        self.push(TelemetryMessage::Tick { tick, vehicles })
    }

    /// Queue the end-of-stream marker.  Idempotent; later publishes are
    /// ignored.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.push(TelemetryMessage::EndOfStream);
    }

    fn push(&mut self, mut message: TelemetryMessage) -> bool {
        loop {
            match self.tx.try_send(message) {
                Ok(()) => return true,
                Err(TrySendError::Full(back)) => {
                    message = back;
                    if self.evict.try_recv().is_ok() {
                        self.dropped += 1;
                    }
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
    }

    /// Ticks evicted because the monitor fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
