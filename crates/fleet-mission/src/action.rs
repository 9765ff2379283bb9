//! A single mission step and its status.

use std::fmt;
use std::str::FromStr;

use fleet_core::{EdgeId, ResourceId};
use serde::{Deserialize, Serialize};

use crate::MissionError;

// ── ActionKind ────────────────────────────────────────────────────────────────

/// What the vehicle does at the action's target.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    Load,
    Unload,
    Park,
    /// Drive to an edge without stopping (usually an exit).
    Go,
}

impl ActionKind {
    /// `true` for kinds that place a timed stop at a resource.
    #[inline]
    pub fn expects_stop(self) -> bool {
        !matches!(self, ActionKind::Go)
    }

    /// `true` for `Load` and `Unload`.
    #[inline]
    pub fn is_cargo(self) -> bool {
        matches!(self, ActionKind::Load | ActionKind::Unload)
    }

    /// One-letter template code (`L`, `U`, `P`, `G`).
    pub fn code(self) -> char {
        match self {
            ActionKind::Load   => 'L',
            ActionKind::Unload => 'U',
            ActionKind::Park   => 'P',
            ActionKind::Go     => 'G',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(ActionKind::Load),
            'U' => Some(ActionKind::Unload),
            'P' => Some(ActionKind::Park),
            'G' => Some(ActionKind::Go),
            _ => None,
        }
    }
}

impl FromStr for ActionKind {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "load" => Ok(ActionKind::Load),
            "unload" => Ok(ActionKind::Unload),
            "park" => Ok(ActionKind::Park),
            "go" => Ok(ActionKind::Go),
            _ => {
                let mut chars = s.chars();
                match (chars.next().and_then(ActionKind::from_code), chars.next()) {
                    (Some(kind), None) => Ok(kind),
                    _ => Err(MissionError::Parse(format!(
                        "invalid action kind {s:?}: expected Load, Unload, Park, or Go"
                    ))),
                }
            }
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Load   => "Load",
            ActionKind::Unload => "Unload",
            ActionKind::Park   => "Park",
            ActionKind::Go     => "Go",
        })
    }
}

// ── ActionStatus ──────────────────────────────────────────────────────────────

/// Progress of one action.  Declared in lifecycle order, so `Ord` follows it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    #[default]
    Pending,
    Assigned,
    Arrived,
    Done,
}

impl ActionStatus {
    /// Legacy numeric code used by older mission files (`0`..`3`).
    pub fn code(self) -> u8 {
        match self {
            ActionStatus::Pending  => 0,
            ActionStatus::Assigned => 1,
            ActionStatus::Arrived  => 2,
            ActionStatus::Done     => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ActionStatus::Pending),
            1 => Some(ActionStatus::Assigned),
            2 => Some(ActionStatus::Arrived),
            3 => Some(ActionStatus::Done),
            _ => None,
        }
    }

    /// `Assigned` or `Arrived`: the action the vehicle is working on.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, ActionStatus::Assigned | ActionStatus::Arrived)
    }
}

impl FromStr for ActionStatus {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ActionStatus::Pending);
        }
        if let Ok(code) = s.parse::<u8>() {
            return ActionStatus::from_code(code)
                .ok_or_else(|| MissionError::Parse(format!("invalid status code {code}")));
        }
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ActionStatus::Pending),
            "assigned" => Ok(ActionStatus::Assigned),
            "arrived" => Ok(ActionStatus::Arrived),
            "done" => Ok(ActionStatus::Done),
            _ => Err(MissionError::Parse(format!("invalid action status {s:?}"))),
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionStatus::Pending  => "Pending",
            ActionStatus::Assigned => "Assigned",
            ActionStatus::Arrived  => "Arrived",
            ActionStatus::Done     => "Done",
        })
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// Why an action cannot be assigned.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ActionDefect {
    MissingTarget,
    MissingEdge,
}

impl fmt::Display for ActionDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionDefect::MissingTarget => "action has no target resource",
            ActionDefect::MissingEdge   => "action has no edge",
        })
    }
}

/// One step of a mission.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Action {
    pub kind:   ActionKind,
    /// Resource to stop at.  For `Go` this repeats the edge id.
    pub target: ResourceId,
    /// Edge the vehicle is routed to.
    pub edge:   EdgeId,
    pub status: ActionStatus,
}

impl Action {
    /// A `Pending` action.
    pub fn new(kind: ActionKind, target: impl Into<ResourceId>, edge: impl Into<EdgeId>) -> Self {
        Self {
            kind,
            target: target.into(),
            edge:   edge.into(),
            status: ActionStatus::Pending,
        }
    }

    /// The first reason this action cannot be assigned, if any.
    pub fn defect(&self) -> Option<ActionDefect> {
        if self.target.is_empty() {
            Some(ActionDefect::MissingTarget)
        } else if self.edge.is_empty() {
            Some(ActionDefect::MissingEdge)
        } else {
            None
        }
    }

    /// Point this action at a different resource.
    ///
    /// The kind is kept and the status goes back to `Pending` so the action
    /// is assigned afresh.
    pub fn retarget(&mut self, target: ResourceId, edge: EdgeId) {
        self.target = target;
        self.edge = edge;
        self.status = ActionStatus::Pending;
    }
}
