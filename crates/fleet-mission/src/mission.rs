//! One vehicle's ordered action list.

use fleet_core::VehicleId;
use serde::{Deserialize, Serialize};

use crate::{Action, ActionStatus};

/// An ordered sequence of actions owned by exactly one vehicle.
///
/// Actions are never reordered, inserted, or removed after construction.
/// Only the *current* action (the first one not yet `Done`) is handed out
/// mutably, which keeps the `Done` set a prefix of the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub vehicle: VehicleId,
    actions:     Vec<Action>,
}

impl Mission {
    pub fn new(vehicle: impl Into<VehicleId>, actions: Vec<Action>) -> Self {
        Self {
            vehicle: vehicle.into(),
            actions,
        }
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Index of the first action that is not `Done`.
    pub fn current_index(&self) -> Option<usize> {
        self.actions.iter().position(|a| a.status != ActionStatus::Done)
    }

    /// The action the vehicle is working on (or will be assigned next).
    pub fn current(&self) -> Option<&Action> {
        self.current_index().map(|i| &self.actions[i])
    }

    /// Mutable access to the current action.  Earlier actions are `Done` and
    /// later ones are `Pending`; neither is reachable from here.
    pub fn current_mut(&mut self) -> Option<&mut Action> {
        let i = self.current_index()?;
        Some(&mut self.actions[i])
    }

    /// The last action, used for reporting once everything is `Done`.
    pub fn last(&self) -> Option<&Action> {
        self.actions.last()
    }

    /// `true` once every action is `Done`.  An empty mission is never
    /// complete: the vehicle had nothing to accomplish.
    pub fn is_complete(&self) -> bool {
        !self.actions.is_empty() && self.current_index().is_none()
    }

    /// Number of `Done` actions.
    pub fn done_count(&self) -> usize {
        self.current_index().unwrap_or(self.actions.len())
    }

    /// Check the ordering invariant: a `Done` prefix, then at most one
    /// `Assigned`/`Arrived` action, then only `Pending` actions.
    pub fn is_well_ordered(&self) -> bool {
        let mut rest = self.actions.iter().skip_while(|a| a.status == ActionStatus::Done);
        // The first non-Done action may be in any state; everything after it
        // must still be waiting.
        rest.next();
        rest.all(|a| a.status == ActionStatus::Pending)
    }
}
