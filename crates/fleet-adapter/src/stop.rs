//! Vehicle stop-state bit flags.
//!
//! Bit values follow SUMO's `getStopState`.  Which bits mean "in contact with
//! a loading bay" or "parked" differs between Simulator versions, so the
//! dispatch configuration holds masks built from these flags instead of
//! comparing against fixed numbers.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of stop-state flags.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StopState(pub u32);

impl StopState {
    pub const NONE:                StopState = StopState(0);
    pub const STOPPED:             StopState = StopState(1);
    pub const PARKING:             StopState = StopState(1 << 1);
    pub const TRIGGERED:           StopState = StopState(1 << 2);
    pub const CONTAINER_TRIGGERED: StopState = StopState(1 << 3);
    pub const BUS_STOP:            StopState = StopState(1 << 4);
    pub const CONTAINER_STOP:      StopState = StopState(1 << 5);
    pub const CHARGING_STATION:    StopState = StopState(1 << 6);
    pub const PARKING_AREA:        StopState = StopState(1 << 7);

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// `true` if the vehicle is halted at any stop.
    #[inline]
    pub fn is_stopped(self) -> bool {
        self.intersects(Self::STOPPED)
    }

    /// `true` if any flag in `mask` is set.
    #[inline]
    pub fn intersects(self, mask: StopState) -> bool {
        self.0 & mask.0 != 0
    }

    /// `true` if every flag in `mask` is set.
    #[inline]
    pub fn contains(self, mask: StopState) -> bool {
        self.0 & mask.0 == mask.0
    }
}

impl BitOr for StopState {
    type Output = StopState;
    #[inline]
    fn bitor(self, rhs: StopState) -> StopState {
        StopState(self.0 | rhs.0)
    }
}

impl BitOrAssign for StopState {
    #[inline]
    fn bitor_assign(&mut self, rhs: StopState) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopState({:#010b})", self.0)
    }
}
