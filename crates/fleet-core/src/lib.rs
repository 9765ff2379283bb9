//! `fleet-core`: foundational types for the `rust_fleet` dispatch engine.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It has no
//! `fleet-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`ids`]    | `VehicleId`, `ResourceId`, `EdgeId`, `LaneId`            |
//! | [`time`]   | `Tick`, `SimClock`                                       |
//! | [`mode`]   | `RunMode`, `ChokepointProfile`, `ArbitrationPolicy`      |
//! | [`error`]  | `FleetError`, `FleetResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod mode;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{FleetError, FleetResult};
pub use ids::{EdgeId, LaneId, ResourceId, VehicleId};
pub use mode::{ArbitrationPolicy, ChokepointProfile, RunMode};
pub use time::{SimClock, Tick};
