//! `fleet-mission`: the Mission Store and everything that fills it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`action`]     | `ActionKind`, `ActionStatus`, `Action`, `ActionDefect`     |
//! | [`mission`]    | `Mission`: one vehicle's ordered action list               |
//! | [`store`]      | `MissionStore`: all missions, JSON final-state snapshot    |
//! | [`pool`]       | `ResourceEntry`, `ResourcePool`: substitution candidates   |
//! | [`loader`]     | `load_missions_csv`, `load_resources_csv` (+ reader forms) |
//! | [`generator`]  | `MissionGenerator`: seeded random fleets from templates    |
//! | [`error`]      | `MissionError`, `MissionResult<T>`                         |
//!
//! # Action lifecycle (summary)
//!
//! ```text
//! Pending ──assign──▶ Assigned ──stop reached──▶ Arrived ──moving again──▶ Done
//!                         └──────── Go: no edges left ────────────────────▶ Done
//! ```
//!
//! A mission's `Done` actions always form a prefix of its list, and at most
//! one action (the *current* one) is `Assigned` or `Arrived`.

pub mod action;
pub mod error;
pub mod generator;
pub mod loader;
pub mod mission;
pub mod pool;
pub mod store;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionDefect, ActionKind, ActionStatus};
pub use error::{MissionError, MissionResult};
pub use generator::MissionGenerator;
pub use loader::{load_missions_csv, load_missions_reader, load_resources_csv, load_resources_reader};
pub use mission::Mission;
pub use pool::{ResourceEntry, ResourcePool};
pub use store::MissionStore;
