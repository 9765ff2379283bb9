//! `fleet-adapter`: the contract between the dispatch engine and the
//! Simulator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`adapter`]   | `SimulatorAdapter` trait                                  |
//! | [`stop`]      | `StopState` bit flags                                     |
//! | [`scripted`]  | `ScriptedSimulator`: deterministic in-memory Simulator    |
//! | [`error`]     | `AdapterError`, `AdapterResult<T>`                        |
//!
//! The dispatch loop is generic over [`SimulatorAdapter`], so a TraCI client,
//! a replay of recorded traces, or the bundled [`ScriptedSimulator`] can be
//! plugged in without touching dispatch logic.

pub mod adapter;
pub mod error;
pub mod scripted;
pub mod stop;

#[cfg(test)]
mod tests;

pub use adapter::SimulatorAdapter;
pub use error::{AdapterError, AdapterResult};
pub use scripted::{ResourceKind, ScriptedSimulator, SimCommand, VehicleSpec};
pub use stop::StopState;
