#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core motion logic for a stepper-driven 12-hour indicator clock
//! (hardware-agnostic).
//!
//! All hardware interactions go through the `stepclock_traits` seams:
//! `PhaseOutputs` for the coil drive lines, `DigitalInput` for the home
//! sensor and pushbutton, and `Clock` for pulse timing (so tests run on a
//! virtual clock).
//!
//! ## Architecture
//!
//! - **Geometry**: exact integer step quantities derived from the motor and
//!   gear train (`config` module)
//! - **Phase sequencing**: full/half-step coil patterns (`phase` module)
//! - **Pulse generation**: speed-profiled, wrap-aware step execution
//!   (`driver` module)
//! - **Homing**: three-phase, step-count-bounded absolute position recovery
//!   (`controller` module)
//! - **Mapping**: wall time to cyclic step position with shortest-path
//!   deltas (`controller` module)
//!
//! The controller is an explicitly constructed instance; nothing in this
//! crate touches process-wide mutable state, so multiple instances (e.g.,
//! under test) never alias hardware.

pub mod builder;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod mocks;
pub mod phase;
pub mod types;

pub use builder::MotionControllerBuilder;
pub use config::{CalibrateCfg, MINUTES_PER_CYCLE, MotorConfig, StepGeometry};
pub use controller::{MotionController, shortest_cycle_delta};
pub use driver::PhaseDriver;
pub use error::{BuildError, HomingError, HomingOutcome};
pub use phase::PhaseSequence;
pub use types::{StepCommand, StepSpeed, WallTime};
