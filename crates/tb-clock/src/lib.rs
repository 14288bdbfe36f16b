//! Tick calibration (monotonic counter <-> wall clock) and the virtual
//! clock (wall clock <-> pipeline time) built on top of it.

mod calibration;
mod virtual_clock;

pub use calibration::{CalibrationPoint, TickCalibration, TimeSource};
pub use virtual_clock::VirtualClock;
