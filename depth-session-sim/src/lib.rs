//! # depth-session-sim
//!
//! Simulated depth camera backend for depth-session.
//!
//! Provides:
//! - `SimulatedDevice` — a `DeviceCollaborator` producing color + depth
//!   bundles for a set of fake serial numbers
//! - `calibration` — the calibration blob written by `save_calibration`
//!
//! ## Usage
//! ```ignore
//! use depth_session_core::{DeviceSession, SessionConfig};
//! use depth_session_sim::SimulatedDevice;
//!
//! let mut device = SimulatedDevice::new(vec!["818312070212".into()]);
//! let mut session = DeviceSession::new(&mut device, SessionConfig::default());
//! session.initialize()?;
//! ```

pub mod calibration;
pub mod simulated_device;

pub use calibration::{CalibrationBlob, Extrinsics, Intrinsics};
pub use simulated_device::SimulatedDevice;
