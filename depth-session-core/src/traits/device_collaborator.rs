use crate::models::error::SessionError;
use crate::models::frame::{FrameBundle, StepOptions};

/// Interface for the device SDK wrapper driven by a session.
///
/// Implemented by:
/// - `SimulatedDevice` (depth-session-sim)
/// - Hardware wrappers around a vendor SDK
///
/// All calls block until the device answers. The session guarantees strict
/// ordering: `initialize` before anything else, no overlapping `step` calls,
/// and `stop` after the last `step`.
pub trait DeviceCollaborator: Send {
    /// Open and start every selected device.
    fn initialize(&mut self) -> Result<(), SessionError>;

    /// Set the IR emitter power. Out-of-range levels yield `DeviceConfig`.
    fn set_ir_laser_power(&mut self, level: i32) -> Result<(), SessionError>;

    /// Persist intrinsics/extrinsics as an opaque blob.
    fn save_calibration(&mut self) -> Result<(), SessionError>;

    /// Capture and discard `frames` framesets. Best effort.
    fn dummy_capture(&mut self, frames: u32);

    /// Pull one synchronized frame bundle.
    ///
    /// An empty bundle is not an error. Disconnects and timeouts surface
    /// as `CaptureFault`.
    fn step(&mut self, options: StepOptions) -> Result<FrameBundle, SessionError>;

    /// Stop streaming and release the devices. Must be safe to call repeatedly.
    fn stop(&mut self);

    /// Hardware-reset a single device while the others keep streaming.
    fn reset(&mut self, device_id: &str) -> Result<(), SessionError> {
        log::debug!("reset not supported, ignoring request for {}", device_id);
        Ok(())
    }
}

impl<D: DeviceCollaborator + ?Sized> DeviceCollaborator for Box<D> {
    fn initialize(&mut self) -> Result<(), SessionError> {
        (**self).initialize()
    }

    fn set_ir_laser_power(&mut self, level: i32) -> Result<(), SessionError> {
        (**self).set_ir_laser_power(level)
    }

    fn save_calibration(&mut self) -> Result<(), SessionError> {
        (**self).save_calibration()
    }

    fn dummy_capture(&mut self, frames: u32) {
        (**self).dummy_capture(frames)
    }

    fn step(&mut self, options: StepOptions) -> Result<FrameBundle, SessionError> {
        (**self).step(options)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn reset(&mut self, device_id: &str) -> Result<(), SessionError> {
        (**self).reset(device_id)
    }
}
