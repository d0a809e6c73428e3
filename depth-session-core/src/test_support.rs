//! Scripted collaborator and recording delegate shared by the unit tests.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::models::error::SessionError;
use crate::models::frame::{Frame, FrameBundle, StepOptions};
use crate::models::state::SessionState;
use crate::traits::device_collaborator::DeviceCollaborator;
use crate::traits::session_delegate::{ProgressEvent, SessionDelegate, StatusLevel};

/// Device double whose behavior is fixed up front and whose calls are counted.
#[derive(Debug, Default)]
pub struct ScriptedDevice {
    /// 1-based step call numbers that return an empty bundle.
    pub empty_on: HashSet<u64>,
    /// Every step returns an empty bundle.
    pub always_empty: bool,
    /// 1-based step call number that raises a capture fault.
    pub fail_on_step: Option<u64>,
    /// 1-based initialize call number that fails.
    pub fail_initialize_on: Option<u32>,
    pub reject_laser: bool,
    pub fail_calibration: bool,
    pub fail_reset: bool,

    pub initialize_calls: u32,
    pub stop_calls: u32,
    pub step_calls: u64,
    pub dummy_frames: u32,
    pub calibration_saves: u32,
    pub laser_level: Option<i32>,
    pub resets: Vec<String>,
    pub events: Vec<&'static str>,
}

impl DeviceCollaborator for ScriptedDevice {
    fn initialize(&mut self) -> Result<(), SessionError> {
        self.initialize_calls += 1;
        self.events.push("initialize");
        if self.fail_initialize_on == Some(self.initialize_calls) {
            return Err(SessionError::DeviceInit("no device connected".into()));
        }
        Ok(())
    }

    fn set_ir_laser_power(&mut self, level: i32) -> Result<(), SessionError> {
        self.events.push("laser");
        if self.reject_laser {
            return Err(SessionError::DeviceConfig(format!("{} out of range", level)));
        }
        self.laser_level = Some(level);
        Ok(())
    }

    fn save_calibration(&mut self) -> Result<(), SessionError> {
        self.events.push("calibration");
        if self.fail_calibration {
            return Err(SessionError::Io("read-only file system".into()));
        }
        self.calibration_saves += 1;
        Ok(())
    }

    fn dummy_capture(&mut self, frames: u32) {
        self.events.push("dummy_capture");
        self.dummy_frames += frames;
    }

    fn step(&mut self, _options: StepOptions) -> Result<FrameBundle, SessionError> {
        self.step_calls += 1;
        self.events.push("step");
        if self.fail_on_step == Some(self.step_calls) {
            return Err(SessionError::CaptureFault("device disconnected".into()));
        }
        let mut bundle = FrameBundle::new();
        if !self.always_empty && !self.empty_on.contains(&self.step_calls) {
            bundle.insert(
                "depth",
                Frame {
                    data: vec![0; 8],
                    timestamp_ms: Some(self.step_calls as f64),
                },
            );
        }
        Ok(bundle)
    }

    fn stop(&mut self) {
        self.stop_calls += 1;
        self.events.push("stop");
    }

    fn reset(&mut self, device_id: &str) -> Result<(), SessionError> {
        if self.fail_reset {
            return Err(SessionError::DeviceConfig(format!("{} did not come back", device_id)));
        }
        self.resets.push(device_id.to_string());
        Ok(())
    }
}

/// Delegate that records every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    pub states: Mutex<Vec<SessionState>>,
    pub progress: Mutex<Vec<ProgressEvent>>,
    pub statuses: Mutex<Vec<(StatusLevel, String)>>,
}

impl RecordingDelegate {
    pub fn step_counts(&self) -> Vec<u64> {
        self.progress
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Step { count } => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self, level: StatusLevel) -> Vec<String> {
        self.statuses
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl SessionDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: SessionState) {
        self.states.lock().push(state);
    }

    fn on_progress(&self, event: ProgressEvent) {
        self.progress.lock().push(event);
    }

    fn on_status(&self, level: StatusLevel, message: &str) {
        self.statuses.lock().push((level, message.to_string()));
    }
}
