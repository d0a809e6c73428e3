//! Simulated multi-device depth camera.
//!
//! Produces one color and one depth frame per selected device on each step.
//! Empty bundles and capture faults can be injected to exercise the
//! capture loop without hardware.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use depth_session_core::{
    DeviceCollaborator, Frame, FrameBundle, SessionError, StepOptions, StreamId,
};

use crate::calibration::CalibrationBlob;

/// IR emitter power range of D400-class sensors, in milliwatts.
pub const DEFAULT_LASER_RANGE: RangeInclusive<i32> = 0..=360;

const DEFAULT_WIDTH: u32 = 64;
const DEFAULT_HEIGHT: u32 = 48;

pub struct SimulatedDevice {
    attached: Vec<String>,
    selected: BTreeSet<String>,
    enabled: Vec<String>,
    fps: u32,
    width: u32,
    height: u32,
    laser_range: RangeInclusive<i32>,
    laser_power: Option<i32>,
    calibration_dir: Option<PathBuf>,
    empty_every: Option<u64>,
    fail_after: Option<u64>,
    paced: bool,
    streaming: bool,
    steps: u64,
    flushed: u64,
    started: Option<Instant>,
}

impl SimulatedDevice {
    /// Simulate the given attached serial numbers. Every device is selected.
    pub fn new(attached: Vec<String>) -> Self {
        let mut attached = attached;
        attached.sort();
        Self {
            attached,
            selected: BTreeSet::new(),
            enabled: Vec::new(),
            fps: 30,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            laser_range: DEFAULT_LASER_RANGE,
            laser_power: None,
            calibration_dir: None,
            empty_every: None,
            fail_after: None,
            paced: false,
            streaming: false,
            steps: 0,
            flushed: 0,
            started: None,
        }
    }

    /// Restrict the session to these serial numbers. Empty selects all.
    pub fn with_selection(mut self, selected: BTreeSet<String>) -> Self {
        self.selected = selected;
        self
    }

    /// Sleep one frame interval per step to mimic a blocking device.
    pub fn with_pacing(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self.paced = true;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Write calibration blobs into this directory on `save_calibration`.
    pub fn with_calibration_dir(mut self, dir: PathBuf) -> Self {
        self.calibration_dir = Some(dir);
        self
    }

    /// Every n-th step yields an empty bundle.
    pub fn with_empty_every(mut self, n: u64) -> Self {
        self.empty_every = Some(n).filter(|n| *n > 0);
        self
    }

    /// Steps after the n-th raise a capture fault, as a disconnected USB link would.
    pub fn with_fail_after(mut self, n: u64) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn enabled_devices(&self) -> &[String] {
        &self.enabled
    }

    pub fn laser_power(&self) -> Option<i32> {
        self.laser_power
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Frames dropped by warm-up flushes since the last initialize.
    pub fn flushed_frames(&self) -> u64 {
        self.flushed
    }

    fn synth_frame(&self, seed: u64, bytes_per_pixel: u32) -> Frame {
        let len = (self.width * self.height * bytes_per_pixel) as usize;
        let data = (0..len)
            .map(|i| ((i as u64).wrapping_add(seed) & 0xff) as u8)
            .collect();
        Frame {
            data,
            timestamp_ms: self
                .started
                .map(|s| s.elapsed().as_secs_f64() * 1000.0),
        }
    }
}

impl DeviceCollaborator for SimulatedDevice {
    fn initialize(&mut self) -> Result<(), SessionError> {
        if self.attached.is_empty() {
            return Err(SessionError::DeviceInit("no depth device detected".into()));
        }
        if let Some(missing) = self.selected.iter().find(|s| !self.attached.contains(s)) {
            return Err(SessionError::DeviceInit(format!(
                "device {} is not attached",
                missing
            )));
        }

        self.enabled = if self.selected.is_empty() {
            self.attached.clone()
        } else {
            self.selected.iter().cloned().collect()
        };
        for serial in &self.enabled {
            log::info!("Initialized device {}", serial);
        }
        self.streaming = true;
        self.steps = 0;
        self.flushed = 0;
        self.started = Some(Instant::now());
        Ok(())
    }

    fn set_ir_laser_power(&mut self, level: i32) -> Result<(), SessionError> {
        if !self.streaming {
            return Err(SessionError::DeviceConfig("device not initialized".into()));
        }
        if !self.laser_range.contains(&level) {
            return Err(SessionError::DeviceConfig(format!(
                "laser power {} outside {}..={}",
                level,
                self.laser_range.start(),
                self.laser_range.end()
            )));
        }
        self.laser_power = Some(level);
        log::info!("IR laser power set to {}", level);
        Ok(())
    }

    fn save_calibration(&mut self) -> Result<(), SessionError> {
        let Some(dir) = self.calibration_dir.clone() else {
            log::debug!("no calibration directory configured, skipping");
            return Ok(());
        };
        for serial in &self.enabled {
            let blob = CalibrationBlob::simulated(serial, self.width, self.height);
            let (path, checksum) = blob.save(&dir)?;
            log::info!(
                "Saved calibration for {} to {} (sha256 {})",
                serial,
                path.display(),
                checksum
            );
        }
        Ok(())
    }

    fn dummy_capture(&mut self, frames: u32) {
        if !self.streaming {
            log::warn!("dummy capture requested while not streaming");
            return;
        }
        self.flushed += u64::from(frames);
        log::debug!("flushed {} frames", frames);
    }

    fn step(&mut self, options: StepOptions) -> Result<FrameBundle, SessionError> {
        if !self.streaming {
            return Err(SessionError::CaptureFault("pipeline not started".into()));
        }
        self.steps += 1;

        if self.paced {
            thread::sleep(Duration::from_secs_f64(1.0 / f64::from(self.fps)));
        }

        if let Some(limit) = self.fail_after {
            if self.steps > limit {
                return Err(SessionError::CaptureFault(
                    "frame didn't arrive within 5000 ms".into(),
                ));
            }
        }
        if let Some(n) = self.empty_every {
            if self.steps % n == 0 {
                return Ok(FrameBundle::new());
            }
        }

        let mut bundle = FrameBundle::new();
        for serial in &self.enabled {
            bundle.insert(
                StreamId(format!("{}/color", serial)),
                self.synth_frame(self.steps, 3),
            );
            bundle.insert(
                StreamId(format!("{}/depth", serial)),
                self.synth_frame(self.steps, 2),
            );
        }
        if options.display {
            log::trace!("display requested for step {}", self.steps);
        }
        Ok(bundle)
    }

    fn stop(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        for serial in &self.enabled {
            log::info!("Stopped device {}", serial);
        }
    }

    fn reset(&mut self, device_id: &str) -> Result<(), SessionError> {
        if !self.enabled.iter().any(|s| s == device_id) {
            return Err(SessionError::DeviceConfig(format!(
                "cannot reset unknown device {}",
                device_id
            )));
        }
        log::info!("Hardware reset of {}", device_id);
        Ok(())
    }
}
