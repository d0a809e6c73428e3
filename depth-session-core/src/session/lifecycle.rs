use std::sync::Arc;

use crate::models::config::SessionConfig;
use crate::models::error::SessionError;
use crate::models::frame::{FrameBundle, StepOptions};
use crate::models::state::SessionState;
use crate::traits::device_collaborator::DeviceCollaborator;
use crate::traits::session_delegate::{LogDelegate, SessionDelegate, StatusLevel};

/// One logical use of a device, from initialize to stop.
///
/// The session exclusively borrows the collaborator for its lifetime and
/// owns every state transition. Dropping a session that still holds the
/// device stops it, so the hardware is released on every exit path,
/// including unwinding.
///
/// ```text
/// initialize() → Ready → begin_capture() → Capturing → stop() → Stopped
/// ```
pub struct DeviceSession<'a, D: DeviceCollaborator + ?Sized> {
    device: &'a mut D,
    config: SessionConfig,
    state: SessionState,
    delegate: Arc<dyn SessionDelegate>,
}

impl<'a, D: DeviceCollaborator + ?Sized> DeviceSession<'a, D> {
    pub fn new(device: &'a mut D, config: SessionConfig) -> Self {
        Self {
            device,
            config,
            state: SessionState::Uninitialized,
            delegate: Arc::new(LogDelegate),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = delegate;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn delegate(&self) -> &Arc<dyn SessionDelegate> {
        &self.delegate
    }

    /// Bring the devices online. Transitions: uninitialized → ready.
    ///
    /// Applies laser power after the collaborator initializes, then persists
    /// calibration unless running in benchmark mode. A rejected laser level
    /// releases the device again before the error is returned.
    pub fn initialize(&mut self) -> Result<(), SessionError> {
        self.config.validate()?;
        self.acquire()?;

        if let Err(e) = self.device.set_ir_laser_power(self.config.laser_power) {
            self.delegate
                .on_status(StatusLevel::Info, "Stopping devices...");
            self.device.stop();
            return Err(match e {
                SessionError::DeviceConfig(_) => e,
                other => SessionError::DeviceConfig(other.to_string()),
            });
        }

        if !self.config.benchmark_mode {
            if let Err(e) = self.device.save_calibration() {
                self.delegate.on_status(
                    StatusLevel::Warning,
                    &format!("Calibration not saved: {}", e),
                );
            }
        }

        self.set_state(SessionState::Ready);
        Ok(())
    }

    /// Bring the devices online without laser or calibration setup.
    ///
    /// Used by the benchmark to time the bare open/close path.
    pub(crate) fn initialize_bare(&mut self) -> Result<(), SessionError> {
        self.config.validate()?;
        self.acquire()?;
        self.set_state(SessionState::Ready);
        Ok(())
    }

    /// Discard `frames` captures so auto-exposure and gain can settle.
    pub fn warm_up(&mut self, frames: u32) -> Result<(), SessionError> {
        if !self.state.holds_device() {
            return Err(SessionError::InvalidState(format!(
                "cannot warm up a {} session",
                self.state
            )));
        }
        self.device.dummy_capture(frames);
        self.delegate.on_status(
            StatusLevel::Info,
            &format!("Discarded {} warm-up frames...", frames),
        );
        Ok(())
    }

    /// Release the devices. Transitions: any → stopped.
    ///
    /// Stopping a stopped session does nothing. The collaborator is only
    /// asked to stop when the session actually holds the device.
    pub fn stop(&mut self) {
        match self.state {
            SessionState::Stopped => return,
            SessionState::Uninitialized => {}
            SessionState::Ready | SessionState::Capturing => {
                self.device.stop();
            }
        }
        self.set_state(SessionState::Stopped);
    }

    // --- Capture loop hooks ---

    /// Transitions: ready → capturing. A capturing session stays as is.
    pub(crate) fn begin_capture(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Capturing => Ok(()),
            SessionState::Ready => {
                self.set_state(SessionState::Capturing);
                Ok(())
            }
            other => Err(SessionError::InvalidState(format!(
                "can only capture from a ready session, not {}",
                other
            ))),
        }
    }

    /// Pull one bundle. Any collaborator error is normalized to a capture fault.
    pub(crate) fn step(&mut self, options: StepOptions) -> Result<FrameBundle, SessionError> {
        if !self.state.is_capturing() {
            return Err(SessionError::InvalidState(format!(
                "cannot step a {} session",
                self.state
            )));
        }
        self.device.step(options).map_err(|e| match e {
            SessionError::CaptureFault(_) => e,
            other => SessionError::CaptureFault(other.to_string()),
        })
    }

    pub(crate) fn reset_device(&mut self, device_id: &str) -> Result<(), SessionError> {
        self.delegate.on_status(
            StatusLevel::Info,
            &format!("Resetting device {}...", device_id),
        );
        self.device.reset(device_id).map_err(|e| match e {
            SessionError::CaptureFault(_) => e,
            other => SessionError::CaptureFault(other.to_string()),
        })
    }

    // --- Internal helpers ---

    fn acquire(&mut self) -> Result<(), SessionError> {
        if !self.state.is_uninitialized() {
            return Err(SessionError::InvalidState(format!(
                "can only initialize an uninitialized session, not {}",
                self.state
            )));
        }
        self.device.initialize().map_err(|e| match e {
            SessionError::DeviceInit(_) => e,
            other => SessionError::DeviceInit(other.to_string()),
        })
    }

    fn set_state(&mut self, new_state: SessionState) {
        self.state = new_state;
        self.delegate.on_state_changed(new_state);
    }
}

impl<D: DeviceCollaborator + ?Sized> Drop for DeviceSession<'_, D> {
    fn drop(&mut self) {
        if self.state.holds_device() {
            log::warn!("session dropped while {}, stopping devices", self.state);
        }
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingDelegate, ScriptedDevice};

    fn config() -> SessionConfig {
        SessionConfig {
            target_fps: 5,
            step_budget: 1,
            laser_power: 120,
            ..Default::default()
        }
    }

    #[test]
    fn initialize_applies_laser_then_calibration() {
        let mut device = ScriptedDevice::default();
        {
            let mut session = DeviceSession::new(&mut device, config());
            session.initialize().unwrap();
            assert_eq!(session.state(), SessionState::Ready);
            session.stop();
        }
        assert_eq!(device.events, vec!["initialize", "laser", "calibration", "stop"]);
        assert_eq!(device.laser_level, Some(120));
    }

    #[test]
    fn benchmark_mode_skips_calibration() {
        let mut device = ScriptedDevice::default();
        let cfg = SessionConfig {
            benchmark_mode: true,
            ..config()
        };
        DeviceSession::new(&mut device, cfg).initialize().unwrap();
        assert_eq!(device.calibration_saves, 0);
        assert!(!device.events.contains(&"calibration"));
    }

    #[test]
    fn failed_initialize_stays_uninitialized() {
        let mut device = ScriptedDevice {
            fail_initialize_on: Some(1),
            ..Default::default()
        };
        let mut session = DeviceSession::new(&mut device, config());
        let err = session.initialize().unwrap_err();
        assert!(matches!(err, SessionError::DeviceInit(_)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        drop(session);
        assert_eq!(device.stop_calls, 0);
    }

    #[test]
    fn rejected_laser_releases_device() {
        let mut device = ScriptedDevice {
            reject_laser: true,
            ..Default::default()
        };
        let mut session = DeviceSession::new(&mut device, config());
        let err = session.initialize().unwrap_err();
        assert!(matches!(err, SessionError::DeviceConfig(_)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        drop(session);
        assert_eq!(device.stop_calls, 1);
    }

    #[test]
    fn rejected_laser_announces_stop() {
        let mut device = ScriptedDevice {
            reject_laser: true,
            ..Default::default()
        };
        let delegate = Arc::new(RecordingDelegate::default());
        let mut session = DeviceSession::new(&mut device, config());
        session.set_delegate(delegate.clone());

        assert!(session.initialize().is_err());
        assert_eq!(
            delegate.messages(StatusLevel::Info),
            vec!["Stopping devices...".to_string()]
        );
    }

    #[test]
    fn bare_initialize_validates_config() {
        let bad = [
            SessionConfig {
                target_fps: 0,
                ..config()
            },
            SessionConfig {
                reset_interval: Some(0),
                ..config()
            },
        ];
        for cfg in bad {
            let mut device = ScriptedDevice::default();
            let result = DeviceSession::new(&mut device, cfg).initialize_bare();
            assert!(matches!(result, Err(SessionError::InvalidConfiguration(_))));
            assert_eq!(device.initialize_calls, 0);
        }
    }

    #[test]
    fn calibration_failure_is_only_a_warning() {
        let mut device = ScriptedDevice {
            fail_calibration: true,
            ..Default::default()
        };
        let delegate = Arc::new(RecordingDelegate::default());
        let mut session = DeviceSession::new(&mut device, config());
        session.set_delegate(delegate.clone());

        session.initialize().unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        let warnings = delegate.messages(StatusLevel::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("read-only file system"));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut device = ScriptedDevice::default();
        {
            let mut session = DeviceSession::new(&mut device, config());
            session.initialize().unwrap();
            session.stop();
            session.stop();
            assert_eq!(session.state(), SessionState::Stopped);
        }
        assert_eq!(device.stop_calls, 1);
    }

    #[test]
    fn stop_from_uninitialized_does_not_touch_device() {
        let mut device = ScriptedDevice::default();
        {
            let mut session = DeviceSession::new(&mut device, config());
            session.stop();
            session.stop();
            assert!(session.state().is_terminal());
        }
        assert_eq!(device.stop_calls, 0);
    }

    #[test]
    fn drop_releases_initialized_device() {
        let mut device = ScriptedDevice::default();
        {
            let mut session = DeviceSession::new(&mut device, config());
            session.initialize().unwrap();
        }
        assert_eq!(device.stop_calls, 1);
    }

    #[test]
    fn stopped_session_cannot_be_reinitialized() {
        let mut device = ScriptedDevice::default();
        let mut session = DeviceSession::new(&mut device, config());
        session.initialize().unwrap();
        session.stop();
        assert!(matches!(
            session.initialize(),
            Err(SessionError::InvalidState(_))
        ));
    }

    #[test]
    fn warm_up_requires_held_device() {
        let mut device = ScriptedDevice::default();
        let mut session = DeviceSession::new(&mut device, config());
        assert!(session.warm_up(10).is_err());

        session.initialize().unwrap();
        session.warm_up(10).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        session.stop();
        assert!(session.warm_up(10).is_err());
        drop(session);
        assert_eq!(device.dummy_frames, 10);
    }

    #[test]
    fn state_changes_reach_delegate() {
        let mut device = ScriptedDevice::default();
        let delegate = Arc::new(RecordingDelegate::default());
        {
            let mut session = DeviceSession::new(&mut device, config());
            session.set_delegate(delegate.clone());
            session.initialize().unwrap();
            session.begin_capture().unwrap();
            session.stop();
        }
        assert_eq!(
            *delegate.states.lock(),
            vec![
                SessionState::Ready,
                SessionState::Capturing,
                SessionState::Stopped
            ]
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_touching_device() {
        let mut device = ScriptedDevice::default();
        let cfg = SessionConfig {
            target_fps: 0,
            ..config()
        };
        let result = DeviceSession::new(&mut device, cfg).initialize();
        assert!(matches!(result, Err(SessionError::InvalidConfiguration(_))));
        assert_eq!(device.initialize_calls, 0);
    }
}
