use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Hard ceiling on accepted frames, independent of the step budget.
pub const DEFAULT_STEP_CEILING: u64 = 100_000_000;

/// Default number of init/stop cycles measured in benchmark mode.
pub const DEFAULT_BENCHMARK_ITERATIONS: u32 = 100;

/// Default limit on back-to-back empty frame bundles before aborting.
pub const DEFAULT_MAX_CONSECUTIVE_EMPTY: u64 = 1000;

/// Seconds of frames discarded during warm-up when no explicit count is set.
const DEFAULT_WARMUP_SECS: u32 = 5;

/// Immutable configuration for one device session run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Device serial numbers to open. Empty selects every attached device.
    pub device_ids: BTreeSet<String>,

    /// Target frame rate in Hz (default: 30).
    pub target_fps: u32,

    /// Capture duration in seconds; the loop accepts `target_fps * step_budget` frames.
    pub step_budget: u32,

    /// IR laser power, validated by the device against its own range.
    pub laser_power: i32,

    /// Ask the device to display frames as they arrive.
    pub display_enabled: bool,

    /// Display frames and only save them on a key press.
    pub save_with_key: bool,

    /// Benchmark mode skips calibration persistence during initialize.
    pub benchmark_mode: bool,

    /// Number of init/stop cycles measured by the benchmark (default: 100).
    pub benchmark_iterations: u32,

    /// Discarded warm-up captures. `None` means five seconds worth of frames.
    pub warmup_frames: Option<u32>,

    /// Abort after this many back-to-back empty bundles. `None` disables the limit.
    pub max_consecutive_empty: Option<u64>,

    /// Reset one device (round-robin) every N accepted frames.
    pub reset_interval: Option<u64>,

    /// Safety ceiling on accepted frames.
    pub step_ceiling: u64,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.target_fps == 0 {
            return Err(SessionError::InvalidConfiguration(
                "target fps must be positive".into(),
            ));
        }
        if self.step_budget == 0 {
            return Err(SessionError::InvalidConfiguration(
                "step budget must be positive".into(),
            ));
        }
        if self.benchmark_iterations == 0 {
            return Err(SessionError::InvalidConfiguration(
                "benchmark iterations must be positive".into(),
            ));
        }
        if self.step_ceiling == 0 {
            return Err(SessionError::InvalidConfiguration(
                "step ceiling must be positive".into(),
            ));
        }
        if self.reset_interval == Some(0) {
            return Err(SessionError::InvalidConfiguration(
                "reset interval must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Number of accepted frames after which the capture loop completes.
    pub fn frame_target(&self) -> u64 {
        u64::from(self.target_fps) * u64::from(self.step_budget)
    }

    /// Number of discard captures issued before the timed loop.
    pub fn warmup_frame_count(&self) -> u32 {
        self.warmup_frames
            .unwrap_or_else(|| self.target_fps.saturating_mul(DEFAULT_WARMUP_SECS))
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SessionError> {
        let json = fs::read_to_string(path)
            .map_err(|e| SessionError::Io(format!("failed to read config: {}", e)))?;
        let config: SessionConfig = serde_json::from_str(&json).map_err(|e| {
            SessionError::InvalidConfiguration(format!("failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_ids: BTreeSet::new(),
            target_fps: 30,
            step_budget: 60,
            laser_power: 150,
            display_enabled: false,
            save_with_key: false,
            benchmark_mode: false,
            benchmark_iterations: DEFAULT_BENCHMARK_ITERATIONS,
            warmup_frames: None,
            max_consecutive_empty: Some(DEFAULT_MAX_CONSECUTIVE_EMPTY),
            reset_interval: None,
            step_ceiling: DEFAULT_STEP_CEILING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.benchmark_iterations, 100);
    }

    #[test]
    fn zero_fps_is_rejected() {
        let config = SessionConfig {
            target_fps: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SessionError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_step_budget_is_rejected() {
        let config = SessionConfig {
            step_budget: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_reset_interval_is_rejected() {
        let config = SessionConfig {
            reset_interval: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn warmup_defaults_to_five_seconds() {
        let config = SessionConfig {
            target_fps: 15,
            ..Default::default()
        };
        assert_eq!(config.warmup_frame_count(), 75);

        let explicit = SessionConfig {
            warmup_frames: Some(3),
            ..config
        };
        assert_eq!(explicit.warmup_frame_count(), 3);
    }

    #[test]
    fn frame_target_multiplies_fps_and_budget() {
        let config = SessionConfig {
            target_fps: 5,
            step_budget: 2,
            ..Default::default()
        };
        assert_eq!(config.frame_target(), 10);
    }

    #[test]
    fn load_partial_json_config() {
        let path = std::env::temp_dir().join(format!(
            "depth_session_config_{}.json",
            uuid::Uuid::new_v4()
        ));
        fs::write(&path, r#"{ "target_fps": 6, "device_ids": ["123", "456"] }"#).unwrap();

        let config = SessionConfig::from_json_file(&path).unwrap();
        assert_eq!(config.target_fps, 6);
        assert_eq!(config.device_ids.len(), 2);
        assert_eq!(config.step_budget, SessionConfig::default().step_budget);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn invalid_json_config_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "depth_session_config_{}.json",
            uuid::Uuid::new_v4()
        ));
        fs::write(&path, r#"{ "target_fps": 0 }"#).unwrap();

        assert!(matches!(
            SessionConfig::from_json_file(&path),
            Err(SessionError::InvalidConfiguration(_))
        ));

        let _ = fs::remove_file(&path);
    }
}
