use std::path::PathBuf;

use clap::Parser;

use depth_session_core::{SessionConfig, SessionError};

/// Run depth camera devices: timed capture or init/stop benchmark.
///
/// Options left unset fall back to the `--config` file, then to built-in defaults.
#[derive(Debug, Parser)]
#[command(name = "depth-session")]
#[command(version)]
pub struct Args {
    /// Device serial number to open (repeatable; default: all attached)
    #[arg(short, long = "device")]
    pub devices: Vec<String>,

    /// Target frame rate in Hz
    #[arg(long)]
    pub fps: Option<u32>,

    /// Capture duration in seconds
    #[arg(long)]
    pub steps: Option<u32>,

    /// IR laser power
    #[arg(long)]
    pub laser_power: Option<i32>,

    /// Display frames while capturing
    #[arg(long)]
    pub display: bool,

    /// Display frames and save them on a key press
    #[arg(long)]
    pub save_with_key: bool,

    /// Skip calibration persistence during initialize
    #[arg(long)]
    pub benchmark_mode: bool,

    /// Number of init/stop cycles measured with --test-init-runtime
    #[arg(long)]
    pub benchmark_iterations: Option<u32>,

    /// Benchmark device init/stop latency instead of capturing
    #[arg(long)]
    pub test_init_runtime: bool,

    /// Warm-up frames discarded before capture (default: 5 seconds worth)
    #[arg(long)]
    pub warmup_frames: Option<u32>,

    /// Abort after this many back-to-back empty bundles (0 disables)
    #[arg(long)]
    pub max_consecutive_empty: Option<u64>,

    /// Reset one device every N accepted frames
    #[arg(long)]
    pub reset_interval: Option<u64>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Serial numbers attached to the simulated rig
    #[arg(long = "sim-serial", default_values_t = vec![String::from("000000000001")])]
    pub sim_serials: Vec<String>,

    /// Directory for calibration blobs
    #[arg(long)]
    pub calibration_dir: Option<PathBuf>,

    /// Simulator: every N-th step yields an empty bundle
    #[arg(long)]
    pub sim_empty_every: Option<u64>,

    /// Simulator: fault every step after the N-th
    #[arg(long)]
    pub sim_fail_after: Option<u64>,

    /// Simulator: return frames as fast as possible instead of at --fps
    #[arg(long)]
    pub sim_unpaced: bool,
}

impl Args {
    /// Resolve the session configuration: file (if any), then flags on top.
    pub fn session_config(&self) -> Result<SessionConfig, SessionError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)?,
            None => SessionConfig::default(),
        };

        if !self.devices.is_empty() {
            config.device_ids = self.devices.iter().cloned().collect();
        }
        if let Some(fps) = self.fps {
            config.target_fps = fps;
        }
        if let Some(steps) = self.steps {
            config.step_budget = steps;
        }
        if let Some(level) = self.laser_power {
            config.laser_power = level;
        }
        config.display_enabled |= self.display;
        config.save_with_key |= self.save_with_key;
        config.benchmark_mode |= self.benchmark_mode || self.test_init_runtime;
        if let Some(iterations) = self.benchmark_iterations {
            config.benchmark_iterations = iterations;
        }
        if self.warmup_frames.is_some() {
            config.warmup_frames = self.warmup_frames;
        }
        if let Some(limit) = self.max_consecutive_empty {
            config.max_consecutive_empty = Some(limit).filter(|l| *l > 0);
        }
        if self.reset_interval.is_some() {
            config.reset_interval = self.reset_interval;
        }

        config.validate()?;
        Ok(config)
    }
}
