use thiserror::Error;

/// Errors that can occur while driving a device session.
///
/// An empty frame bundle is deliberately absent: it is a recoverable
/// condition reported through `FrameBundle::is_empty`, not a fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("device initialization failed: {0}")]
    DeviceInit(String),

    #[error("device configuration rejected: {0}")]
    DeviceConfig(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("capture fault: {0}")]
    CaptureFault(String),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{consecutive} consecutive empty frame bundles")]
    EmptyBundleLimit { consecutive: u64 },

    #[error("benchmark cycle {iteration} failed: {reason}")]
    BenchmarkCycle {
        iteration: u32,
        reason: Box<SessionError>,
    },
}

impl SessionError {
    /// Whether this error ends the current run.
    ///
    /// Calibration persistence failures are reported but capture can still
    /// proceed without them.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
