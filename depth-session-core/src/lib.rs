//! # depth-session-core
//!
//! Device-agnostic session core for depth camera rigs.
//!
//! Drives a `DeviceCollaborator` (the vendor SDK wrapper) through its
//! lifecycle, runs the timed capture loop, and benchmarks init/stop latency.
//! Concrete devices (hardware wrappers, `depth-session-sim`) implement the
//! collaborator trait and plug into `DeviceSession`.
//!
//! ## Architecture
//!
//! ```text
//! depth-session-core (this crate)
//! ├── traits/   ← DeviceCollaborator, SessionDelegate
//! ├── models/   ← SessionConfig, SessionError, SessionState, FrameBundle, reports
//! ├── session/  ← DeviceSession, CaptureLoop, Benchmark, CancellationToken
//! └── storage/  ← JSON report files
//! ```

pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use models::config::SessionConfig;
pub use models::error::SessionError;
pub use models::frame::{CaptureCounters, Frame, FrameBundle, StepOptions, StreamId};
pub use models::report::{BenchmarkReport, CaptureOutcome, CaptureReport};
pub use models::state::SessionState;
pub use session::benchmark::{run_benchmark, Benchmark};
pub use session::cancellation::CancellationToken;
pub use session::capture_loop::CaptureLoop;
pub use session::lifecycle::DeviceSession;
pub use storage::report::{read_report, write_report};
pub use traits::device_collaborator::DeviceCollaborator;
pub use traits::session_delegate::{LogDelegate, ProgressEvent, SessionDelegate, StatusLevel};
