use crate::models::error::SessionError;
use crate::models::state::SessionState;

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Progress signal shared by the capture loop and the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Emitted once per `target_fps` accepted frames with the current count.
    Step { count: u64 },
    /// Emitted after each completed benchmark cycle.
    Cycle { completed: u32, total: u32 },
}

/// Event sink for session notifications.
///
/// All methods are called on the thread driving the session.
pub trait SessionDelegate: Send + Sync {
    /// Called on every effective state transition.
    fn on_state_changed(&self, state: SessionState);

    /// Called with periodic progress.
    fn on_progress(&self, event: ProgressEvent);

    /// Called with human-readable status text.
    fn on_status(&self, level: StatusLevel, message: &str);

    /// Called when a fault ends a run.
    fn on_error(&self, error: &SessionError) {
        self.on_status(StatusLevel::Error, &error.to_string());
    }
}

/// Delegate that forwards everything to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelegate;

impl SessionDelegate for LogDelegate {
    fn on_state_changed(&self, state: SessionState) {
        log::debug!("session state -> {}", state);
    }

    fn on_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Step { count } => log::info!("Step {:8}", count),
            ProgressEvent::Cycle { completed, total } => {
                log::debug!("benchmark cycle {}/{}", completed, total)
            }
        }
    }

    fn on_status(&self, level: StatusLevel, message: &str) {
        match level {
            StatusLevel::Info => log::info!("{}", message),
            StatusLevel::Warning => log::warn!("{}", message),
            StatusLevel::Error => log::error!("{}", message),
        }
    }
}
