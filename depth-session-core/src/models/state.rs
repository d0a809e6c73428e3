use serde::{Deserialize, Serialize};

/// Device session state machine.
///
/// State transitions:
/// ```text
/// uninitialized → ready ↔ capturing
///       ↓           ↓         ↓
///       └────────→ stopped ←──┘
/// ```
///
/// `Stopped` is terminal. Stopping a stopped session is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Capturing,
    Stopped,
}

impl SessionState {
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether the device handle is currently held.
    pub fn holds_device(&self) -> bool {
        matches!(self, Self::Ready | Self::Capturing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Capturing => "capturing",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_and_capturing_hold_the_device() {
        assert!(!SessionState::Uninitialized.holds_device());
        assert!(SessionState::Ready.holds_device());
        assert!(SessionState::Capturing.holds_device());
        assert!(!SessionState::Stopped.holds_device());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&SessionState::Capturing).unwrap();
        assert_eq!(json, "\"capturing\"");
    }
}
