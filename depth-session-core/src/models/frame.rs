use std::collections::BTreeMap;

/// Identifier of one stream on a device, e.g. `"color"` or `"depth"`.
///
/// Multi-device collaborators typically prefix the serial number
/// (`"818312070212/depth"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(pub String);

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single frame. The payload is opaque to the session core.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub data: Vec<u8>,
    /// Device timestamp in milliseconds, when the device reports one.
    pub timestamp_ms: Option<f64>,
}

/// The set of per-stream frames returned by one step.
///
/// An empty bundle means no synchronized frameset was ready this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBundle {
    frames: BTreeMap<StreamId, Frame>,
}

impl FrameBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stream: impl Into<StreamId>, frame: Frame) {
        self.frames.insert(stream.into(), frame);
    }

    pub fn get(&self, stream: &StreamId) -> Option<&Frame> {
        self.frames.get(stream)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn streams(&self) -> impl Iterator<Item = &StreamId> {
        self.frames.keys()
    }
}

impl FromIterator<(StreamId, Frame)> for FrameBundle {
    fn from_iter<I: IntoIterator<Item = (StreamId, Frame)>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

/// Frame counters kept by the capture loop. Reset at the start of every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaptureCounters {
    /// Non-empty bundles accepted.
    pub accepted_frames: u64,
    /// Loop iterations, including those that produced an empty bundle.
    pub elapsed_ticks: u64,
}

/// Per-step options forwarded to the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOptions {
    pub display: bool,
    pub save_with_key: bool,
}
