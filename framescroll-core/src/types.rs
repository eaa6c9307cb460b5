use std::fmt;

/// 1-based position in the frame sequence.
pub type FrameIndex = u32;

/// Load state of one frame slot in the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Unrequested,
    Loading,
    Loaded,
    Failed,
}

/// Inclusive range of frame indices fetched by one preload call.
///
/// Two windows are the same in-flight request iff their `start-end` keys match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadWindow {
    pub start: FrameIndex,
    pub end: FrameIndex,
}

impl LoadWindow {
    /// Build a window over `[start, end]`, raising `start` to 1 and capping
    /// `end` at `total_frames`. Returns `None` when nothing is left.
    pub fn new(start: FrameIndex, end: FrameIndex, total_frames: u32) -> Option<Self> {
        let start = start.max(1);
        let end = end.min(total_frames);
        (start <= end).then_some(Self { start, end })
    }

    /// Frame indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FrameIndex> {
        self.start..=self.end
    }
}

impl fmt::Display for LoadWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
