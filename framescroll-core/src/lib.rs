//! Scroll-synchronised image-sequence playback.
//!
//! Maps the page scroll position onto a frame of a pre-rendered image
//! sequence, streams the frames needed around the current position, and
//! hands over to a looping video once the sequence reaches its last frame.
//!
//! Everything host-specific (viewport metrics, timers, image fetching, the
//! drawing surface, navigation) sits behind a small trait so the whole
//! pipeline runs against a [`scheduler::VirtualClock`] in tests.

pub mod cache;
pub mod caption;
pub mod config;
pub mod error;
pub mod loader;
pub mod mode;
pub mod orchestrator;
pub mod progress;
pub mod renderer;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod testing;

pub use cache::FrameCache;
pub use caption::CaptionCycleController;
pub use config::{DrawTargetMode, PlayerConfig, Resolution};
pub use error::{ConfigError, FrameLoadError};
pub use loader::{FrameAssetLoader, FrameSource, PreloadReport};
pub use mode::{PlaybackMode, PlaybackModeMachine, StableMode};
pub use orchestrator::{CaptionPlacement, Navigator, PlaybackSnapshot, ScrollAnimationOrchestrator};
pub use progress::{ListenerHandle, ScrollProgressSource, ViewportEvent, ViewportMetrics, ViewportMetricsProvider};
pub use renderer::{DrawSurface, FrameRenderer};
pub use scheduler::{Scheduler, Task, VirtualClock};
pub use types::{FrameIndex, FrameState, LoadWindow};
