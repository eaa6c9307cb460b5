//! Player configuration.
//!
//! Field names are camelCase on the wire so a page can embed the options
//! as plain JSON (`{"totalFrames": 106, "chunkSize": 10, ...}`). Missing
//! fields take their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::FrameIndex;

pub const DEFAULT_TOTAL_FRAMES: u32 = 106;
pub const DEFAULT_CHUNK_SIZE: u32 = 10;
pub const DEFAULT_PRELOAD_AHEAD: u32 = 10;
/// Fade-out before the stable layer flips.
pub const DEFAULT_MODE_TRANSITION_DELAY_MS: u64 = 500;
/// Fade-in settle after the flip.
pub const DEFAULT_MODE_SETTLE_DELAY_MS: u64 = 500;
pub const DEFAULT_CAPTION_DEBOUNCE_MS: u64 = 600;
/// How far (in vh) the caption block travels over the whole sequence.
pub const DEFAULT_CAPTION_SLIDE_VH: f64 = 80.0;

const DEFAULT_CAPTIONS: [&str; 6] = ["всем", "привет", "севодня", "мы", "посмотрим", "сизигиа"];

/// How the drawing surface is sized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawTargetMode {
    /// Surface pixels track the viewport (crisp on every device).
    ViewportMatched,
    /// Surface keeps a fixed logical resolution; CSS scales it.
    #[default]
    FixedResolution,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    pub total_frames: u32,
    /// Window size for the initial load, which covers at least
    /// `[1, chunk_size]` and extends to the readiness threshold.
    pub chunk_size: u32,
    /// Frames fetched ahead of the current one on every scroll sample.
    pub preload_ahead: u32,
    /// Successful loads needed before the loading overlay goes away.
    pub initial_readiness_threshold: u32,
    pub caption_list: Vec<String>,
    /// Multiplier applied to `progress * caption_count` when picking a caption.
    pub caption_scale: f64,
    pub mode_transition_delay_ms: u64,
    pub mode_settle_delay_ms: u64,
    pub caption_debounce_ms: u64,
    pub draw_target_mode: DrawTargetMode,
    pub fixed_resolution: Resolution,
    pub frame_path_prefix: String,
    pub frame_extension: String,
    pub video_path: String,
    /// Centred caption shown over the looping video.
    pub video_caption: String,
    pub learn_more_path: String,
    pub learn_more_label: String,
    pub caption_slide_vh: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            total_frames: DEFAULT_TOTAL_FRAMES,
            chunk_size: DEFAULT_CHUNK_SIZE,
            preload_ahead: DEFAULT_PRELOAD_AHEAD,
            initial_readiness_threshold: DEFAULT_CHUNK_SIZE,
            caption_list: DEFAULT_CAPTIONS.iter().map(|c| c.to_string()).collect(),
            caption_scale: 1.0,
            mode_transition_delay_ms: DEFAULT_MODE_TRANSITION_DELAY_MS,
            mode_settle_delay_ms: DEFAULT_MODE_SETTLE_DELAY_MS,
            caption_debounce_ms: DEFAULT_CAPTION_DEBOUNCE_MS,
            draw_target_mode: DrawTargetMode::default(),
            fixed_resolution: Resolution::default(),
            frame_path_prefix: "/frames/frame_".to_string(),
            frame_extension: "webp".to_string(),
            video_path: "/video.mp4".to_string(),
            video_caption: "Умный дамах".to_string(),
            learn_more_path: "/about".to_string(),
            learn_more_label: "узнать больше".to_string(),
            caption_slide_vh: DEFAULT_CAPTION_SLIDE_VH,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON config block.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_frames == 0 {
            return Err(ConfigError::invalid("totalFrames must be at least 1"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::invalid("chunkSize must be at least 1"));
        }
        if self.caption_list.is_empty() {
            return Err(ConfigError::invalid("captionList must not be empty"));
        }
        if !(self.caption_scale.is_finite() && self.caption_scale > 0.0) {
            return Err(ConfigError::invalid(format!(
                "captionScale must be a positive number, got {}",
                self.caption_scale
            )));
        }
        if self.fixed_resolution.width == 0 || self.fixed_resolution.height == 0 {
            return Err(ConfigError::invalid("fixedResolution must be non-zero"));
        }
        if self.frame_extension.is_empty() {
            return Err(ConfigError::invalid("frameExtension must not be empty"));
        }
        Ok(())
    }

    /// Asset path for a frame: zero-padded to three digits, 1-based.
    pub fn frame_path(&self, index: FrameIndex) -> String {
        format!("{}{:03}.{}", self.frame_path_prefix, index, self.frame_extension)
    }

    /// Readiness threshold, capped at the sequence length.
    pub fn readiness_threshold(&self) -> usize {
        self.initial_readiness_threshold.min(self.total_frames) as usize
    }

    pub fn mode_transition_delay(&self) -> Duration {
        Duration::from_millis(self.mode_transition_delay_ms)
    }

    pub fn mode_settle_delay(&self) -> Duration {
        Duration::from_millis(self.mode_settle_delay_ms)
    }

    pub fn caption_debounce(&self) -> Duration {
        Duration::from_millis(self.caption_debounce_ms)
    }
}
