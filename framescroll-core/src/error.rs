use crate::types::FrameIndex;

/// A single frame could not be fetched or decoded.
///
/// Never fatal: the loader logs it and marks the slot failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameLoadError {
    #[error("frame {index} ({path}) failed to load: {reason}")]
    Fetch {
        index: FrameIndex,
        path: String,
        reason: String,
    },

    #[error("frame {index} ({path}) could not be decoded")]
    Decode { index: FrameIndex, path: String },
}

impl FrameLoadError {
    pub fn fetch(index: FrameIndex, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            index,
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(index: FrameIndex, path: impl Into<String>) -> Self {
        Self::Decode {
            index,
            path: path.into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
