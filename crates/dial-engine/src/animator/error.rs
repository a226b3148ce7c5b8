use thiserror::Error;

/// Construction-time configuration errors for animators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimatorError {
    #[error("window length must be a positive, finite number of milliseconds (got {0})")]
    InvalidWindowLength(f64),

    #[error("level throttle needs at least one performance level")]
    InvalidLevelCount,

    #[error("performance level {level} is out of range (0..{total})")]
    LevelOutOfRange { level: u32, total: u32 },

    #[error("sample interval must be non-zero")]
    InvalidSampleInterval,
}

pub type Result<T> = std::result::Result<T, AnimatorError>;
