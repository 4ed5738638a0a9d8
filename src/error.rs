use thiserror::Error;

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while loading a [`StepSpec`](crate::step::StepSpec).
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Failed to parse step: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pixel buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid step payload: {0}")]
    InvalidPayload(String),
}
