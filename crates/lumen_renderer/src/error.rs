use thiserror::Error;

/// Errors surfaced by the renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot encode an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },

    #[error("No frame available (nothing rendered yet or a job is in flight)")]
    NoFrame,
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
