use thiserror::Error;

/// Scene construction failures: unreadable files, malformed descriptions and
/// invalid object parameters.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("cannot read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse scene file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scene: {0}")]
    Invalid(String),
}

impl SceneError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SceneError::Invalid(msg.into())
    }
}

/// Failures while rendering. Numerical degeneracies are not errors; they
/// render as black.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot start worker pool: {0}")]
    Pool(String),
}
