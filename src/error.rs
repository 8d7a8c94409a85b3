pub type SceneKeyResult<T> = Result<T, SceneKeyError>;

/// Errors raised at the crate's structural boundaries.
///
/// The interactive paths (interpolation, gestures, tree edits) degrade
/// silently instead of erroring; `Result` only appears where a document is
/// decoded or validated.
#[derive(thiserror::Error, Debug)]
pub enum SceneKeyError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SceneKeyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
