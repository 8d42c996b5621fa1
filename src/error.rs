pub type Result<T> = std::result::Result<T, SupertreeError>;

/// Errors raised while talking to tmux or driving the coordinator
#[derive(Debug, thiserror::Error)]
pub enum SupertreeError {
    #[error("tmux unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("tmux {command} failed: {message}")]
    MutationFailed { command: String, message: String },

    #[error("{0} is not supported")]
    UnsupportedOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error: {0}")]
    Generic(String),
}

impl From<String> for SupertreeError {
    fn from(error: String) -> Self {
        SupertreeError::Generic(error)
    }
}
