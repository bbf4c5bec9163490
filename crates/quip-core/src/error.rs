use std::io;

#[derive(Debug, thiserror::Error)]
pub enum QuipError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keyboard controller error: {0}")]
    Enigo(String),

    #[error("Keyboard hook error: {0}")]
    Hook(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("trigger must not be empty")]
    EmptyTrigger,

    #[error("expansion must not be empty")]
    EmptyExpansion,

    #[error("trigger '{0}' not found")]
    TriggerNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capture loop is already running")]
    CaptureAlreadyRunning,

    #[error("Capture loop has been stopped")]
    CaptureStopped,

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unexpected key event: {0}")]
    UnexpectedEvent(String),
}

pub type Result<T> = std::result::Result<T, QuipError>;
