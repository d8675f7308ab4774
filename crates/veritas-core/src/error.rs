//! Error types for Veritas.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The analysis service answered with a non-success status.
    #[error("Backend error {0}")]
    Backend(u16),

    /// The request never produced a response (connection, DNS, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid analysis response: {0}")]
    InvalidResponse(String),

    /// The context accepted the message but dropped the reply channel.
    #[error("No response from {0} context")]
    NoResponse(&'static str),

    #[error("Timed out waiting for {0} context")]
    Timeout(&'static str),

    /// The context's inbox is gone; nothing can be delivered to it.
    #[error("Context closed: {0}")]
    ContextClosed(&'static str),

    #[error("Session already started")]
    SessionActive,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
