//! Error taxonomy for the review session.

use thiserror::Error;

/// Action kinds that may have at most one request outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AddComment,
    DeleteComment,
    FetchLibrary,
    SaveLibraryItem,
    DeleteLibraryItem,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::AddComment => "add comment",
            ActionKind::DeleteComment => "delete comment",
            ActionKind::FetchLibrary => "load library",
            ActionKind::SaveLibraryItem => "save to library",
            ActionKind::DeleteLibraryItem => "delete library comment",
        }
    }
}

/// Failure talking to the remote feedback service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Network, timeout, HTTP status or decode failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The service answered but refused the request.
    #[error("{message}")]
    Rejected {
        message: String,
        error_code: Option<String>,
    },
}

impl ServiceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            message: message.into(),
            error_code: None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    /// The initialization payload cannot drive a session.
    #[error("configuration error: {0}")]
    Config(String),
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),
    #[error("request failed: {0}")]
    Transport(String),
    /// Verbatim message from the service.
    #[error("{0}")]
    Rejected(String),
    #[error("a {} request is already in progress", .0.label())]
    Busy(ActionKind),
    #[error("this view is read-only")]
    ReadOnly,
    /// The user declined a confirmation or scope prompt.
    #[error("cancelled")]
    Cancelled,
    /// A response arrived after the session it belonged to was torn down.
    #[error("response discarded: session was reset")]
    Stale,
}

impl ReviewError {
    /// Text shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            ReviewError::Transport(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the host should raise a notification for this error.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ReviewError::Cancelled | ReviewError::Stale)
    }
}

impl From<ServiceError> for ReviewError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Transport(detail) => ReviewError::Transport(detail),
            ServiceError::Rejected { message, .. } => ReviewError::Rejected(message),
        }
    }
}
