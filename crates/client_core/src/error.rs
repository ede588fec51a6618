use std::time::Duration;

use thiserror::Error;

pub const INDEX_FAILED_MESSAGE: &str = "Failed to index website.";
pub const CHAT_FAILED_MESSAGE: &str = "Failed to get answer.";
pub const TIMED_OUT_MESSAGE: &str = "Request timed out.";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend rejected request with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },
    #[error("request could not be completed: {0}")]
    Transport(String),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl BackendError {
    /// Text shown to the user. Backend detail wins; everything else collapses
    /// to the per-operation `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::TimedOut(_) => TIMED_OUT_MESSAGE.to_string(),
            Self::Rejected { detail: None, .. } | Self::Transport(_) | Self::Decode(_) => {
                fallback.to_string()
            }
        }
    }
}
