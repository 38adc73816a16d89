use shared::{
    domain::SessionId,
    error::{ApiException, ErrorCode},
};
use thiserror::Error;

/// Failure channel for the session-record service. Version conflicts get
/// their own variant so the coordinator can detect them deterministically
/// instead of guessing from message text.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("version conflict on session {id:?}: submitted version {submitted_version} is stale")]
    Conflict {
        id: SessionId,
        submitted_version: i64,
    },
    #[error("session {0:?} not found")]
    NotFound(SessionId),
    #[error(transparent)]
    Api(#[from] ApiException),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
            || matches!(self, Self::Api(e) if e.code == ErrorCode::Conflict)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}
