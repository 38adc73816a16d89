use async_trait::async_trait;
use shared::{
    domain::{LessonStatus, SessionId, SessionRecord},
    protocol::{CreateSessionRequest, SessionPatch},
};

use crate::error::ServiceError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The session-record service as the coordinator sees it. Every mutating call
/// carries the session's current `version`; the service either returns the
/// updated record (with the incremented version) or signals failure, with
/// stale writes rejected as [`ServiceError::Conflict`].
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn fetch_by_month(&self, month: &str) -> ServiceResult<Vec<SessionRecord>>;
    async fn fetch_unpaid(&self) -> ServiceResult<Vec<SessionRecord>>;
    async fn create(&self, request: CreateSessionRequest) -> ServiceResult<SessionRecord>;
    async fn update(&self, id: SessionId, patch: SessionPatch) -> ServiceResult<SessionRecord>;
    async fn delete(&self, id: SessionId) -> ServiceResult<()>;
    async fn delete_by_month(&self, month: &str) -> ServiceResult<()>;
    async fn duplicate(&self, id: SessionId) -> ServiceResult<SessionRecord>;
    async fn set_status(
        &self,
        id: SessionId,
        status: LessonStatus,
        version: i64,
    ) -> ServiceResult<SessionRecord>;
    async fn toggle_payment(&self, id: SessionId, version: i64) -> ServiceResult<SessionRecord>;
    async fn toggle_completed(&self, id: SessionId, version: i64) -> ServiceResult<SessionRecord>;
    async fn export_month(&self, month: &str) -> ServiceResult<Vec<u8>>;
}

/// Null service for construction before a backend is configured; every call
/// fails without touching the network.
pub struct MissingSessionService;

fn unavailable<T>() -> ServiceResult<T> {
    Err(ServiceError::Transport(
        "session service is unavailable".to_string(),
    ))
}

#[async_trait]
impl SessionService for MissingSessionService {
    async fn fetch_by_month(&self, _month: &str) -> ServiceResult<Vec<SessionRecord>> {
        unavailable()
    }

    async fn fetch_unpaid(&self) -> ServiceResult<Vec<SessionRecord>> {
        unavailable()
    }

    async fn create(&self, _request: CreateSessionRequest) -> ServiceResult<SessionRecord> {
        unavailable()
    }

    async fn update(&self, _id: SessionId, _patch: SessionPatch) -> ServiceResult<SessionRecord> {
        unavailable()
    }

    async fn delete(&self, _id: SessionId) -> ServiceResult<()> {
        unavailable()
    }

    async fn delete_by_month(&self, _month: &str) -> ServiceResult<()> {
        unavailable()
    }

    async fn duplicate(&self, _id: SessionId) -> ServiceResult<SessionRecord> {
        unavailable()
    }

    async fn set_status(
        &self,
        _id: SessionId,
        _status: LessonStatus,
        _version: i64,
    ) -> ServiceResult<SessionRecord> {
        unavailable()
    }

    async fn toggle_payment(&self, _id: SessionId, _version: i64) -> ServiceResult<SessionRecord> {
        unavailable()
    }

    async fn toggle_completed(
        &self,
        _id: SessionId,
        _version: i64,
    ) -> ServiceResult<SessionRecord> {
        unavailable()
    }

    async fn export_month(&self, _month: &str) -> ServiceResult<Vec<u8>> {
        unavailable()
    }
}
