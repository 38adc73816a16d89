use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{LessonStatus, SessionId, SessionRecord},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{CreateSessionRequest, SessionDto, SessionPatch},
};
use url::Url;

use crate::{
    error::ServiceError,
    service::{ServiceResult, SessionService},
};

/// reqwest-backed [`SessionService`] against the tutoring product's REST
/// surface. HTTP 409 maps to [`ServiceError::Conflict`]; other non-success
/// statuses are decoded from the server's error body when possible.
pub struct HttpSessionService {
    http: Client,
    base_url: String,
}

impl HttpSessionService {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("invalid server url: {base_url}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            bail!("server url must start with http:// or https://: {base_url}");
        }
        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Converts a non-success response into the typed failure channel.
    /// `versioned` carries the id/version of the write so a 409 can be
    /// reported as a deterministic conflict rather than message text.
    async fn check(
        response: Response,
        versioned: Option<(SessionId, i64)>,
    ) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::CONFLICT {
            if let Some((id, submitted_version)) = versioned {
                return Err(ServiceError::Conflict {
                    id,
                    submitted_version,
                });
            }
        }

        match response.json::<ApiError>().await {
            Ok(body) => Err(ServiceError::Api(ApiException::from(body))),
            Err(_) => Err(ServiceError::Api(ApiException::new(
                ErrorCode::Internal,
                format!("server returned {status}"),
            ))),
        }
    }

    async fn record(
        response: Response,
        versioned: Option<(SessionId, i64)>,
    ) -> ServiceResult<SessionRecord> {
        let dto: SessionDto = Self::check(response, versioned).await?.json().await?;
        Ok(dto.normalize())
    }

    async fn records(response: Response) -> ServiceResult<Vec<SessionRecord>> {
        let dtos: Vec<SessionDto> = Self::check(response, None).await?.json().await?;
        Ok(dtos.into_iter().map(SessionDto::normalize).collect())
    }
}

#[async_trait]
impl SessionService for HttpSessionService {
    async fn fetch_by_month(&self, month: &str) -> ServiceResult<Vec<SessionRecord>> {
        let response = self
            .http
            .get(self.endpoint(&format!("/sessions/month/{month}")))
            .send()
            .await?;
        Self::records(response).await
    }

    async fn fetch_unpaid(&self) -> ServiceResult<Vec<SessionRecord>> {
        let response = self
            .http
            .get(self.endpoint("/sessions/unpaid"))
            .send()
            .await?;
        Self::records(response).await
    }

    async fn create(&self, request: CreateSessionRequest) -> ServiceResult<SessionRecord> {
        let response = self
            .http
            .post(self.endpoint("/sessions"))
            .json(&request)
            .send()
            .await?;
        Self::record(response, None).await
    }

    async fn update(&self, id: SessionId, patch: SessionPatch) -> ServiceResult<SessionRecord> {
        let version = patch.version;
        let response = self
            .http
            .put(self.endpoint(&format!("/sessions/{}", id.0)))
            .json(&patch)
            .send()
            .await?;
        Self::record(response, Some((id, version))).await
    }

    async fn delete(&self, id: SessionId) -> ServiceResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/sessions/{}", id.0)))
            .send()
            .await?;
        Self::check(response, None).await?;
        Ok(())
    }

    async fn delete_by_month(&self, month: &str) -> ServiceResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/sessions/month/{month}")))
            .send()
            .await?;
        Self::check(response, None).await?;
        Ok(())
    }

    async fn duplicate(&self, id: SessionId) -> ServiceResult<SessionRecord> {
        let response = self
            .http
            .post(self.endpoint(&format!("/sessions/{}/duplicate", id.0)))
            .send()
            .await?;
        Self::record(response, None).await
    }

    async fn set_status(
        &self,
        id: SessionId,
        status: LessonStatus,
        version: i64,
    ) -> ServiceResult<SessionRecord> {
        let response = self
            .http
            .patch(self.endpoint(&format!("/sessions/{}/status", id.0)))
            .query(&[
                ("newStatus", status.as_wire().to_string()),
                ("version", version.to_string()),
            ])
            .send()
            .await?;
        Self::record(response, Some((id, version))).await
    }

    async fn toggle_payment(&self, id: SessionId, version: i64) -> ServiceResult<SessionRecord> {
        let response = self
            .http
            .put(self.endpoint(&format!("/sessions/{}/toggle-payment", id.0)))
            .query(&[("version", version)])
            .send()
            .await?;
        Self::record(response, Some((id, version))).await
    }

    async fn toggle_completed(&self, id: SessionId, version: i64) -> ServiceResult<SessionRecord> {
        let response = self
            .http
            .put(self.endpoint(&format!("/sessions/{}/toggle-completed", id.0)))
            .query(&[("version", version)])
            .send()
            .await?;
        Self::record(response, Some((id, version))).await
    }

    async fn export_month(&self, month: &str) -> ServiceResult<Vec<u8>> {
        let response = self
            .http
            .get(self.endpoint("/sessions/export/excel"))
            .query(&[("month", month)])
            .send()
            .await?;
        let bytes = Self::check(response, None).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
