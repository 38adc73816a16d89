use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DocumentId, LessonId, LessonStatus, SessionId, SessionRecord, StudentId};

/// Session record as the server sends it. Legacy rows predate the status
/// machine: `status` may be absent (or an unrecognized value), in which case
/// the `completed`/`paid` booleans are the only lifecycle signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: SessionId,
    pub version: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub paid: bool,
    pub student_id: StudentId,
    pub student_name: String,
    #[serde(default)]
    pub subject: String,
    pub session_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    pub hours: f64,
    pub price_per_hour: i64,
    pub total_amount: i64,
    pub month: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub lesson_ids: Vec<LessonId>,
    #[serde(default)]
    pub document_ids: Vec<DocumentId>,
}

impl SessionDto {
    /// Normalizes into the single canonical representation: an explicit,
    /// recognized status wins; otherwise derive `paid → PAID`,
    /// `completed → COMPLETED`, else `SCHEDULED`. The legacy booleans are then
    /// re-derived from the final status so they can never disagree with it.
    pub fn normalize(self) -> SessionRecord {
        let status = self
            .status
            .as_deref()
            .and_then(LessonStatus::from_wire)
            .unwrap_or(if self.paid {
                LessonStatus::Paid
            } else if self.completed.unwrap_or(false) {
                LessonStatus::Completed
            } else {
                LessonStatus::Scheduled
            });

        SessionRecord {
            id: self.id,
            version: self.version,
            status,
            completed: status.is_taught(),
            paid: status.is_paid(),
            student_id: self.student_id,
            student_name: self.student_name,
            subject: self.subject,
            session_date: self.session_date,
            start_time: self.start_time,
            end_time: self.end_time,
            hours: self.hours,
            price_per_hour: self.price_per_hour,
            total_amount: self.total_amount,
            month: self.month,
            notes: self.notes,
            is_online: self.is_online,
            lesson_ids: self.lesson_ids,
            document_ids: self.document_ids,
        }
    }
}

/// Partial update payload. Only the fields present are written server-side,
/// so call sites send the minimum they mean to change; `version` is always
/// required for the optimistic-concurrency check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_hour: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub student_id: StudentId,
    pub session_date: NaiveDate,
    pub month: String,
    pub hours_per_session: f64,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub status: LessonStatus,
}
