use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(SessionId);
id_newtype!(StudentId);
id_newtype!(LessonId);
id_newtype!(DocumentId);

/// Lifecycle status of one tutoring session. The usual progression is
/// `Scheduled → Confirmed → Completed → PendingPayment → Paid`, with the two
/// cancelled variants as alternate terminals. The server is authoritative for
/// transition legality; the client accepts whatever status comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    Scheduled,
    Confirmed,
    Completed,
    PendingPayment,
    Paid,
    CancelledByStudent,
    CancelledByTutor,
}

impl LessonStatus {
    /// Lenient wire parse. Legacy records carry no status at all, and very old
    /// ones may carry values this client does not know; both fall through to
    /// the boolean derivation in [`crate::protocol::SessionDto::normalize`].
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "SCHEDULED" => Some(Self::Scheduled),
            "CONFIRMED" => Some(Self::Confirmed),
            "COMPLETED" => Some(Self::Completed),
            "PENDING_PAYMENT" => Some(Self::PendingPayment),
            "PAID" => Some(Self::Paid),
            "CANCELLED_BY_STUDENT" => Some(Self::CancelledByStudent),
            "CANCELLED_BY_TUTOR" => Some(Self::CancelledByTutor),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::Paid => "PAID",
            Self::CancelledByStudent => "CANCELLED_BY_STUDENT",
            Self::CancelledByTutor => "CANCELLED_BY_TUTOR",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::CancelledByStudent | Self::CancelledByTutor)
    }

    /// Terminal for the purpose of quick-toggle actions: paid or cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid) || self.is_cancelled()
    }

    /// The session has been taught (legacy `completed` flag equivalent).
    pub fn is_taught(&self) -> bool {
        matches!(self, Self::Completed | Self::PendingPayment | Self::Paid)
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// One scheduled or historical tutoring session, normalized so `status` is
/// always concrete and the legacy `completed`/`paid` booleans agree with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    /// Server-assigned monotonic counter; echoed on every mutation so the
    /// server can reject stale writes.
    pub version: i64,
    pub status: LessonStatus,
    pub completed: bool,
    pub paid: bool,
    pub student_id: StudentId,
    pub student_name: String,
    pub subject: String,
    pub session_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: f64,
    pub price_per_hour: i64,
    pub total_amount: i64,
    /// Denormalized `YYYY-MM` bucket, kept consistent with `session_date`.
    pub month: String,
    pub notes: Option<String>,
    pub is_online: bool,
    pub lesson_ids: Vec<LessonId>,
    pub document_ids: Vec<DocumentId>,
}

impl SessionRecord {
    /// Canonical `YYYY-MM` rendering of a date, the server's bucket key.
    pub fn month_key(date: NaiveDate) -> String {
        date.format("%Y-%m").to_string()
    }

    /// Canonical `YYYY-MM-DD` rendering, the calendar cell key.
    pub fn date_key(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// `total_amount == hours × price_per_hour` whenever both are defined.
    pub fn amount_consistent(&self) -> bool {
        (self.total_amount as f64 - self.hours * self.price_per_hour as f64).abs() < 0.5
    }
}
