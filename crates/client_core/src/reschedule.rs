use chrono::NaiveDate;
use shared::{
    domain::{SessionId, SessionRecord},
    protocol::SessionPatch,
};

/// A drag-and-drop move, captured as a plain transaction so the logic is
/// testable without simulating pointer events. Construction is the only place
/// the gesture touches; everything after runs through the store's standard
/// mutation protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct RescheduleRequest {
    pub session_id: SessionId,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub version: i64,
}

impl RescheduleRequest {
    /// Returns `None` when the drop target is the session's current date; a
    /// same-day drop is a no-op, not a mutation.
    pub fn new(session: &SessionRecord, target: NaiveDate) -> Option<Self> {
        if session.session_date == target {
            return None;
        }
        Some(Self {
            session_id: session.id,
            from: session.session_date,
            to: target,
            version: session.version,
        })
    }

    /// Minimal update payload: the new date, the matching `YYYY-MM` bucket,
    /// and the version. Nothing else, so server-side defaults for untouched
    /// fields are never clobbered. Date and month travel together, which keeps
    /// a cross-month move atomic.
    pub fn patch(&self) -> SessionPatch {
        SessionPatch {
            version: self.version,
            session_date: Some(self.to),
            month: Some(SessionRecord::month_key(self.to)),
            ..SessionPatch::default()
        }
    }

    pub fn crosses_month(&self) -> bool {
        SessionRecord::month_key(self.from) != SessionRecord::month_key(self.to)
    }
}

#[cfg(test)]
#[path = "tests/reschedule_tests.rs"]
mod tests;
