use shared::domain::{LessonStatus, SessionRecord};

use crate::calendar::CalendarDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(LessonStatus),
}

/// Predicate combinator applied uniformly to the flat list and to each day
/// bucket, so list and grid views always agree on visible content. Filtering
/// never touches the canonical list, only derived views.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionFilter {
    pub status: StatusFilter,
    pub query: String,
}

impl SessionFilter {
    pub fn with_status(status: LessonStatus) -> Self {
        Self {
            status: StatusFilter::Only(status),
            ..Self::default()
        }
    }

    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.status == StatusFilter::All && self.query.trim().is_empty()
    }

    pub fn matches(&self, session: &SessionRecord) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => session.status == status,
        };

        let query = self.query.trim().to_lowercase();
        let query_ok = query.is_empty()
            || session.student_name.to_lowercase().contains(&query)
            || session.subject.to_lowercase().contains(&query);

        status_ok && query_ok
    }

    pub fn apply(&self, sessions: &[SessionRecord]) -> Vec<SessionRecord> {
        sessions
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }

    pub fn apply_to_days(&self, days: &[CalendarDay]) -> Vec<CalendarDay> {
        days.iter()
            .map(|day| CalendarDay {
                sessions: day.sessions.iter().filter(|s| self.matches(s)).cloned().collect(),
                ..day.clone()
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
