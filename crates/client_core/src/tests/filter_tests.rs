use super::*;
use crate::calendar::calendar_days;
use chrono::NaiveDate;
use shared::domain::{LessonStatus, SessionId, SessionRecord, StudentId};

fn session(id: i64, status: LessonStatus, name: &str, subject: &str) -> SessionRecord {
    let session_date: NaiveDate = "2024-05-10".parse().expect("test date");
    SessionRecord {
        id: SessionId(id),
        version: 1,
        status,
        completed: status.is_taught(),
        paid: status.is_paid(),
        student_id: StudentId(1),
        student_name: name.to_string(),
        subject: subject.to_string(),
        session_date,
        start_time: None,
        end_time: None,
        hours: 1.0,
        price_per_hour: 200_000,
        total_amount: 200_000,
        month: SessionRecord::month_key(session_date),
        notes: None,
        is_online: false,
        lesson_ids: Vec::new(),
        document_ids: Vec::new(),
    }
}

fn fixture() -> Vec<SessionRecord> {
    vec![
        session(1, LessonStatus::Scheduled, "Minh Anh", "Physics"),
        session(2, LessonStatus::Paid, "Bao", "Chemistry"),
        session(3, LessonStatus::Scheduled, "An Khang", "physics olympiad"),
        session(4, LessonStatus::CancelledByStudent, "Minh Anh", "Math"),
    ]
}

#[test]
fn default_filter_is_a_passthrough() {
    let filter = SessionFilter::default();
    assert!(filter.is_passthrough());
    assert_eq!(filter.apply(&fixture()), fixture());
}

#[test]
fn status_filter_keeps_exact_matches_only() {
    let filter = SessionFilter::with_status(LessonStatus::Scheduled);
    let kept: Vec<i64> = filter.apply(&fixture()).iter().map(|s| s.id.0).collect();
    assert_eq!(kept, vec![1, 3]);
}

#[test]
fn query_matches_name_or_subject_case_insensitively() {
    let by_subject = SessionFilter::with_query("PHYS");
    let kept: Vec<i64> = by_subject.apply(&fixture()).iter().map(|s| s.id.0).collect();
    assert_eq!(kept, vec![1, 3]);

    let by_name = SessionFilter::with_query("minh");
    let kept: Vec<i64> = by_name.apply(&fixture()).iter().map(|s| s.id.0).collect();
    assert_eq!(kept, vec![1, 4]);
}

#[test]
fn whitespace_only_query_matches_everything() {
    let filter = SessionFilter::with_query("   ");
    assert!(filter.is_passthrough());
    assert_eq!(filter.apply(&fixture()).len(), 4);
}

#[test]
fn status_and_query_combine_as_conjunction() {
    let filter = SessionFilter {
        status: StatusFilter::Only(LessonStatus::Scheduled),
        query: "minh".to_string(),
    };
    let kept: Vec<i64> = filter.apply(&fixture()).iter().map(|s| s.id.0).collect();
    assert_eq!(kept, vec![1]);
}

#[test]
fn filtering_is_idempotent() {
    let filter = SessionFilter {
        status: StatusFilter::Only(LessonStatus::Scheduled),
        query: "phys".to_string(),
    };
    let once = filter.apply(&fixture());
    let twice = filter.apply(&once);
    assert_eq!(once, twice);
}

#[test]
fn day_buckets_and_flat_list_agree_on_visible_sessions() {
    let sessions = fixture();
    let reference: NaiveDate = "2024-05-10".parse().unwrap();
    let days = calendar_days(reference, reference, &sessions);

    let filter = SessionFilter::with_query("phys");
    let flat: Vec<SessionId> = filter.apply(&sessions).iter().map(|s| s.id).collect();
    let from_grid: Vec<SessionId> = filter
        .apply_to_days(&days)
        .iter()
        .flat_map(|d| d.sessions.iter().map(|s| s.id))
        .collect();
    assert_eq!(flat, from_grid);
}

#[test]
fn apply_to_days_preserves_grid_shape() {
    let sessions = fixture();
    let reference: NaiveDate = "2024-05-10".parse().unwrap();
    let days = calendar_days(reference, reference, &sessions);

    let filtered = SessionFilter::with_status(LessonStatus::Paid).apply_to_days(&days);
    assert_eq!(filtered.len(), days.len());
    for (before, after) in days.iter().zip(&filtered) {
        assert_eq!(before.date, after.date);
        assert_eq!(before.is_current_month, after.is_current_month);
    }
}
