use std::{collections::HashSet, future::Future, sync::Arc};

use chrono::{Local, NaiveDate};
use shared::{
    domain::{LessonStatus, SessionId, SessionRecord},
    protocol::{CreateSessionRequest, SessionPatch},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

pub mod calendar;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod reschedule;
pub mod service;
pub mod status;
pub mod transport;

pub use calendar::{calendar_days, month_stats, CalendarDay, MonthStats, GRID_CELLS};
pub use error::ServiceError;
pub use filter::{SessionFilter, StatusFilter};
pub use interaction::{InteractionState, ModalMode};
pub use reschedule::RescheduleRequest;
pub use service::{MissingSessionService, ServiceResult, SessionService};
pub use status::{status_style, QuickActions, StatusStyle};
pub use transport::HttpSessionService;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticePhase {
    Loading,
    Success,
    Error,
}

/// One step of the loading/success/error progress reporting every mutation
/// surfaces to the user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub phase: NoticePhase,
    pub message: String,
}

/// Broadcast to observers whenever the canonical list or its members change.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The canonical list was replaced wholesale from the server.
    Reloaded,
    SessionUpdated(SessionRecord),
    SessionRemoved(SessionId),
    Notice(Notice),
}

/// The query window the canonical list was fetched for; reloads refetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryWindow {
    Month(String),
    Unpaid,
}

/// What a mutation entry point did. Failures are already reported through
/// [`StoreEvent::Notice`] by the time this is returned; callers only need the
/// outcome for flow control.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied(SessionRecord),
    Removed(SessionId),
    Reloaded,
    /// Dropped synchronously: either a no-op (same-day reschedule) or a
    /// second request for a session whose first mutation is still in flight.
    Skipped,
    Failed(String),
}

struct StoreState {
    sessions: Vec<SessionRecord>,
    pending: HashSet<SessionId>,
    window: Option<QueryWindow>,
}

/// Owner of the canonical in-memory session list and the only component that
/// calls mutating service operations. Mutations apply optimistically from the
/// server's echoed record, are serialized per session id by the pending set,
/// and fall back to a full reload whenever local state can no longer be
/// trusted (stale-list signal, version conflict, failed reschedule).
pub struct SessionStore {
    service: Arc<dyn SessionService>,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl SessionStore {
    pub fn new(service: Arc<dyn SessionService>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            service,
            inner: Mutex::new(StoreState {
                sessions: Vec::new(),
                pending: HashSet::new(),
                window: None,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ---- read models -------------------------------------------------------

    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.inner.lock().await.sessions.clone()
    }

    pub async fn session(&self, id: SessionId) -> Option<SessionRecord> {
        self.inner
            .lock()
            .await
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub async fn is_pending(&self, id: SessionId) -> bool {
        self.inner.lock().await.pending.contains(&id)
    }

    pub async fn filtered_sessions(&self, filter: &SessionFilter) -> Vec<SessionRecord> {
        let guard = self.inner.lock().await;
        filter.apply(&guard.sessions)
    }

    /// The 42-cell grid for `reference`, with the filter mapped over every
    /// day bucket so grid and list views agree on visible content.
    pub async fn calendar_days(
        &self,
        reference: NaiveDate,
        filter: &SessionFilter,
    ) -> Vec<CalendarDay> {
        let today = Local::now().date_naive();
        let guard = self.inner.lock().await;
        let days = calendar::calendar_days(reference, today, &guard.sessions);
        filter.apply_to_days(&days)
    }

    /// Statistics over the whole (unfiltered) canonical list.
    pub async fn stats(&self) -> MonthStats {
        let guard = self.inner.lock().await;
        calendar::month_stats(&guard.sessions)
    }

    // ---- canonical-list maintenance ----------------------------------------

    pub async fn load_month(&self, month: &str) -> Result<(), ServiceError> {
        self.load(QueryWindow::Month(month.to_string())).await
    }

    pub async fn load_unpaid(&self) -> Result<(), ServiceError> {
        self.load(QueryWindow::Unpaid).await
    }

    async fn load(&self, window: QueryWindow) -> Result<(), ServiceError> {
        let fetched = self.fetch(&window).await;
        match fetched {
            Ok(sessions) => {
                info!(count = sessions.len(), ?window, "loaded session window");
                let mut guard = self.inner.lock().await;
                guard.sessions = sessions;
                guard.window = Some(window);
                drop(guard);
                let _ = self.events.send(StoreEvent::Reloaded);
                Ok(())
            }
            Err(err) => {
                self.notify(NoticePhase::Error, format!("Failed to load sessions: {err}"));
                Err(err)
            }
        }
    }

    async fn fetch(&self, window: &QueryWindow) -> ServiceResult<Vec<SessionRecord>> {
        match window {
            QueryWindow::Month(month) => self.service.fetch_by_month(month).await,
            QueryWindow::Unpaid => self.service.fetch_unpaid().await,
        }
    }

    /// Refetches the active window to converge with server truth. Called on
    /// stale-list signals, version conflicts, and failed reschedules; the old
    /// list is kept if the refetch itself fails.
    async fn reload(&self) {
        let window = { self.inner.lock().await.window.clone() };
        let Some(window) = window else {
            return;
        };
        match self.fetch(&window).await {
            Ok(sessions) => {
                self.inner.lock().await.sessions = sessions;
                let _ = self.events.send(StoreEvent::Reloaded);
            }
            Err(err) => {
                error!("reload of canonical session list failed: {err}");
                self.notify(
                    NoticePhase::Error,
                    format!("Failed to re-synchronize sessions: {err}"),
                );
            }
        }
    }

    /// Replaces the session with the same id in place, preserving list order.
    /// An unknown id means the list is stale (another window, another page);
    /// that triggers a full reload instead of inserting blindly and is never
    /// surfaced as a user-facing error.
    pub async fn apply_local_update(&self, updated: SessionRecord) {
        let replaced = {
            let mut guard = self.inner.lock().await;
            match guard.sessions.iter_mut().find(|s| s.id == updated.id) {
                Some(slot) => {
                    *slot = updated.clone();
                    true
                }
                None => false,
            }
        };

        if replaced {
            let _ = self.events.send(StoreEvent::SessionUpdated(updated));
        } else {
            warn!(
                session_id = updated.id.0,
                "update references a session outside the canonical list; reloading"
            );
            self.reload().await;
        }
    }

    /// Immediate removal, used only after a server-confirmed delete.
    pub async fn remove(&self, id: SessionId) {
        let removed = {
            let mut guard = self.inner.lock().await;
            let before = guard.sessions.len();
            guard.sessions.retain(|s| s.id != id);
            guard.sessions.len() != before
        };
        if removed {
            let _ = self.events.send(StoreEvent::SessionRemoved(id));
        }
    }

    // ---- mutation gateway --------------------------------------------------

    fn notify(&self, phase: NoticePhase, message: impl Into<String>) {
        let _ = self.events.send(StoreEvent::Notice(Notice {
            phase,
            message: message.into(),
        }));
    }

    /// Marks `id` pending, or reports why it cannot be mutated right now.
    /// Returns the current snapshot whose `version` the service call must
    /// carry.
    async fn begin_pending(&self, id: SessionId) -> Result<SessionRecord, MutationOutcome> {
        let mut guard = self.inner.lock().await;
        if guard.pending.contains(&id) {
            // Dropped, not queued: a stale intent must not be applied against
            // a version the user no longer sees.
            info!(session_id = id.0, "mutation dropped, session already pending");
            return Err(MutationOutcome::Skipped);
        }
        let Some(snapshot) = guard.sessions.iter().find(|s| s.id == id).cloned() else {
            drop(guard);
            let message = format!("Session {} is not in the current view", id.0);
            self.notify(NoticePhase::Error, &message);
            return Err(MutationOutcome::Failed(message));
        };
        guard.pending.insert(id);
        Ok(snapshot)
    }

    async fn end_pending(&self, id: SessionId) {
        self.inner.lock().await.pending.remove(&id);
    }

    /// The single gateway every version-carrying mutation goes through:
    /// pending guard, loading notice, service call with the current version,
    /// echo application on success, conflict-aware recovery on failure. No
    /// call site can bypass the guard or the reload-on-conflict policy.
    async fn run_versioned<F, Fut, S>(
        &self,
        id: SessionId,
        loading: &str,
        success: S,
        reload_on_failure: bool,
        op: F,
    ) -> MutationOutcome
    where
        F: FnOnce(Arc<dyn SessionService>, SessionRecord) -> Fut,
        Fut: Future<Output = ServiceResult<SessionRecord>>,
        S: FnOnce(&SessionRecord) -> String,
    {
        let snapshot = match self.begin_pending(id).await {
            Ok(snapshot) => snapshot,
            Err(outcome) => return outcome,
        };

        self.notify(NoticePhase::Loading, loading);
        let result = op(Arc::clone(&self.service), snapshot).await;

        match result {
            Ok(record) => {
                // Echo first, then clear pending: a mutation admitted in
                // between must snapshot the new version, not the stale one.
                self.apply_local_update(record.clone()).await;
                self.end_pending(id).await;
                self.notify(NoticePhase::Success, success(&record));
                MutationOutcome::Applied(record)
            }
            Err(err) if err.is_conflict() => {
                self.end_pending(id).await;
                warn!(session_id = id.0, "version conflict, re-synchronizing");
                self.reload().await;
                let message = "Action failed: the session changed elsewhere; re-synchronized with the server".to_string();
                self.notify(NoticePhase::Error, &message);
                MutationOutcome::Failed(message)
            }
            Err(err) => {
                self.end_pending(id).await;
                if reload_on_failure {
                    self.reload().await;
                }
                let message = err.to_string();
                error!(session_id = id.0, "mutation failed: {message}");
                self.notify(NoticePhase::Error, &message);
                MutationOutcome::Failed(message)
            }
        }
    }

    // ---- mutation entry points ---------------------------------------------

    pub async fn create_session(&self, request: CreateSessionRequest) -> MutationOutcome {
        self.notify(NoticePhase::Loading, "Adding session…");
        match self.service.create(request).await {
            Ok(created) => {
                // The fresh row may or may not belong to the current window;
                // refetch rather than insert blindly.
                self.reload().await;
                self.notify(NoticePhase::Success, "Session added");
                MutationOutcome::Applied(created)
            }
            Err(err) => {
                let message = format!("Failed to add session: {err}");
                self.notify(NoticePhase::Error, &message);
                MutationOutcome::Failed(message)
            }
        }
    }

    /// Edit-form save. The patch must carry the version the form was opened
    /// with; the gateway still guards and recovers like any other mutation.
    pub async fn update_session(&self, id: SessionId, patch: SessionPatch) -> MutationOutcome {
        self.run_versioned(
            id,
            "Saving session…",
            |_| "Session saved".to_string(),
            false,
            move |service, _snapshot| async move { service.update(id, patch).await },
        )
        .await
    }

    pub async fn delete_session(&self, id: SessionId) -> MutationOutcome {
        if let Err(outcome) = self.begin_pending(id).await {
            return outcome;
        }
        self.notify(NoticePhase::Loading, "Deleting session…");
        let result = self.service.delete(id).await;
        self.end_pending(id).await;

        match result {
            Ok(()) => {
                self.remove(id).await;
                self.notify(NoticePhase::Success, "Session deleted");
                MutationOutcome::Removed(id)
            }
            Err(err) => {
                let message = format!("Failed to delete session: {err}");
                self.notify(NoticePhase::Error, &message);
                MutationOutcome::Failed(message)
            }
        }
    }

    pub async fn delete_month(&self, month: &str) -> MutationOutcome {
        self.notify(
            NoticePhase::Loading,
            format!("Deleting all sessions for {month}…"),
        );
        match self.service.delete_by_month(month).await {
            Ok(()) => {
                self.reload().await;
                self.notify(
                    NoticePhase::Success,
                    format!("Deleted all sessions for {month}"),
                );
                MutationOutcome::Reloaded
            }
            Err(err) => {
                let message = format!("Failed to delete sessions: {err}");
                self.notify(NoticePhase::Error, &message);
                MutationOutcome::Failed(message)
            }
        }
    }

    /// Server-side clone. The echoed record has a new id the canonical list
    /// has never seen, so applying it lands on the stale-list path and pulls
    /// a fresh window.
    pub async fn duplicate_session(&self, id: SessionId) -> MutationOutcome {
        self.run_versioned(
            id,
            "Duplicating session…",
            |_| "Session duplicated".to_string(),
            false,
            move |service, _snapshot| async move { service.duplicate(id).await },
        )
        .await
    }

    /// Context-menu status change, including cancel and restore-to-scheduled.
    pub async fn set_status(&self, id: SessionId, status: LessonStatus) -> MutationOutcome {
        self.run_versioned(
            id,
            "Updating status…",
            move |record| format!("Status changed to {}", record.status.as_wire()),
            false,
            move |service, snapshot| async move {
                service.set_status(id, status, snapshot.version).await
            },
        )
        .await
    }

    pub async fn toggle_payment(&self, id: SessionId) -> MutationOutcome {
        self.run_versioned(
            id,
            "Updating payment status…",
            |record| {
                if record.paid {
                    "Payment confirmed".to_string()
                } else {
                    "Payment unconfirmed".to_string()
                }
            },
            false,
            move |service, snapshot| async move {
                service.toggle_payment(id, snapshot.version).await
            },
        )
        .await
    }

    pub async fn toggle_completed(&self, id: SessionId) -> MutationOutcome {
        self.run_versioned(
            id,
            "Updating session status…",
            |record| {
                if record.completed {
                    "Marked as taught".to_string()
                } else {
                    "Unmarked as taught".to_string()
                }
            },
            false,
            move |service, snapshot| async move {
                service.toggle_completed(id, snapshot.version).await
            },
        )
        .await
    }

    /// Drag-and-drop move. Same-day drops are no-ops; any failure forces a
    /// reconciling reload, because the gesture already placed the session in
    /// a new day bucket optimistically and only server truth can settle it.
    pub async fn reschedule(&self, id: SessionId, target: NaiveDate) -> MutationOutcome {
        let Some(current) = self.session(id).await else {
            let message = format!("Session {} is not in the current view", id.0);
            self.notify(NoticePhase::Error, &message);
            return MutationOutcome::Failed(message);
        };
        if RescheduleRequest::new(&current, target).is_none() {
            return MutationOutcome::Skipped;
        }

        self.run_versioned(
            id,
            "Moving session…",
            move |record| format!("Session moved to {}", record.session_date),
            true,
            move |service, snapshot| async move {
                // Rebuilt from the guarded snapshot so the version is current.
                match RescheduleRequest::new(&snapshot, target) {
                    Some(request) => service.update(snapshot.id, request.patch()).await,
                    None => Ok(snapshot),
                }
            },
        )
        .await
    }

    /// Server-rendered export of one month's sessions, surfaced with the same
    /// three-phase notices as mutations.
    pub async fn export_month(&self, month: &str) -> Result<Vec<u8>, ServiceError> {
        self.notify(
            NoticePhase::Loading,
            format!("Preparing export for {month}…"),
        );
        match self.service.export_month(month).await {
            Ok(bytes) => {
                self.notify(NoticePhase::Success, format!("Export for {month} ready"));
                Ok(bytes)
            }
            Err(err) => {
                self.notify(NoticePhase::Error, format!("Export failed: {err}"));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
