use shared::domain::SessionRecord;

use crate::StoreEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalMode {
    #[default]
    View,
    Edit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuAnchor {
    pub x: f64,
    pub y: f64,
    pub session: SessionRecord,
}

/// Secondary UI state: which day/session is selected, which modal is open,
/// where the context menu sits. Observes store events but never owns session
/// data; day content is always re-derived from the canonical list, so only
/// the day key is held here.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub selected_day: Option<String>,
    pub selected_session: Option<SessionRecord>,
    pub modal_mode: ModalMode,
    pub context_menu: Option<ContextMenuAnchor>,
    pub add_session_date: Option<String>,
}

impl InteractionState {
    pub fn select_day(&mut self, date_str: impl Into<String>) {
        self.selected_day = Some(date_str.into());
    }

    pub fn view_session(&mut self, session: SessionRecord) {
        self.modal_mode = ModalMode::View;
        self.selected_session = Some(session);
    }

    pub fn edit_session(&mut self, session: SessionRecord) {
        self.modal_mode = ModalMode::Edit;
        self.selected_session = Some(session);
    }

    pub fn open_context_menu(&mut self, x: f64, y: f64, session: SessionRecord) {
        self.context_menu = Some(ContextMenuAnchor { x, y, session });
    }

    pub fn open_add_session(&mut self, date_str: impl Into<String>) {
        self.add_session_date = Some(date_str.into());
    }

    pub fn close_modals(&mut self) {
        self.selected_session = None;
        self.context_menu = None;
        self.add_session_date = None;
        self.modal_mode = ModalMode::View;
    }

    /// Keeps held session snapshots in step with the canonical list. Updates
    /// refresh them in place, removals and full reloads drop anything that
    /// may now be stale.
    pub fn observe(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::SessionUpdated(updated) => {
                if self.selected_session.as_ref().map(|s| s.id) == Some(updated.id) {
                    self.selected_session = Some(updated.clone());
                }
                if let Some(menu) = self.context_menu.as_mut() {
                    if menu.session.id == updated.id {
                        menu.session = updated.clone();
                    }
                }
            }
            StoreEvent::SessionRemoved(id) => {
                if self.selected_session.as_ref().map(|s| s.id) == Some(*id) {
                    self.selected_session = None;
                }
                if self.context_menu.as_ref().map(|m| m.session.id) == Some(*id) {
                    self.context_menu = None;
                }
            }
            StoreEvent::Reloaded => {
                // Snapshots taken before the reload may no longer exist.
                self.context_menu = None;
            }
            StoreEvent::Notice(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/interaction_tests.rs"]
mod tests;
