//! Dialogue orchestration: turns one inbound event into a store mutation
//! and/or a rendered view.

use std::sync::Mutex;

use crate::conversation::{Capture, ConversationTracker, Stage};
use crate::models::*;
use crate::store::{NoteStore, StoreError};
use crate::view;

/// The note bot. Adapters call [`NoteBot::handle_event`] for every event they
/// receive and render whatever comes back.
///
/// Events are handled one at a time: `dispatch` is held for the whole of
/// `handle_event`, so a user's conversation state and the store's
/// read-modify-write cycles are never observed half-way by another event.
pub struct NoteBot {
    store: NoteStore,
    conversations: ConversationTracker,
    dispatch: Mutex<()>,
}

impl NoteBot {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store,
            conversations: ConversationTracker::new(),
            dispatch: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn stage(&self, user_id: UserId) -> Stage {
        self.conversations.stage(user_id)
    }

    /// Handle one event for `user_id`.
    ///
    /// Returns `Ok(None)` when the event means nothing in the current state.
    /// A store failure is returned as-is; the adapter must not report the
    /// triggering action as successful.
    pub fn handle_event(
        &self,
        user_id: UserId,
        event: &InboundEvent,
    ) -> Result<Option<OutboundAction>, StoreError> {
        let _guard = self.dispatch.lock().expect("dispatch lock poisoned");
        tracing::debug!(user_id, ?event, "Handling event");

        match event {
            InboundEvent::Started => Ok(Some(view::welcome())),
            InboundEvent::Command(command) => match MenuAction::from_command(command) {
                Some(action) => self.menu(user_id, action).map(Some),
                None => Ok(None),
            },
            InboundEvent::Callback(raw) => match Payload::parse(raw) {
                Some(Payload::Menu(action)) => self.menu(user_id, action).map(Some),
                Some(Payload::Note { action, id }) => self.note(user_id, action, id).map(Some),
                Some(Payload::Page { list, page }) => self.list(user_id, list, page).map(Some),
                None => {
                    tracing::debug!("Ignoring unknown payload {:?}", raw);
                    Ok(None)
                }
            },
            InboundEvent::Text(text) => self.text(user_id, text),
        }
    }

    fn menu(&self, user_id: UserId, action: MenuAction) -> Result<OutboundAction, StoreError> {
        match action {
            MenuAction::MainMenu => Ok(view::main_menu()),
            MenuAction::NewNote => {
                self.conversations.begin(user_id);
                Ok(view::prompt_title())
            }
            MenuAction::ListNotes => self.list(user_id, ListKind::All, 0),
            MenuAction::CompletedNotes => self.list(user_id, ListKind::Completed, 0),
            MenuAction::DeleteAll => {
                self.store.clear(user_id)?;
                tracing::info!("Cleared all notes for user {}", user_id);
                Ok(view::all_deleted())
            }
            MenuAction::Settings => {
                let notes = self.store.get_all(user_id)?;
                Ok(view::settings(&notes, self.store.id_strategy()))
            }
            MenuAction::Cancel => {
                if self.conversations.cancel(user_id) {
                    Ok(view::capture_cancelled())
                } else {
                    Ok(view::main_menu())
                }
            }
        }
    }

    fn list(
        &self,
        user_id: UserId,
        list: ListKind,
        page: usize,
    ) -> Result<OutboundAction, StoreError> {
        let mut notes = self.store.get_all(user_id)?;
        if list == ListKind::Completed {
            notes.retain(|n| n.completed);
        }
        Ok(view::note_list(&notes, list, page))
    }

    fn note(
        &self,
        user_id: UserId,
        action: NoteAction,
        id: u32,
    ) -> Result<OutboundAction, StoreError> {
        match action {
            NoteAction::View => self.show_note(user_id, id),
            NoteAction::Complete => {
                self.store
                    .update(user_id, id, &UpdateNoteInput::completed())?;
                self.show_note(user_id, id)
            }
            NoteAction::Delete => {
                let removed = self.store.delete(user_id, id)?;
                let list = self.list(user_id, ListKind::All, 0)?;
                if removed == 0 {
                    return Ok(list);
                }
                Ok(view::with_notice("🗑 Note deleted", list))
            }
        }
    }

    /// Detail view of the first note with `id`, or the list if it is gone.
    fn show_note(&self, user_id: UserId, id: u32) -> Result<OutboundAction, StoreError> {
        let notes = self.store.get_all(user_id)?;
        match notes.iter().find(|n| n.id == id) {
            Some(note) => Ok(view::note_detail(note)),
            None => Ok(view::note_list(&notes, ListKind::All, 0)),
        }
    }

    fn text(&self, user_id: UserId, text: &str) -> Result<Option<OutboundAction>, StoreError> {
        match self.conversations.submit_text(user_id, text) {
            Capture::Ignored => Ok(None),
            Capture::BlankTitle => Ok(Some(view::prompt_title_again())),
            Capture::TitleAccepted => Ok(Some(view::prompt_content(text.trim()))),
            Capture::Ready(input) => {
                // Stay in awaiting_content if this fails so the next message retries.
                let note = self.store.create(user_id, input)?;
                self.conversations.complete(user_id);
                Ok(Some(view::note_saved(&note)))
            }
        }
    }
}
