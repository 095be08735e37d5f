//! Per-user capture dialogue: idle → awaiting title → awaiting content → idle.
//!
//! State lives for the lifetime of the process only. A user with no entry is
//! idle; the entry is created when a capture starts and removed when the
//! captured note has been persisted or the capture is cancelled.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::models::{NewNote, UserId};

/// Where a user is in the capture dialogue. The pending title travels with
/// `AwaitingContent`, so a note can never be finalized without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    AwaitingTitle,
    AwaitingContent { title: String },
}

/// Stage tag for inspection and logging.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    AwaitingTitle,
    AwaitingContent,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingTitle => "awaiting_title",
            Self::AwaitingContent => "awaiting_content",
        }
    }
}

/// Outcome of feeding free text into the dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// No capture in progress; the text means nothing.
    Ignored,
    /// Title was blank; still waiting for one.
    BlankTitle,
    /// Title stored, now waiting for content.
    TitleAccepted,
    /// Both fields collected. The dialogue stays in `AwaitingContent` until
    /// [`ConversationTracker::complete`] is called.
    Ready(NewNote),
}

#[derive(Default)]
pub struct ConversationTracker {
    states: Mutex<HashMap<UserId, Conversation>>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn states(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Conversation>> {
        self.states.lock().expect("conversation lock poisoned")
    }

    pub fn stage(&self, user_id: UserId) -> Stage {
        match self.states().get(&user_id) {
            None => Stage::Idle,
            Some(Conversation::AwaitingTitle) => Stage::AwaitingTitle,
            Some(Conversation::AwaitingContent { .. }) => Stage::AwaitingContent,
        }
    }

    /// Start capturing a new note, discarding any half-finished one.
    pub fn begin(&self, user_id: UserId) {
        self.states().insert(user_id, Conversation::AwaitingTitle);
        tracing::debug!("User {} is now {}", user_id, Stage::AwaitingTitle.as_str());
    }

    pub fn submit_text(&self, user_id: UserId, text: &str) -> Capture {
        let mut states = self.states();
        let Some(state) = states.get_mut(&user_id) else {
            return Capture::Ignored;
        };

        match state {
            Conversation::AwaitingTitle => {
                let title = text.trim();
                if title.is_empty() {
                    return Capture::BlankTitle;
                }
                *state = Conversation::AwaitingContent {
                    title: title.to_string(),
                };
                tracing::debug!("User {} is now {}", user_id, Stage::AwaitingContent.as_str());
                Capture::TitleAccepted
            }
            Conversation::AwaitingContent { title } => Capture::Ready(NewNote {
                title: title.clone(),
                content: text.to_string(),
            }),
        }
    }

    /// Finish the dialogue once the captured note is safely stored.
    pub fn complete(&self, user_id: UserId) {
        self.states().remove(&user_id);
        tracing::debug!("User {} is now {}", user_id, Stage::Idle.as_str());
    }

    /// Abandon an active capture. Returns whether one was in progress.
    pub fn cancel(&self, user_id: UserId) -> bool {
        self.states().remove(&user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_while_idle_is_ignored() {
        let tracker = ConversationTracker::new();
        assert_eq!(tracker.submit_text(1, "hello"), Capture::Ignored);
        assert_eq!(tracker.stage(1), Stage::Idle);
    }

    #[test]
    fn walks_title_then_content() {
        let tracker = ConversationTracker::new();
        tracker.begin(1);
        assert_eq!(tracker.stage(1), Stage::AwaitingTitle);

        assert_eq!(tracker.submit_text(1, "  Buy milk "), Capture::TitleAccepted);
        assert_eq!(tracker.stage(1), Stage::AwaitingContent);

        assert_eq!(
            tracker.submit_text(1, "2% milk, 1 gal"),
            Capture::Ready(NewNote {
                title: "Buy milk".to_string(),
                content: "2% milk, 1 gal".to_string(),
            })
        );
        // Not idle until the note is stored.
        assert_eq!(tracker.stage(1), Stage::AwaitingContent);

        tracker.complete(1);
        assert_eq!(tracker.stage(1), Stage::Idle);
    }

    #[test]
    fn blank_title_keeps_waiting() {
        let tracker = ConversationTracker::new();
        tracker.begin(1);
        assert_eq!(tracker.submit_text(1, "   "), Capture::BlankTitle);
        assert_eq!(tracker.stage(1), Stage::AwaitingTitle);
    }

    #[test]
    fn empty_content_is_allowed() {
        let tracker = ConversationTracker::new();
        tracker.begin(1);
        tracker.submit_text(1, "Title");
        assert!(matches!(tracker.submit_text(1, ""), Capture::Ready(n) if n.content.is_empty()));
    }

    #[test]
    fn users_are_tracked_independently() {
        let tracker = ConversationTracker::new();
        tracker.begin(1);
        tracker.submit_text(1, "Title");

        assert_eq!(tracker.stage(1), Stage::AwaitingContent);
        assert_eq!(tracker.stage(2), Stage::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let tracker = ConversationTracker::new();
        tracker.begin(1);
        assert!(tracker.cancel(1));
        assert_eq!(tracker.stage(1), Stage::Idle);
        assert!(!tracker.cancel(1));
    }
}
