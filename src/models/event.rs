use serde::{Deserialize, Serialize};

/// Platform-issued user identifier. Opaque to the bot.
pub type UserId = i64;

/// An event delivered by the chat platform adapter on behalf of one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InboundEvent {
    /// The user opened a chat with the bot for the first time.
    Started,
    /// A slash command, without the leading `/` and without arguments.
    Command(String),
    /// A button press carrying its raw payload string.
    Callback(String),
    /// A free-text message.
    Text(String),
}

/// Static menu actions carried by fixed-payload buttons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    MainMenu,
    NewNote,
    ListNotes,
    CompletedNotes,
    DeleteAll,
    Settings,
    Cancel,
}

impl MenuAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainMenu => "main_menu",
            Self::NewNote => "new_note",
            Self::ListNotes => "list_notes",
            Self::CompletedNotes => "completed_notes",
            Self::DeleteAll => "delete_all",
            Self::Settings => "settings",
            Self::Cancel => "cancel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "main_menu" => Some(Self::MainMenu),
            "new_note" => Some(Self::NewNote),
            "list_notes" => Some(Self::ListNotes),
            "completed_notes" => Some(Self::CompletedNotes),
            "delete_all" => Some(Self::DeleteAll),
            "settings" => Some(Self::Settings),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    /// Map a slash command onto the menu action it is a shortcut for.
    pub fn from_command(command: &str) -> Option<Self> {
        match command {
            "start" | "menu" | "help" => Some(Self::MainMenu),
            "new" => Some(Self::NewNote),
            "list" => Some(Self::ListNotes),
            "done" => Some(Self::CompletedNotes),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Actions on a single note, carried by structured payloads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteAction {
    View,
    Complete,
    Delete,
}

impl NoteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Complete => "done",
            Self::Delete => "del",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Self::View),
            "done" => Some(Self::Complete),
            "del" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Which slice of a user's notes a list view shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    All,
    Completed,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A decoded button payload.
///
/// Fixed payloads are bare names (`list_notes`). Structured payloads are
/// colon-separated: `note:<action>:<id>` and `page:<list>:<page>`. They stay
/// short enough for platforms that cap callback data length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Menu(MenuAction),
    Note { action: NoteAction, id: u32 },
    Page { list: ListKind, page: usize },
}

impl Payload {
    pub fn encode(&self) -> String {
        match self {
            Self::Menu(action) => action.as_str().to_string(),
            Self::Note { action, id } => format!("note:{}:{}", action.as_str(), id),
            Self::Page { list, page } => format!("page:{}:{}", list.as_str(), page),
        }
    }

    /// Decode a raw payload. Returns `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(action) = MenuAction::from_str(raw) {
            return Some(Self::Menu(action));
        }

        let mut parts = raw.splitn(3, ':');
        let (kind, name, param) = (parts.next()?, parts.next()?, parts.next()?);
        match kind {
            "note" => Some(Self::Note {
                action: NoteAction::from_str(name)?,
                id: param.parse().ok()?,
            }),
            "page" => Some(Self::Page {
                list: ListKind::from_str(name)?,
                page: param.parse().ok()?,
            }),
            _ => None,
        }
    }
}
