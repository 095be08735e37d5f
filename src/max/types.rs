//! Wire types for the subset of the Max Bot API the adapter uses.

use serde::{Deserialize, Serialize};

use crate::models::{Keyboard, OutboundAction};

// ============================================================
// Updates
// ============================================================

#[derive(Debug, Deserialize)]
pub struct UpdateList {
    /// Raw updates, decoded one by one with [`super::decode_updates`].
    #[serde(default)]
    pub updates: Vec<serde_json::Value>,
    /// Pass back on the next poll to acknowledge these updates.
    pub marker: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "update_type", rename_all = "snake_case")]
pub enum Update {
    BotStarted {
        chat_id: i64,
        user: User,
    },
    MessageCreated {
        message: Message,
    },
    MessageCallback {
        callback: Callback,
        #[serde(default)]
        message: Option<Message>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub user_id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub sender: Option<User>,
    pub recipient: Recipient,
    pub body: MessageBody,
}

#[derive(Debug, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Callback {
    pub callback_id: String,
    #[serde(default)]
    pub payload: Option<String>,
    pub user: User,
}

// ============================================================
// Outgoing bodies
// ============================================================

#[derive(Debug, Serialize)]
pub struct NewMessageBody {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    InlineKeyboard { payload: InlineKeyboardPayload },
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardPayload {
    pub buttons: Vec<Vec<CallbackButton>>,
}

#[derive(Debug, Serialize)]
pub struct CallbackButton {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub payload: String,
}

/// Body of `POST /answers`: replaces the message the pressed button was on.
#[derive(Debug, Serialize)]
pub struct CallbackAnswer {
    pub message: NewMessageBody,
}

impl From<&OutboundAction> for NewMessageBody {
    fn from(action: &OutboundAction) -> Self {
        Self {
            text: action.text.clone(),
            attachments: action
                .keyboard
                .as_ref()
                .map(|k| vec![Attachment::from(k)])
                .unwrap_or_default(),
        }
    }
}

impl From<&Keyboard> for Attachment {
    fn from(keyboard: &Keyboard) -> Self {
        Self::InlineKeyboard {
            payload: InlineKeyboardPayload {
                buttons: keyboard
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|b| CallbackButton {
                                kind: "callback",
                                text: b.label.clone(),
                                payload: b.payload.clone(),
                            })
                            .collect()
                    })
                    .collect(),
            },
        }
    }
}
