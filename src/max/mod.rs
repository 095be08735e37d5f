//! Max messenger adapter: long-polls the Bot API, feeds events to the
//! [`NoteBot`] and delivers its replies.

mod client;
mod types;

use std::sync::Arc;
use std::time::Duration;

pub use client::*;
pub use types::*;

use crate::bot::NoteBot;
use crate::models::{InboundEvent, UserId};

/// Pause after a failed poll before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Where the reply to an event goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Post a new message to the chat.
    Chat(i64),
    /// Replace the message whose button was pressed.
    Callback(String),
}

/// An update reduced to what the bot needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub user_id: UserId,
    pub event: InboundEvent,
    pub reply: ReplyTarget,
}

/// Map a platform update onto a bot event. Updates the bot has no use for
/// (non-text messages, payload-less callbacks, unknown kinds) yield `None`.
pub fn route(update: Update) -> Option<Routed> {
    match update {
        Update::BotStarted { chat_id, user } => Some(Routed {
            user_id: user.user_id,
            event: InboundEvent::Started,
            reply: ReplyTarget::Chat(chat_id),
        }),
        Update::MessageCreated { message } => {
            let user_id = message.sender?.user_id;
            let chat_id = message.recipient.chat_id?;
            let text = message.body.text?;
            Some(Routed {
                user_id,
                event: parse_text(text),
                reply: ReplyTarget::Chat(chat_id),
            })
        }
        Update::MessageCallback { callback, .. } => Some(Routed {
            user_id: callback.user.user_id,
            event: InboundEvent::Callback(callback.payload?),
            reply: ReplyTarget::Callback(callback.callback_id),
        }),
        Update::Unsupported => None,
    }
}

/// Decode each update of a batch on its own. Malformed ones are logged and
/// dropped so they cannot hold back the rest of the batch or the marker.
pub fn decode_updates(raw: Vec<serde_json::Value>) -> Vec<Update> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Update>(value) {
            Ok(update) => Some(update),
            Err(e) => {
                tracing::warn!("Skipping malformed update: {}", e);
                None
            }
        })
        .collect()
}

/// `/cmd@bot args` becomes `Command("cmd")`; anything else is free text.
fn parse_text(text: String) -> InboundEvent {
    let Some(rest) = text.strip_prefix('/') else {
        return InboundEvent::Text(text);
    };
    let word = rest.split_whitespace().next().unwrap_or_default();
    let name = word.split('@').next().unwrap_or_default();
    if name.is_empty() {
        return InboundEvent::Text(text);
    }
    InboundEvent::Command(name.to_lowercase())
}

/// Poll for updates until Ctrl-C. Events are handled strictly one after
/// another, in the order the platform delivers them.
pub async fn run_polling(
    bot: Arc<NoteBot>,
    client: MaxClient,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let mut marker = None;
    tracing::info!("Polling Max Bot API for updates");

    loop {
        let polled = tokio::select! {
            result = client.get_updates(marker, timeout_secs) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, stopping");
                return Ok(());
            }
        };

        match polled {
            Ok(list) => {
                if list.marker.is_some() {
                    marker = list.marker;
                }
                for update in decode_updates(list.updates) {
                    dispatch(&bot, &client, update).await;
                }
            }
            Err(ClientError::Unauthorized) => {
                anyhow::bail!("Max Bot API rejected BOT_TOKEN");
            }
            Err(e) => {
                tracing::warn!("Polling failed, retrying in {:?}: {}", RETRY_DELAY, e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

async fn dispatch(bot: &NoteBot, client: &MaxClient, update: Update) {
    let Some(routed) = route(update) else {
        return;
    };

    let action = match bot.handle_event(routed.user_id, &routed.event) {
        Ok(Some(action)) => action,
        Ok(None) => return,
        Err(e) => {
            // Nothing is sent: the user must not see a failed save as a success.
            tracing::error!(user_id = routed.user_id, "Failed to handle event: {}", e);
            return;
        }
    };

    let delivered = match &routed.reply {
        ReplyTarget::Chat(chat_id) => client.send_message(*chat_id, &action).await,
        ReplyTarget::Callback(callback_id) => client.answer_callback(callback_id, &action).await,
    };
    if let Err(e) = delivered {
        tracing::warn!(user_id = routed.user_id, "Failed to deliver reply: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Button, Keyboard, MenuAction, OutboundAction, Payload};

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).expect("valid update")
    }

    #[test]
    fn routes_text_message_to_chat() {
        let update = parse(
            r#"{
                "update_type": "message_created",
                "timestamp": 1700000000000,
                "message": {
                    "sender": {"user_id": 42, "name": "Alex"},
                    "recipient": {"chat_id": 1001, "chat_type": "dialog"},
                    "body": {"mid": "m1", "seq": 1, "text": "Buy milk"}
                }
            }"#,
        );

        assert_eq!(
            route(update),
            Some(Routed {
                user_id: 42,
                event: InboundEvent::Text("Buy milk".to_string()),
                reply: ReplyTarget::Chat(1001),
            })
        );
    }

    #[test]
    fn routes_commands() {
        let update = parse(
            r#"{
                "update_type": "message_created",
                "message": {
                    "sender": {"user_id": 42},
                    "recipient": {"chat_id": 1001},
                    "body": {"text": "/Start@notes_bot now"}
                }
            }"#,
        );
        assert_eq!(
            route(update).map(|r| r.event),
            Some(InboundEvent::Command("start".to_string()))
        );
    }

    #[test]
    fn routes_callback_to_answer() {
        let update = parse(
            r#"{
                "update_type": "message_callback",
                "callback": {
                    "callback_id": "cb-1",
                    "payload": "note:view:3",
                    "user": {"user_id": 42}
                },
                "message": {
                    "recipient": {"chat_id": 1001},
                    "body": {"text": "menu"}
                }
            }"#,
        );

        assert_eq!(
            route(update),
            Some(Routed {
                user_id: 42,
                event: InboundEvent::Callback("note:view:3".to_string()),
                reply: ReplyTarget::Callback("cb-1".to_string()),
            })
        );
    }

    #[test]
    fn routes_bot_started() {
        let update = parse(
            r#"{"update_type": "bot_started", "chat_id": 1001, "user": {"user_id": 42}}"#,
        );
        assert_eq!(route(update).map(|r| r.event), Some(InboundEvent::Started));
    }

    #[test]
    fn skips_messages_without_text() {
        let update = parse(
            r#"{
                "update_type": "message_created",
                "message": {
                    "sender": {"user_id": 42},
                    "recipient": {"chat_id": 1001},
                    "body": {"mid": "m2", "attachments": []}
                }
            }"#,
        );
        assert_eq!(route(update), None);
    }

    #[test]
    fn skips_unknown_update_kinds() {
        let update = parse(r#"{"update_type": "message_edited", "message": {}}"#);
        assert_eq!(route(update), None);
    }

    #[test]
    fn malformed_updates_do_not_spoil_the_batch() {
        let list: UpdateList = serde_json::from_str(
            r#"{
                "updates": [
                    {"update_type": "message_created", "message": {"body": {"text": "no recipient"}}},
                    {"update_type": "bot_started", "user": {"user_id": 7}},
                    {"update_type": "bot_started", "chat_id": 1001, "user": {"user_id": 42}}
                ],
                "marker": 17
            }"#,
        )
        .expect("batch envelope parses");

        assert_eq!(list.marker, Some(17));
        let routed: Vec<Routed> = decode_updates(list.updates)
            .into_iter()
            .filter_map(route)
            .collect();
        assert_eq!(
            routed,
            vec![Routed {
                user_id: 42,
                event: InboundEvent::Started,
                reply: ReplyTarget::Chat(1001),
            }]
        );
    }

    #[test]
    fn keyboard_becomes_inline_keyboard_attachment() {
        let action = OutboundAction::with_keyboard(
            "menu",
            Keyboard::default().row(vec![Button::new(
                "Home",
                Payload::Menu(MenuAction::MainMenu),
            )]),
        );

        let body = serde_json::to_value(NewMessageBody::from(&action)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "text": "menu",
                "attachments": [{
                    "type": "inline_keyboard",
                    "payload": {
                        "buttons": [[{"type": "callback", "text": "Home", "payload": "main_menu"}]]
                    }
                }]
            })
        );
    }

    #[test]
    fn plain_text_has_no_attachments() {
        let body = serde_json::to_value(NewMessageBody::from(&OutboundAction::text("hi"))).unwrap();
        assert_eq!(body, serde_json::json!({"text": "hi", "attachments": []}));
    }
}
