//! HTTP client for the Max Bot API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::*;
use crate::models::OutboundAction;

/// Update kinds the bot subscribes to.
const UPDATE_TYPES: &str = "bot_started,message_created,message_callback";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: BOT_TOKEN was rejected")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone)]
pub struct MaxClient {
    base_url: String,
    token: String,
    client: Client,
}

impl MaxClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client: Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header("Authorization", self.token.as_str())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited),
                _ => Err(ClientError::Api(format!("{}: {}", status, body))),
            }
        }
    }

    /// Long-poll for updates after `marker`.
    pub async fn get_updates(
        &self,
        marker: Option<i64>,
        timeout_secs: u64,
    ) -> Result<UpdateList, ClientError> {
        let mut query = vec![
            ("timeout", timeout_secs.to_string()),
            ("types", UPDATE_TYPES.to_string()),
        ];
        if let Some(marker) = marker {
            query.push(("marker", marker.to_string()));
        }

        let response = self
            .request(reqwest::Method::GET, "/updates")
            .query(&query)
            // Give the server its full poll window before giving up locally.
            .timeout(Duration::from_secs(timeout_secs + 10))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        action: &OutboundAction,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/messages")
            .query(&[("chat_id", chat_id)])
            .json(&NewMessageBody::from(action))
            .send()
            .await?;
        self.handle_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Answer a button press by replacing the message it was attached to.
    pub async fn answer_callback(
        &self,
        callback_id: &str,
        action: &OutboundAction,
    ) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/answers")
            .query(&[("callback_id", callback_id)])
            .json(&CallbackAnswer {
                message: NewMessageBody::from(action),
            })
            .send()
            .await?;
        self.handle_response::<serde_json::Value>(response).await?;
        Ok(())
    }
}
