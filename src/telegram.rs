use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::notifier::{DeliveryReport, OfferNotifier};
use crate::subscribers::SubscriberStore;

const API_BASE: &str = "https://api.telegram.org";

/// Minimal Bot API client: enough to broadcast alerts and long-poll for
/// commands.
pub struct TelegramClient {
    client: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    #[serde(default)]
    result: Vec<Update>,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Sends one HTML-formatted message. `Ok(false)` means the chat has
    /// blocked the bot (HTTP 403) and the subscription should be dropped.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<bool> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text, "parse_mode": "HTML" }))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: UpdatesResponse = response.json().await?;
        Ok(body.result)
    }

    /// Registers the command menu shown in the chat UI.
    pub async fn set_my_commands(&self) -> Result<()> {
        let commands = json!([
            { "command": "start", "description": "Subscribe to offer alerts" },
            { "command": "offers", "description": "Show current offers" },
            { "command": "stop", "description": "Unsubscribe" },
            { "command": "help", "description": "Bot usage" },
        ]);
        self.client
            .post(self.method_url("setMyCommands"))
            .json(&json!({ "commands": commands }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Fans an alert out to every subscriber. One refusal never blocks delivery
/// to the rest; a 403 additionally prunes the subscription.
pub struct TelegramNotifier {
    client: Arc<TelegramClient>,
    subscribers: Arc<dyn SubscriberStore>,
}

impl TelegramNotifier {
    pub fn new(client: Arc<TelegramClient>, subscribers: Arc<dyn SubscriberStore>) -> Self {
        Self {
            client,
            subscribers,
        }
    }
}

#[async_trait]
impl OfferNotifier for TelegramNotifier {
    async fn broadcast(&self, text: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let subscribers = match self.subscribers.list().await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Could not load subscriber list: {e}");
                return report;
            }
        };
        if subscribers.is_empty() {
            info!("No subscribers to notify");
            return report;
        }

        info!("Broadcasting alert to {} subscribers", subscribers.len());
        for chat_id in subscribers {
            match self.client.send_message(chat_id, text).await {
                Ok(true) => report.delivered.push(chat_id),
                Ok(false) => {
                    warn!("Chat {chat_id} blocked the bot, dropping subscription");
                    report.blocked.push(chat_id);
                    if let Err(e) = self.subscribers.remove(chat_id).await {
                        warn!("Failed to drop blocked subscriber {chat_id}: {e}");
                    }
                }
                Err(e) => error!("Delivery to {chat_id} failed: {e}"),
            }
        }
        report
    }
}
