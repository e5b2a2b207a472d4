// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram operator channel for Pressroom.
//!
//! Implements [`OperatorChannel`] for the Telegram Bot API via teloxide:
//! long polling for operator messages, MarkdownV2 suggestions with a plain
//! text fallback, and photo attachments.

pub mod handler;
pub mod markdown;
pub mod media;
pub mod render;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use pressroom_config::model::TelegramConfig;
use pressroom_core::{
    AdapterType, CommandReply, HealthStatus, InboundCommand, OperatorChannel, PluginAdapter,
    PressroomError, PublicationSummary,
};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::handler::Inbound;
use crate::markdown::{MAX_MESSAGE_CHARS, escape_markdown_v2, split_message};
use crate::render::Rendered;

/// Plain text is split below the hard limit to leave room for escaping.
const SPLIT_CHARS: usize = MAX_MESSAGE_CHARS / 2;

/// Telegram operator channel.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundCommand>>,
    inbound_tx: mpsc::Sender<InboundCommand>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, PressroomError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            PressroomError::Config("telegram.bot_token is required for the operator channel".into())
        })?;
        if token.is_empty() {
            return Err(PressroomError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);
        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Send one logical message, split as needed, MarkdownV2 first with a
    /// plain text fallback per part.
    async fn send_rendered(&self, chat_id: ChatId, rendered: &Rendered) -> Result<(), String> {
        let parts = split_message(&rendered.plain, SPLIT_CHARS);
        if parts.len() == 1 {
            return self
                .send_part(chat_id, &rendered.markdown, &rendered.plain)
                .await;
        }
        // Long posts lose the header formatting; each part is escaped alone.
        for part in parts {
            self.send_part(chat_id, &escape_markdown_v2(&part), &part)
                .await?;
        }
        Ok(())
    }

    async fn send_part(&self, chat_id: ChatId, markdown: &str, plain: &str) -> Result<(), String> {
        match self
            .bot
            .send_message(chat_id, markdown)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "MarkdownV2 failed, sending as plain text");
                self.bot
                    .send_message(chat_id, plain)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
        }
    }

    async fn send_summary(
        &self,
        chat_id: ChatId,
        summary: &PublicationSummary,
    ) -> Result<(), String> {
        self.send_rendered(chat_id, &render::summary(summary))
            .await?;
        if let Some(image) = &summary.image {
            self.bot
                .send_photo(chat_id, InputFile::memory(image.clone()))
                .await
                .map_err(|e| format!("failed to send image: {e}"))?;
        }
        Ok(())
    }
}

/// The operator identity is a user id; in a private chat it is also the chat id.
fn chat_id(recipient: &str) -> Result<ChatId, PressroomError> {
    recipient
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| PressroomError::Channel {
            message: format!("invalid chat id {recipient:?}: {e}"),
            source: None,
        })
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl OperatorChannel for TelegramChannel {
    async fn connect(&mut self) -> Result<(), PressroomError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();
        let allowed_users: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());
        let downloads_dir = Arc::new(PathBuf::from(&self.config.downloads_dir));

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let tx = tx.clone();
                let allowed = allowed_users.clone();
                let downloads_dir = downloads_dir.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    if !handler::is_authorized(&msg, &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
                        return respond(());
                    }
                    let Some(sender) = handler::sender_id(&msg) else {
                        return respond(());
                    };

                    match handler::extract_inbound(&bot, &msg, &downloads_dir).await {
                        Ok(Some(Inbound::Command(command))) => {
                            if tx.send(InboundCommand { sender, command }).await.is_err() {
                                warn!("inbound channel closed, dropping command");
                            }
                        }
                        Ok(Some(Inbound::Answer(text))) => {
                            if let Err(e) = bot.send_message(msg.chat.id, text).await {
                                warn!(error = %e, "failed to answer message");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            error!(error = %e, "failed to read operator message");
                            let _ = bot
                                .send_message(msg.chat.id, "Could not read that message, try again.")
                                .await;
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn deliver(
        &self,
        recipient: &str,
        summary: &PublicationSummary,
    ) -> Result<(), PressroomError> {
        let chat = chat_id(recipient).map_err(|e| PressroomError::DeliveryFailure {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        self.send_summary(chat, summary)
            .await
            .map_err(|message| PressroomError::DeliveryFailure {
                message,
                source: None,
            })
    }

    async fn reply(&self, recipient: &str, reply: &CommandReply) -> Result<(), PressroomError> {
        let chat = chat_id(recipient)?;
        let sent = match reply {
            CommandReply::Summary(summary) => self.send_summary(chat, summary).await,
            other => self.send_rendered(chat, &render::reply(other)).await,
        };
        sent.map_err(|message| PressroomError::Channel {
            message,
            source: None,
        })
    }

    async fn receive(&self) -> Result<InboundCommand, PressroomError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| PressroomError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_core::Command;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
            ..TelegramConfig::default()
        }
    }

    #[test]
    fn new_requires_a_non_empty_token() {
        assert!(TelegramChannel::new(config(None)).is_err());
        assert!(TelegramChannel::new(config(Some(""))).is_err());
        assert!(TelegramChannel::new(config(Some("123456:ABC-DEF1234ghIkl"))).is_ok());
    }

    #[test]
    fn chat_id_parses_user_ids() {
        assert_eq!(chat_id("12345").unwrap(), ChatId(12345));
        let err = chat_id("operator").unwrap_err();
        assert_eq!(err.code(), "channel");
    }

    #[tokio::test]
    async fn delivery_to_a_bad_recipient_is_a_delivery_failure() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        let summary = PublicationSummary {
            id: pressroom_core::PublicationId::from("p"),
            position: 0,
            total: 1,
            title: None,
            content: "post".into(),
            source_type: pressroom_core::SourceKind::Manual,
            link: None,
            image: None,
        };
        let err = channel.deliver("not-a-chat", &summary).await.unwrap_err();
        assert_eq!(err.code(), "delivery_failed");
    }

    #[tokio::test]
    async fn receive_yields_queued_commands() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        channel
            .inbound_tx
            .send(InboundCommand {
                sender: "42".into(),
                command: Command::List,
            })
            .await
            .unwrap();
        let inbound = channel.receive().await.unwrap();
        assert_eq!(inbound.sender, "42");
        assert_eq!(inbound.command, Command::List);
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
