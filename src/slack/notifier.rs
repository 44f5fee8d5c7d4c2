//! Best-effort chat notification capability.
//!
//! Delivery is modeled as an injected [`Notifier`] trait so stores and
//! jobs hold a capability reference rather than a module-level
//! singleton; tests substitute a recording stub. Failures are advisory:
//! callers log and swallow them, and a failed send never reverts or
//! blocks the state change that triggered it.

use std::future::Future;
use std::pin::Pin;

use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiToken, SlackApiTokenType, SlackApiTokenValue,
    SlackChannelId, SlackClient, SlackClientHyperHttpsConnector, SlackMessageContent,
};
use tracing::debug;

use crate::config::SlackConfig;
use crate::{AppError, Result};

/// Best-effort delivery of a text message to the operational chat
/// channel.
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured channel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the chat transport rejects the
    /// message; callers recover locally and never propagate it.
    fn send(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Slack-backed notifier posting plain messages via `chat.postMessage`.
pub struct SlackNotifier {
    client: SlackClient<SlackClientHyperHttpsConnector>,
    token: SlackApiToken,
    channel: SlackChannelId,
}

impl SlackNotifier {
    /// Build a notifier for the configured channel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unavailable` if the HTTPS connector cannot be
    /// created.
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Unavailable(format!("failed to init slack connector: {err}")))?;
        let token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };

        Ok(Self {
            client: SlackClient::new(connector),
            token,
            channel: SlackChannelId(config.channel_id.clone()),
        })
    }
}

impl Notifier for SlackNotifier {
    fn send(&self, text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let content = SlackMessageContent {
                text: Some(text),
                blocks: None,
                attachments: None,
                upload: None,
                files: None,
                reactions: None,
                metadata: None,
            };
            let request = SlackApiChatPostMessageRequest {
                channel: self.channel.clone(),
                content,
                as_user: None,
                icon_emoji: None,
                icon_url: None,
                link_names: Some(true),
                parse: None,
                thread_ts: None,
                username: None,
                reply_broadcast: None,
                unfurl_links: None,
                unfurl_media: None,
            };

            self.client
                .open_session(&self.token)
                .chat_post_message(&request)
                .await
                .map_err(|err| AppError::Unavailable(format!("notify slack: {err}")))?;
            Ok(())
        })
    }
}

/// No-op notifier used when Slack is not configured.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send(&self, _text: String) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async {
            debug!("slack not configured; dropping notification");
            Ok(())
        })
    }
}
