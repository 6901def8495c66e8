//! Telegram chat layer for the wallet analysis pipeline.
//!
//! Long-polls the Bot API for updates, scans incoming text for the first
//! valid wallet address, and answers with the rendered analysis report. The
//! pipeline's output is consumed as opaque formatted text; this layer only
//! decides when to invoke it and how to deliver the result.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::rate_limit::UserRateLimiter;
use crate::security::{extract_wallet_address, sanitize_for_logging};
use crate::wallet::report::render_report;
use crate::wallet::resolver::WalletResolver;
use crate::wallet::types::ResolveError;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const LONG_POLL_TIMEOUT_SECS: u64 = 30;
const POLL_ERROR_BACKOFF_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    from: Option<User>,
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessagePayload<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

/// The wallet analysis bot: polls for updates and replies to messages that
/// contain a wallet address.
pub struct WalletBot {
    http: Client,
    bot_token: String,
    resolver: Arc<WalletResolver>,
    rate_limiter: Arc<UserRateLimiter>,
    last_update_id: Mutex<Option<i64>>,
}

impl WalletBot {
    pub fn new(
        http: Client,
        bot_token: impl Into<String>,
        resolver: Arc<WalletResolver>,
        rate_limiter: Arc<UserRateLimiter>,
    ) -> Self {
        Self {
            http,
            bot_token: bot_token.into(),
            resolver,
            rate_limiter,
            last_update_id: Mutex::new(None),
        }
    }

    /// Run the long-poll loop until the task is cancelled.
    pub async fn run(&self) -> Result<()> {
        info!("wallet bot started, polling for updates");
        loop {
            match self.get_updates().await {
                Ok(updates) => {
                    for update in updates {
                        if let Some(message) = update.message {
                            if let Err(e) = self.handle_message(message).await {
                                warn!("failed to handle message: {:#}", e);
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "getUpdates failed: {}",
                        sanitize_for_logging(&format!("{e:#}"))
                    );
                    tokio::time::sleep(Duration::from_secs(POLL_ERROR_BACKOFF_SECS)).await;
                }
            }
        }
    }

    async fn get_updates(&self) -> Result<Vec<Update>> {
        let offset = {
            let last_id = self.last_update_id.lock().await;
            last_id.map(|id| id + 1).unwrap_or(0)
        };

        let url = format!(
            "{TELEGRAM_API_BASE}/bot{}/getUpdates?offset={offset}&timeout={LONG_POLL_TIMEOUT_SECS}",
            self.bot_token
        );

        let response = self
            .http
            .get(&url)
            // The request must outlive the server-side long-poll window.
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 10))
            .send()
            .await
            .context("failed to send getUpdates request")?
            .error_for_status()
            .context("getUpdates returned error status")?;

        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .context("failed to parse getUpdates response")?;

        if !body.ok {
            anyhow::bail!(
                "telegram returned ok=false: {}",
                body.description.unwrap_or_default()
            );
        }

        let updates = body.result.unwrap_or_default();
        if let Some(last) = updates.last() {
            let mut last_id = self.last_update_id.lock().await;
            *last_id = Some(last.update_id);
        }

        Ok(updates)
    }

    async fn handle_message(&self, message: Message) -> Result<()> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if text.starts_with("/start") {
            self.send_message(chat_id, START_TEXT, None).await?;
            return Ok(());
        }
        if text.starts_with("/help") {
            self.send_message(chat_id, HELP_TEXT, None).await?;
            return Ok(());
        }

        // Only respond when the message contains a valid wallet address.
        let Some(address) = extract_wallet_address(text) else {
            return Ok(());
        };
        let address = address.to_string();
        let caller = message.from.map(|u| u.id).unwrap_or(chat_id);

        if let Err(wait) = self.rate_limiter.check(caller).await {
            debug!(caller, "request rate limited for {}s", wait.as_secs());
            self.send_message(
                chat_id,
                "⏰ Rate limit exceeded. Please wait a moment before making another request.",
                None,
            )
            .await?;
            return Ok(());
        }

        let loading_id = self
            .send_message(chat_id, "🔍 Analyzing wallet... Please wait.", None)
            .await?;

        match self.resolver.resolve(&address).await {
            Ok(wallet) => {
                let report = render_report(&wallet, &address);
                self.edit_message(chat_id, loading_id, &report, Some(solscan_keyboard(&address)))
                    .await?;
            }
            Err(e) => {
                self.edit_message(
                    chat_id,
                    loading_id,
                    user_facing_error(e),
                    Some(solscan_keyboard(&address)),
                )
                .await?;
            }
        }

        Ok(())
    }

    /// Send a message and return its message id, so it can be edited later.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<i64> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.bot_token);
        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode: "Markdown",
            reply_markup,
        };

        let body: ApiResponse<Message> = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("failed to send sendMessage request")?
            .error_for_status()
            .context("sendMessage returned error status")?
            .json()
            .await
            .context("failed to parse sendMessage response")?;

        let sent = body
            .result
            .with_context(|| format!("sendMessage rejected: {}", body.description.unwrap_or_default()))?;
        Ok(sent.message_id)
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/editMessageText", self.bot_token);
        let payload = EditMessagePayload {
            chat_id,
            message_id,
            text,
            parse_mode: "Markdown",
            reply_markup,
        };

        self.http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("failed to send editMessageText request")?
            .error_for_status()
            .context("editMessageText returned error status")?;

        Ok(())
    }
}

fn solscan_keyboard(address: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton {
            text: "🔍 View on Solscan".to_string(),
            url: format!("https://solscan.io/account/{address}"),
        }]],
    }
}

/// Map a terminal resolution failure to the user-visible message.
fn user_facing_error(err: ResolveError) -> &'static str {
    match err {
        ResolveError::AccountNotFound => {
            "❌ Error: Wallet address not found. Please check the address and try again."
        }
        ResolveError::RateLimited => {
            "❌ Error: API rate limit exceeded. Please try again in a few minutes."
        }
        ResolveError::AllSourcesFailed => {
            "❌ Error: Could not fetch wallet information. The address might be invalid or the data sources are temporarily unavailable."
        }
    }
}

const START_TEXT: &str = "🤖 *Wallet Info Bot*\n\n\
I automatically detect and analyze Solana wallet addresses in messages!\n\n\
*What I provide:*\n\
• SOL balance\n\
• Token holdings\n\
• Transaction count\n\
• Wallet age\n\
• Activity level\n\n\
*How to use:*\n\
Just send a message containing a wallet address like:\n\
`9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM`\n\n\
I'll only respond when I detect a valid wallet address!";

const HELP_TEXT: &str = "📖 *How to use this bot:*\n\n\
1. Send a message containing a Solana wallet address\n\
2. I'll automatically detect and analyze the wallet\n\
3. Use the button to view the account on Solscan\n\n\
*Note:* I only respond when I detect a valid wallet address in your message.";
