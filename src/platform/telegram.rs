use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ReplyParameters};
use tracing::{info, warn};

use crate::platform::{IncomingContent, IncomingMessage};
use crate::relay::{Relay, Reply};

/// Telegram rejects messages longer than 4096 chars
const MAX_CHUNK_LEN: usize = 4000;

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        // max_len is narrower than this char; emit it whole
        if end == start {
            end = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    chunks
}

fn to_incoming(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        sender_id: msg.from.as_ref().map(|user| user.id.0),
        content: match msg.text() {
            Some(text) => IncomingContent::Text(text.to_string()),
            None => IncomingContent::Other,
        },
    }
}

/// Run the Telegram long-polling loop until Ctrl-C
pub async fn run(relay: Arc<Relay>, bot: Bot) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    let incoming = to_incoming(&msg);

    if let (Some(user), IncomingContent::Text(text)) = (msg.from.as_ref(), &incoming.content) {
        info!(
            "Telegram message from {} ({}): {} chars",
            user.first_name,
            user.id.0,
            text.chars().count()
        );

        // Only show "typing" when a model call is coming
        if relay.is_allowed(user.id.0) && !text.starts_with('/') {
            bot.send_chat_action(msg.chat.id, ChatAction::Typing)
                .await
                .ok();
        }
    }

    let reply = match relay.handle(&incoming).await {
        Some(reply) => reply,
        None => return Ok(()),
    };

    match &reply {
        Reply::Translation(text) => {
            for chunk in split_message(text, MAX_CHUNK_LEN) {
                if let Err(e) = bot
                    .send_message(msg.chat.id, chunk)
                    .reply_parameters(ReplyParameters::new(msg.id))
                    .await
                {
                    warn!("Failed to send reply chunk to chat {}: {}", msg.chat.id.0, e);
                }
            }
        }
        _ => {
            bot.send_message(msg.chat.id, reply.text())
                .reply_parameters(ReplyParameters::new(msg.id))
                .await?;
        }
    }

    Ok(())
}
