//! Update handlers for a running session.

use std::sync::Arc;

use botfleet_models::{BehaviorSettings, BotId};
use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;
use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::error::TelegramError;
use crate::responder::{welcome_text, Responder, FALLBACK_REPLY};

/// Longest text Telegram accepts in one message.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Per-session state injected into every handler.
pub(crate) struct BotContext {
    pub bot_id: BotId,
    pub settings: BehaviorSettings,
    pub responder: Arc<dyn Responder>,
}

/// Handler tree: commands first, then plain text.
pub(crate) fn schema() -> UpdateHandler<RequestError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
                .endpoint(handle_message),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    debug!(bot_id = %ctx.bot_id, chat_id = %msg.chat.id, command = ?cmd, "command received");

    let text = match cmd {
        Command::Start => welcome_text(&ctx.settings),
        Command::Help => Command::descriptions().to_string(),
    };
    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    info!(bot_id = %ctx.bot_id, chat_id = %msg.chat.id, "message received");

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;

    let reply = match ctx.responder.reply(&ctx.settings, text).await {
        Ok(reply) => reply,
        Err(TelegramError::NoApiKey) => {
            debug!(bot_id = %ctx.bot_id, "no language model configured, sending fallback");
            FALLBACK_REPLY.to_string()
        }
        Err(e) => {
            warn!(bot_id = %ctx.bot_id, error = %e, "reply generation failed, sending fallback");
            FALLBACK_REPLY.to_string()
        }
    };

    bot.send_message(msg.chat.id, fit_message(&reply)).await?;

    Ok(())
}

/// Trim a reply to what a single Telegram message can hold.
pub(crate) fn fit_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_message_short() {
        assert_eq!(fit_message("hello"), "hello");
    }

    #[test]
    fn test_fit_message_long() {
        let long = "é".repeat(MAX_MESSAGE_CHARS + 10);
        let fitted = fit_message(&long);

        assert_eq!(fitted.chars().count(), MAX_MESSAGE_CHARS);
        assert!(fitted.ends_with('…'));
    }
}
