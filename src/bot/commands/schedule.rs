use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::handlers::BotContext;
use crate::bot::HandlerResult;
use crate::database::models::*;
use crate::services::program::render_schedule;
use crate::utils::markdown::{split_message, TELEGRAM_MESSAGE_LIMIT};

pub const NO_ACTIVE_EVENTS: &str = "📭 There are no active events right now.";
pub const PROGRAM_NOT_READY: &str = "🗓 The program is not available yet. Please check back later!";

pub async fn handle_schedule(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    for chunk in schedule_messages(ctx).await? {
        bot.send_message(msg.chat.id, chunk).await?;
    }
    Ok(())
}

/// The schedule as it should be sent, already split to Telegram's size limit.
pub async fn schedule_messages(ctx: &BotContext) -> Result<Vec<String>, sqlx::Error> {
    let pool = &ctx.db.pool;

    if Event::first_active(pool).await?.is_none() {
        return Ok(vec![NO_ACTIVE_EVENTS.to_string()]);
    }

    let speeches = SpeechDetails::for_active_events(pool).await?;
    if speeches.is_empty() {
        return Ok(vec![PROGRAM_NOT_READY.to_string()]);
    }

    let text = render_schedule(&speeches, Utc::now(), ctx.offset);
    Ok(split_message(text.trim_end(), TELEGRAM_MESSAGE_LIMIT))
}
