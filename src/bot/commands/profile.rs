use teloxide::prelude::*;

use crate::bot::commands::register_user;
use crate::bot::handlers::BotContext;
use crate::bot::keyboards::experience_keyboard;
use crate::bot::state::{ChatDialogue, ChatState};
use crate::bot::HandlerResult;
use crate::database::models::*;
use crate::services::program::render_networking;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_validation_error, Actor};
use crate::utils::validation::validate_profile_field;

const NETWORKING_LIMIT: i64 = 5;

pub async fn handle_profile(
    bot: &Bot,
    msg: &Message,
    dialogue: &ChatDialogue,
    ctx: &BotContext,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    register_user(&ctx.db.pool, user).await?;

    dialogue.update(ChatState::AwaitingCompany).await?;
    bot.send_message(
        msg.chat.id,
        "👤 Let's fill in your networking profile.\n\nWhich company do you work for?",
    )
    .await?;

    Ok(())
}

pub async fn receive_company(
    bot: &Bot,
    msg: &Message,
    text: &str,
    dialogue: &ChatDialogue,
) -> HandlerResult {
    let Some(company) = validated(bot, msg, "Company", text).await? else {
        return Ok(());
    };

    dialogue.update(ChatState::AwaitingPosition { company }).await?;
    bot.send_message(msg.chat.id, "💼 What is your position?").await?;
    Ok(())
}

pub async fn receive_position(
    bot: &Bot,
    msg: &Message,
    text: &str,
    company: String,
    dialogue: &ChatDialogue,
) -> HandlerResult {
    let Some(position) = validated(bot, msg, "Position", text).await? else {
        return Ok(());
    };

    dialogue
        .update(ChatState::AwaitingExperience { company, position })
        .await?;
    bot.send_message(msg.chat.id, "📈 What is your experience level?")
        .reply_markup(experience_keyboard())
        .await?;
    Ok(())
}

/// Replies with the validation error and keeps the dialogue step when the
/// answer is rejected.
async fn validated(bot: &Bot, msg: &Message, field: &str, text: &str) -> Result<Option<String>, teloxide::RequestError> {
    match validate_profile_field(field, text) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log_validation_error("/profile", field, &e.to_string(), &Actor::from_message(msg));
            CommandFeedback::new(bot.clone(), msg.chat.id)
                .validation_error(&e.to_string(), "Please send a short answer.")
                .await?;
            Ok(None)
        }
    }
}

pub async fn handle_networking(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let candidates =
        Participant::networking_candidates(&ctx.db.pool, user.id.0 as i64, NETWORKING_LIMIT).await?;
    if candidates.is_empty() {
        bot.send_message(
            msg.chat.id,
            "🤝 Nobody has filled in a networking profile yet. Be the first with /profile!",
        )
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, render_networking(&candidates).trim_end().to_string())
        .await?;
    Ok(())
}
