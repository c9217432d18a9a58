use teloxide::prelude::*;

use crate::bot::commands::register_user;
use crate::bot::handlers::BotContext;
use crate::bot::keyboards::{event_choice_keyboard, settings_keyboard};
use crate::bot::HandlerResult;
use crate::database::models::*;

pub const NOT_REGISTERED: &str = "👋 Please register first by sending /start.";

pub async fn handle_subscribe(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let pool = &ctx.db.pool;

    let events = Event::find_active(pool).await?;
    match events.as_slice() {
        [] => {
            bot.send_message(msg.chat.id, "📭 There are no active events to subscribe to.")
                .await?;
        }
        [event] => {
            let (participant, _) = register_user(pool, user).await?;
            let reply = subscribe_to_event(pool, participant.id, event.id).await?;
            bot.send_message(msg.chat.id, reply).await?;
        }
        events => {
            bot.send_message(msg.chat.id, "🔔 Which event would you like to follow?")
                .reply_markup(event_choice_keyboard(events, ctx.offset))
                .await?;
        }
    }

    Ok(())
}

/// Subscribes the participant and returns the reply for the chat.
pub async fn subscribe_to_event(
    pool: &sqlx::SqlitePool,
    participant_id: i64,
    event_id: i64,
) -> Result<String, sqlx::Error> {
    let Some(event) = Event::find_active_by_id(pool, event_id).await? else {
        return Ok("❌ Event not found or inactive.".to_string());
    };

    let (_, created) = Subscription::get_or_create(pool, participant_id, event.id).await?;
    Ok(if created {
        format!(
            "✅ You are subscribed to «{}».\nUse /settings to choose which notifications you get.",
            event.title
        )
    } else {
        format!("ℹ️ You are already subscribed to «{}».", event.title)
    })
}

pub async fn handle_unsubscribe(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let pool = &ctx.db.pool;

    let Some(participant) = Participant::find_by_telegram_id(pool, user.id.0 as i64).await? else {
        bot.send_message(msg.chat.id, NOT_REGISTERED).await?;
        return Ok(());
    };

    if Subscription::count_for_participant(pool, participant.id).await? == 0 {
        bot.send_message(msg.chat.id, "ℹ️ You are not subscribed to any events.")
            .await?;
        return Ok(());
    }

    let updated = Subscription::disable_all_for_participant(pool, participant.id).await?;
    tracing::info!(
        "Participant {} turned off notifications on {} subscriptions",
        participant.id,
        updated
    );
    bot.send_message(
        msg.chat.id,
        "🔕 All notifications are turned off. Use /settings to turn them back on.",
    )
    .await?;

    Ok(())
}

pub async fn handle_settings(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let pool = &ctx.db.pool;

    let Some(participant) = Participant::find_by_telegram_id(pool, user.id.0 as i64).await? else {
        bot.send_message(msg.chat.id, NOT_REGISTERED).await?;
        return Ok(());
    };

    let Some(event) = Event::first_active(pool).await? else {
        bot.send_message(msg.chat.id, "📭 There are no active events right now.")
            .await?;
        return Ok(());
    };

    let (subscription, _) = Subscription::get_or_create(pool, participant.id, event.id).await?;
    bot.send_message(msg.chat.id, settings_text(&event.title, &subscription))
        .reply_markup(settings_keyboard(&subscription))
        .await?;

    Ok(())
}

pub fn settings_text(event_title: &str, subscription: &Subscription) -> String {
    let mut text = format!("⚙️ Notification settings for «{event_title}»\n\n");
    for flag in SubscriptionFlag::ALL {
        let state = if subscription.flag(flag) { "on" } else { "off" };
        text.push_str(&format!("{}: {}\n", flag.label(), state));
    }
    text.push_str("\nTap a switch to change it or a label to learn more.");
    text
}
