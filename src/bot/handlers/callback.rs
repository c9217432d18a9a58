use std::str::FromStr;

use teloxide::prelude::*;

use crate::bot::commands::register_user;
use crate::bot::commands::subscriptions::{settings_text, subscribe_to_event};
use crate::bot::handlers::BotContext;
use crate::bot::keyboards::settings_keyboard;
use crate::bot::state::{ChatDialogue, ChatState};
use crate::bot::HandlerResult;
use crate::database::models::*;
use crate::utils::logging::{log_command_error, Actor};

/// Typed form of inline keyboard callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    SubscribeCancel,
    Subscribe(i64),
    Toggle {
        flag: SubscriptionFlag,
        subscription_id: i64,
    },
    Info(SubscriptionFlag),
    Experience(Experience),
}

impl CallbackAction {
    pub fn data(&self) -> String {
        match self {
            CallbackAction::SubscribeCancel => "subscribe_cancel".to_string(),
            CallbackAction::Subscribe(event_id) => format!("subscribe_{event_id}"),
            CallbackAction::Toggle {
                flag,
                subscription_id,
            } => format!("toggle_{}_{}", flag.key(), subscription_id),
            CallbackAction::Info(flag) => format!("info_{}", flag.key()),
            CallbackAction::Experience(level) => format!("experience_{}", level.as_str()),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = String;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("unknown callback data '{data}'");

        if data == "subscribe_cancel" {
            return Ok(CallbackAction::SubscribeCancel);
        }
        if let Some(event_id) = data.strip_prefix("subscribe_") {
            return event_id
                .parse()
                .map(CallbackAction::Subscribe)
                .map_err(|_| invalid());
        }
        if let Some(rest) = data.strip_prefix("toggle_") {
            let (key, id) = rest.rsplit_once('_').ok_or_else(invalid)?;
            let flag = SubscriptionFlag::from_key(key).ok_or_else(invalid)?;
            let subscription_id = id.parse().map_err(|_| invalid())?;
            return Ok(CallbackAction::Toggle {
                flag,
                subscription_id,
            });
        }
        if let Some(key) = data.strip_prefix("info_") {
            return SubscriptionFlag::from_key(key)
                .map(CallbackAction::Info)
                .ok_or_else(invalid);
        }
        if let Some(level) = data.strip_prefix("experience_") {
            return Experience::parse(level)
                .map(CallbackAction::Experience)
                .ok_or_else(invalid);
        }

        Err(invalid())
    }
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: ChatDialogue,
    state: ChatState,
    ctx: BotContext,
) -> HandlerResult {
    let chat_id = q.message.as_ref().map(|m| m.chat.id.0).unwrap_or(0);
    let actor = Actor::new(Some(&q.from), chat_id);

    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    tracing::info!(
        "Callback received: '{}' from user {} ({}) in chat {}",
        data,
        actor.username,
        actor.user_id,
        chat_id
    );

    let action = match data.parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!("{}", e);
            bot.answer_callback_query(q.id.clone())
                .text("Unknown action")
                .await?;
            return Ok(());
        }
    };

    if let Err(e) = handle_action(&bot, &q, action, &dialogue, state, &ctx).await {
        log_command_error("callback", &actor, &e.to_string());
        bot.answer_callback_query(q.id.clone())
            .text("Something went wrong. Please try again later.")
            .await?;
    }

    Ok(())
}

async fn handle_action(
    bot: &Bot,
    q: &CallbackQuery,
    action: CallbackAction,
    dialogue: &ChatDialogue,
    state: ChatState,
    ctx: &BotContext,
) -> HandlerResult {
    let pool = &ctx.db.pool;

    match action {
        CallbackAction::SubscribeCancel => {
            edit_text(bot, q, "Subscription cancelled.".to_string()).await?;
            bot.answer_callback_query(q.id.clone()).await?;
        }
        CallbackAction::Subscribe(event_id) => {
            let (participant, _) = register_user(pool, &q.from).await?;
            let reply = subscribe_to_event(pool, participant.id, event_id).await?;
            edit_text(bot, q, reply).await?;
            bot.answer_callback_query(q.id.clone()).await?;
        }
        CallbackAction::Toggle {
            flag,
            subscription_id,
        } => {
            let Some(subscription) = owned_subscription(pool, q.from.id.0 as i64, subscription_id).await? else {
                bot.answer_callback_query(q.id.clone())
                    .text("Subscription not found")
                    .show_alert(true)
                    .await?;
                return Ok(());
            };

            let Some(updated) = Subscription::toggle(pool, subscription.id, flag).await? else {
                bot.answer_callback_query(q.id.clone())
                    .text("Subscription not found")
                    .show_alert(true)
                    .await?;
                return Ok(());
            };

            let event_title = Event::find_by_id(pool, updated.event_id)
                .await?
                .map(|event| event.title)
                .unwrap_or_default();

            if let Some(message) = q.message.as_ref() {
                bot.edit_message_text(message.chat.id, message.id, settings_text(&event_title, &updated))
                    .reply_markup(settings_keyboard(&updated))
                    .await?;
            }

            let state = if updated.flag(flag) { "on" } else { "off" };
            bot.answer_callback_query(q.id.clone())
                .text(format!("{}: {}", flag.label(), state))
                .await?;
        }
        CallbackAction::Info(flag) => {
            bot.answer_callback_query(q.id.clone())
                .text(flag.description())
                .show_alert(true)
                .await?;
        }
        CallbackAction::Experience(level) => {
            let ChatState::AwaitingExperience { company, position } = state else {
                bot.answer_callback_query(q.id.clone())
                    .text("Start with /profile to fill in your profile.")
                    .await?;
                return Ok(());
            };

            let (participant, _) = register_user(pool, &q.from).await?;
            Participant::update_profile(pool, participant.id, &company, &position, level).await?;
            dialogue.exit().await?;

            edit_text(
                bot,
                q,
                format!(
                    "✅ Profile saved: {position} at {company}, {}.\nOthers can now find you via /networking.",
                    level.label()
                ),
            )
            .await?;
            bot.answer_callback_query(q.id.clone()).await?;
        }
    }

    Ok(())
}

/// The subscription, but only when it belongs to the Telegram user.
pub async fn owned_subscription(
    pool: &sqlx::SqlitePool,
    telegram_id: i64,
    subscription_id: i64,
) -> Result<Option<Subscription>, sqlx::Error> {
    let Some(participant) = Participant::find_by_telegram_id(pool, telegram_id).await? else {
        return Ok(None);
    };

    Ok(Subscription::find_by_id(pool, subscription_id)
        .await?
        .filter(|subscription| subscription.participant_id == participant.id))
}

async fn edit_text(bot: &Bot, q: &CallbackQuery, text: String) -> HandlerResult {
    if let Some(message) = q.message.as_ref() {
        bot.edit_message_text(message.chat.id, message.id, text).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_data() {
        assert_eq!("subscribe_cancel".parse(), Ok(CallbackAction::SubscribeCancel));
        assert_eq!("subscribe_12".parse(), Ok(CallbackAction::Subscribe(12)));
        assert_eq!(
            "toggle_reminders_5".parse(),
            Ok(CallbackAction::Toggle {
                flag: SubscriptionFlag::Reminders,
                subscription_id: 5,
            })
        );
        assert_eq!(
            "info_program".parse(),
            Ok(CallbackAction::Info(SubscriptionFlag::ProgramChanges))
        );
        assert_eq!(
            "experience_senior".parse(),
            Ok(CallbackAction::Experience(Experience::Senior))
        );
    }

    #[test]
    fn test_reject_unknown_callback_data() {
        for data in ["", "subscribe_", "subscribe_x", "toggle_program", "toggle_sound_1", "info_", "experience_guru", "1:2:yes"] {
            assert!(data.parse::<CallbackAction>().is_err(), "accepted {data:?}");
        }
    }

    #[test]
    fn test_data_matches_parse() {
        let actions = [
            CallbackAction::SubscribeCancel,
            CallbackAction::Subscribe(3),
            CallbackAction::Toggle {
                flag: SubscriptionFlag::NewEvents,
                subscription_id: 9,
            },
            CallbackAction::Info(SubscriptionFlag::Reminders),
            CallbackAction::Experience(Experience::Lead),
        ];
        for action in actions {
            assert_eq!(action.data().parse(), Ok(action));
        }
    }
}
