use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{register_user, Command};
use crate::bot::handlers::BotContext;
use crate::bot::keyboards::main_menu;
use crate::bot::HandlerResult;

pub async fn handle_start(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let (participant, created) = register_user(&ctx.db.pool, user).await?;
    if created {
        tracing::info!(
            "Registered participant {} (telegram id {})",
            participant.id,
            participant.telegram_id
        );
    }

    bot.send_message(msg.chat.id, welcome_text(&participant.display_name(), created))
        .reply_markup(main_menu())
        .await?;

    Ok(())
}

pub async fn handle_help(bot: &Bot, msg: &Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub fn welcome_text(name: &str, created: bool) -> String {
    let greeting = if created {
        format!("👋 Welcome, {name}! You are registered for the conference.")
    } else {
        format!("👋 Welcome back, {name}!")
    };

    format!(
        "{greeting}\n\n\
         📅 /schedule - see the program\n\
         ❓ /ask - ask the current speaker a question\n\
         🔔 /subscribe - get notified about changes\n\
         🤝 /networking - meet other participants\n\n\
         Use the menu below or /help to see every command."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_text_differs_for_returning_users() {
        assert!(welcome_text("Ada", true).starts_with("👋 Welcome, Ada! You are registered"));
        assert!(welcome_text("Ada", false).starts_with("👋 Welcome back, Ada!"));
    }
}
