use teloxide::prelude::*;

use crate::bot::commands::{donate, profile, questions, schedule, start, subscriptions, Command};
use crate::bot::handlers::BotContext;
use crate::bot::keyboards::{main_menu, MenuButton};
use crate::bot::state::{ChatDialogue, ChatState};
use crate::bot::HandlerResult;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success, Actor};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: ChatDialogue,
    ctx: BotContext,
) -> HandlerResult {
    // A command always abandons whatever prompt was pending.
    dialogue.reset().await?;
    run_command(&bot, &msg, cmd, &dialogue, &ctx).await
}

/// Where a plain-text message goes, given the chat's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRoute {
    /// A menu button. Any pending prompt is dropped first.
    Menu(MenuButton),
    UnknownCommand,
    /// A command typed while a prompt was pending.
    CancelInput,
    Idle,
    Question { speech_id: i64 },
    Company,
    Position { company: String },
    ChooseExperience,
}

pub fn route_text(text: &str, state: &ChatState) -> TextRoute {
    if let Some(button) = MenuButton::parse(text) {
        return TextRoute::Menu(button);
    }

    if text.starts_with('/') {
        return if *state == ChatState::Idle {
            TextRoute::UnknownCommand
        } else {
            TextRoute::CancelInput
        };
    }

    match state {
        ChatState::Idle => TextRoute::Idle,
        ChatState::AwaitingQuestion { speech_id } => TextRoute::Question {
            speech_id: *speech_id,
        },
        ChatState::AwaitingCompany => TextRoute::Company,
        ChatState::AwaitingPosition { company } => TextRoute::Position {
            company: company.clone(),
        },
        ChatState::AwaitingExperience { .. } => TextRoute::ChooseExperience,
    }
}

pub async fn text_handler(
    bot: Bot,
    msg: Message,
    dialogue: ChatDialogue,
    state: ChatState,
    ctx: BotContext,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match route_text(text, &state) {
        TextRoute::Menu(button) => {
            dialogue.reset().await?;
            run_command(&bot, &msg, button.command(), &dialogue, &ctx).await?;
        }
        TextRoute::UnknownCommand => {
            bot.send_message(msg.chat.id, "🤷 Unknown command. Send /help to see what I can do.")
                .await?;
        }
        TextRoute::CancelInput => {
            dialogue.reset().await?;
            bot.send_message(msg.chat.id, "↩️ Input cancelled.").await?;
        }
        TextRoute::Idle => {
            bot.send_message(
                msg.chat.id,
                "Use the menu below or send /help to see what I can do.",
            )
            .reply_markup(main_menu())
            .await?;
        }
        TextRoute::Question { speech_id } => {
            questions::receive_question(&bot, &msg, text, speech_id, &dialogue, &ctx).await?;
        }
        TextRoute::Company => {
            profile::receive_company(&bot, &msg, text, &dialogue).await?;
        }
        TextRoute::Position { company } => {
            profile::receive_position(&bot, &msg, text, company, &dialogue).await?;
        }
        TextRoute::ChooseExperience => {
            bot.send_message(
                msg.chat.id,
                "Please choose your experience level with the buttons above.",
            )
            .await?;
        }
    }

    Ok(())
}

/// Runs a command and turns failures into a chat reply plus a log line.
async fn run_command(
    bot: &Bot,
    msg: &Message,
    cmd: Command,
    dialogue: &ChatDialogue,
    ctx: &BotContext,
) -> HandlerResult {
    let actor = Actor::from_message(msg);
    let name = cmd.name();
    log_command_start(name, &actor, None);

    let result = match cmd {
        Command::Help => start::handle_help(bot, msg).await,
        Command::Start => start::handle_start(bot, msg, ctx).await,
        Command::Schedule => schedule::handle_schedule(bot, msg, ctx).await,
        Command::Ask => questions::handle_ask(bot, msg, dialogue, ctx).await,
        Command::Questions => questions::handle_questions(bot, msg, ctx).await,
        Command::Subscribe => subscriptions::handle_subscribe(bot, msg, ctx).await,
        Command::Unsubscribe => subscriptions::handle_unsubscribe(bot, msg, ctx).await,
        Command::Settings => subscriptions::handle_settings(bot, msg, ctx).await,
        Command::Profile => profile::handle_profile(bot, msg, dialogue, ctx).await,
        Command::Networking => profile::handle_networking(bot, msg, ctx).await,
        Command::Donate(amount) => donate::handle_donate(bot, msg, &amount, ctx).await,
    };

    match result {
        Ok(()) => log_command_success(name, &actor, None),
        Err(e) => {
            log_command_error(name, &actor, &e.to_string());
            CommandFeedback::new(bot.clone(), msg.chat.id)
                .error("Something went wrong. Please try again later.")
                .await?;
        }
    }

    Ok(())
}
