use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::User;

use crate::bot::commands::register_user;
use crate::bot::handlers::BotContext;
use crate::bot::state::{ChatDialogue, ChatState};
use crate::bot::{HandlerError, HandlerResult};
use crate::database::models::*;
use crate::services::program::render_speaker_questions;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_validation_error, Actor};
use crate::utils::markdown::{split_message, TELEGRAM_MESSAGE_LIMIT};
use crate::utils::validation::validate_question_text;

pub async fn handle_ask(
    bot: &Bot,
    msg: &Message,
    dialogue: &ChatDialogue,
    ctx: &BotContext,
) -> HandlerResult {
    let Some(speech) = SpeechDetails::active_at(&ctx.db.pool, Utc::now()).await? else {
        bot.send_message(
            msg.chat.id,
            "❔ Questions are accepted only while a talk is in progress.\n\
             Check /schedule to see when the next one starts.",
        )
        .await?;
        return Ok(());
    };

    dialogue
        .update(ChatState::AwaitingQuestion {
            speech_id: speech.id,
        })
        .await?;

    bot.send_message(
        msg.chat.id,
        format!(
            "✍️ Send your question for {}.\nTopic: «{}»\n\n\
             Tap any menu button or send a command to cancel.",
            speech.speaker_name, speech.title
        ),
    )
    .await?;

    Ok(())
}

/// What became of text sent while a chat was awaiting a question.
#[derive(Debug)]
pub enum QuestionOutcome {
    /// Failed validation. The chat keeps waiting for a question.
    Invalid(String),
    /// The talk was deleted after `/ask`. The prompt is closed.
    SpeechGone,
    Saved(Question),
}

/// Validates and stores a question, closing the prompt unless the text
/// was rejected.
pub async fn submit_question(
    pool: &sqlx::SqlitePool,
    dialogue: &ChatDialogue,
    speech_id: i64,
    user: &User,
    text: &str,
) -> Result<QuestionOutcome, HandlerError> {
    let question_text = match validate_question_text(text) {
        Ok(text) => text,
        Err(e) => return Ok(QuestionOutcome::Invalid(e.to_string())),
    };

    if SpeechDetails::find_by_id(pool, speech_id).await?.is_none() {
        dialogue.exit().await?;
        return Ok(QuestionOutcome::SpeechGone);
    }

    let (participant, _) = register_user(pool, user).await?;
    let question = Question::create(pool, speech_id, participant.id, &question_text).await?;
    dialogue.exit().await?;

    Ok(QuestionOutcome::Saved(question))
}

pub async fn receive_question(
    bot: &Bot,
    msg: &Message,
    text: &str,
    speech_id: i64,
    dialogue: &ChatDialogue,
    ctx: &BotContext,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    match submit_question(&ctx.db.pool, dialogue, speech_id, user, text).await? {
        QuestionOutcome::Invalid(reason) => {
            log_validation_error("/ask", "question_text", &reason, &Actor::from_message(msg));
            feedback
                .validation_error(&reason, "Send a shorter question or tap a menu button to cancel.")
                .await?;
        }
        QuestionOutcome::SpeechGone => {
            feedback
                .error("This talk is no longer available, so your question was not saved.")
                .await?;
        }
        QuestionOutcome::Saved(question) => {
            tracing::info!(
                "Question {} for speech {} from participant {}",
                question.id,
                speech_id,
                question.participant_id
            );
            feedback
                .success("Thank you! Your question has been passed to the speaker.")
                .await?;
        }
    }

    Ok(())
}

pub async fn handle_questions(bot: &Bot, msg: &Message, ctx: &BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let pool = &ctx.db.pool;

    let Some(speaker) = Speaker::find_by_telegram_id(pool, user.id.0 as i64).await? else {
        bot.send_message(msg.chat.id, "🚫 This command is available to speakers only.")
            .await?;
        return Ok(());
    };

    let Some((speech_id, speech_title)) = speaker_speech(pool, speaker.id, Utc::now()).await? else {
        bot.send_message(msg.chat.id, "📭 You have no talks in the current event.")
            .await?;
        return Ok(());
    };

    let questions = Question::for_speech(pool, speech_id).await?;
    if questions.is_empty() {
        bot.send_message(
            msg.chat.id,
            format!("📭 There are no questions for «{speech_title}» yet."),
        )
        .await?;
        return Ok(());
    }

    let text = render_speaker_questions(&speech_title, &questions);
    for chunk in split_message(text.trim_end(), TELEGRAM_MESSAGE_LIMIT) {
        bot.send_message(msg.chat.id, chunk).await?;
    }

    Ok(())
}

/// The talk whose questions a speaker sees: the one running now if it is
/// theirs, otherwise their latest talk at the first active event.
pub async fn speaker_speech(
    pool: &sqlx::SqlitePool,
    speaker_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<(i64, String)>, sqlx::Error> {
    if let Some(speech) = SpeechDetails::active_at(pool, now).await? {
        if speech.speaker_id == speaker_id {
            return Ok(Some((speech.id, speech.title)));
        }
    }

    let Some(event) = Event::first_active(pool).await? else {
        return Ok(None);
    };

    Ok(Speech::latest_for_speaker(pool, event.id, speaker_id)
        .await?
        .map(|speech| (speech.id, speech.title)))
}
