use teloxide::prelude::*;
use teloxide::types::ParseMode;
use crate::utils::markdown::escape_markdown;

/// Feedback types for different command outcomes
#[derive(Debug, Clone, Copy)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
}

impl FeedbackType {
    pub fn emoji(self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
        }
    }
}

/// Builds the escaped MarkdownV2 body sent for a feedback message.
pub fn format_feedback(feedback_type: FeedbackType, message: &str) -> String {
    format!("{} {}", feedback_type.emoji(), escape_markdown(message))
}

/// Short status replies to an attendee's chat.
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> ResponseResult<Message> {
        self.bot
            .send_message(self.chat_id, format_feedback(feedback_type, message))
            .parse_mode(ParseMode::MarkdownV2)
            .await
    }

    pub async fn success(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Success, message).await
    }

    pub async fn error(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Error, message).await
    }

    pub async fn warning(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Warning, message).await
    }

    pub async fn info(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Info, message).await
    }

    /// Send validation error with helpful suggestion
    pub async fn validation_error(&self, error: &str, suggestion: &str) -> ResponseResult<Message> {
        let message = format!("{error}\n\n💡 Suggestion: {suggestion}");
        self.send(FeedbackType::Error, &message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_type_emojis() {
        assert_eq!(FeedbackType::Success.emoji(), "✅");
        assert_eq!(FeedbackType::Warning.emoji(), "⚠️");
        assert_eq!(FeedbackType::Error.emoji(), "❌");
        assert_eq!(FeedbackType::Info.emoji(), "ℹ️");
    }

    #[test]
    fn test_format_feedback_escapes_body() {
        assert_eq!(
            format_feedback(FeedbackType::Error, "Use /start first."),
            "❌ Use /start first\\."
        );
    }
}
