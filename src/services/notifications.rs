use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use thiserror::Error;

use crate::database::{connection::DatabaseManager, models::*};
use crate::utils::datetime::{format_datetime, format_time};
use crate::utils::logging::{log_delivery_failure, log_notification};

/// Pause between Telegram deliveries, keeping broadcasts under the
/// Bot API limit of ~30 messages per second.
const TELEGRAM_SEND_INTERVAL: Duration = Duration::from_millis(35);

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("telegram bot is not configured")]
    BotDisabled,
}

/// Outbound channel for broadcast messages.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError>;
}

/// Delivers through the Telegram Bot API.
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        let result = self.bot.send_message(ChatId(chat_id), text.to_string()).await;
        tokio::time::sleep(TELEGRAM_SEND_INTERVAL).await;
        result?;
        Ok(())
    }
}

/// Used when the process runs without a bot token: every delivery fails.
pub struct DisabledSender;

#[async_trait]
impl MessageSender for DisabledSender {
    async fn send_text(&self, _chat_id: i64, _text: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::BotDisabled)
    }
}

/// Broadcasts program changes, event announcements and reminders to
/// subscribed participants, recording each broadcast in `notifications`.
#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseManager,
    sender: Arc<dyn MessageSender>,
    offset: FixedOffset,
}

impl NotificationService {
    pub fn new(db: DatabaseManager, sender: Arc<dyn MessageSender>, offset: FixedOffset) -> Self {
        Self { db, sender, offset }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.db.pool
    }

    /// Returns the number of subscribers reached.
    pub async fn send_program_change_notification(
        &self,
        event: &Event,
        change_description: &str,
    ) -> Result<usize, sqlx::Error> {
        let recipients =
            Subscription::recipients(self.pool(), event.id, SubscriptionFlag::ProgramChanges).await?;
        let title = format!("Program change: {}", event.title);
        let message = program_change_message(event, change_description);

        self.broadcast(NotificationKind::ProgramChange, Some(event.id), None, &title, &message, recipients)
            .await
    }

    pub async fn send_new_event_notification(&self, event: &Event) -> Result<usize, sqlx::Error> {
        let recipients = Subscription::new_event_recipients(self.pool(), event.id).await?;
        let title = format!("New event: {}", event.title);
        let message = new_event_message(event, self.offset);

        self.broadcast(NotificationKind::NewEvent, Some(event.id), None, &title, &message, recipients)
            .await
    }

    /// Reminds the event's subscribers about the event itself or, when
    /// given, one of its speeches.
    pub async fn send_reminder_notification(
        &self,
        event: &Event,
        speech: Option<&SpeechDetails>,
    ) -> Result<usize, sqlx::Error> {
        let recipients =
            Subscription::recipients(self.pool(), event.id, SubscriptionFlag::Reminders).await?;
        let title = match speech {
            Some(speech) => format!("Reminder: {}", speech.title),
            None => format!("Reminder: {}", event.title),
        };
        let message = reminder_message(event, speech, self.offset);

        self.broadcast(
            NotificationKind::Reminder,
            Some(event.id),
            speech.map(|s| s.id),
            &title,
            &message,
            recipients,
        )
        .await
    }

    async fn broadcast(
        &self,
        kind: NotificationKind,
        event_id: Option<i64>,
        speech_id: Option<i64>,
        title: &str,
        message: &str,
        recipients: Vec<i64>,
    ) -> Result<usize, sqlx::Error> {
        let notification =
            Notification::create(self.pool(), kind, event_id, speech_id, title, message).await?;

        let mut sent = 0usize;
        let mut failed = 0usize;
        for chat_id in recipients {
            match self.sender.send_text(chat_id, message).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    log_delivery_failure(chat_id, &e.to_string());
                }
            }
        }

        Notification::mark_sent(self.pool(), notification.id, sent as i64).await?;
        log_notification(kind.as_str(), notification.id, sent, failed);

        Ok(sent)
    }
}

pub fn program_change_message(event: &Event, change_description: &str) -> String {
    format!(
        "📢 Program update for «{}»\n\n{}",
        event.title,
        change_description.trim()
    )
}

pub fn new_event_message(event: &Event, offset: FixedOffset) -> String {
    let mut message = format!(
        "🆕 New event: «{}»\n📅 {}\n",
        event.title,
        format_datetime(&event.date, offset)
    );
    if !event.description.trim().is_empty() {
        message.push('\n');
        message.push_str(event.description.trim());
        message.push('\n');
    }
    message.push_str("\nUse /subscribe to get updates about it.");
    message
}

pub fn reminder_message(event: &Event, speech: Option<&SpeechDetails>, offset: FixedOffset) -> String {
    match speech {
        Some(speech) => format!(
            "⏰ Reminder: «{}» by {} starts at {} ({}).",
            speech.title,
            speech.speaker_name,
            format_time(&speech.start_time, offset),
            event.title
        ),
        None => format!(
            "⏰ Reminder: «{}» starts {}.",
            event.title,
            format_datetime(&event.date, offset)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event() -> Event {
        Event {
            id: 1,
            title: "RustConf".to_string(),
            description: String::new(),
            date: Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_new_event_message_without_description() {
        let text = new_event_message(&event(), utc());
        assert_eq!(
            text,
            "🆕 New event: «RustConf»\n📅 01.06.2024 07:00\n\nUse /subscribe to get updates about it."
        );
    }

    #[test]
    fn test_reminder_message_for_speech() {
        let speech = SpeechDetails {
            id: 3,
            event_id: 1,
            event_title: "RustConf".to_string(),
            speaker_id: 2,
            speaker_name: "Ada".to_string(),
            title: "Ownership".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            is_active: true,
        };
        assert_eq!(
            reminder_message(&event(), Some(&speech), utc()),
            "⏰ Reminder: «Ownership» by Ada starts at 09:30 (RustConf)."
        );
    }

    #[test]
    fn test_program_change_message_trims_description() {
        assert_eq!(
            program_change_message(&event(), "  Keynote moved to 11:00\n"),
            "📢 Program update for «RustConf»\n\nKeynote moved to 11:00"
        );
    }
}
