use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use conference_bot::database::{connection::DatabaseManager, models::*};
use conference_bot::services::notifications::{DeliveryError, MessageSender, NotificationService};
use conference_bot::services::reminder::{send_due_reminders, ReminderService};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

/// An active event with one reminder subscriber and a single speaker.
async fn seed(db: &DatabaseManager) -> Result<(Event, Speaker)> {
    let event = Event::create(
        &db.pool,
        &EventInput {
            title: "RustConf".to_string(),
            description: String::new(),
            date: Utc::now(),
            is_active: true,
        },
    )
    .await?;
    let speaker = Speaker::create(
        &db.pool,
        &SpeakerInput {
            name: "Ada".to_string(),
            telegram_id: None,
        },
    )
    .await?;
    let (participant, _) = Participant::get_or_create(&db.pool, 100, None, "Grace".to_string()).await?;
    Subscription::get_or_create(&db.pool, participant.id, event.id).await?;

    Ok((event, speaker))
}

async fn speech_at(db: &DatabaseManager, event: &Event, speaker: &Speaker, title: &str, start: DateTime<Utc>) -> Result<Speech> {
    Ok(Speech::create(
        &db.pool,
        &SpeechInput {
            event_id: event.id,
            speaker_id: speaker.id,
            title: title.to_string(),
            description: String::new(),
            start_time: start,
            end_time: start + Duration::minutes(30),
            is_active: true,
        },
    )
    .await?)
}

#[tokio::test]
async fn test_reminder_sent_once_per_speech() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender.clone(), FixedOffset::east_opt(0).unwrap());
    let (event, speaker) = seed(&db).await?;

    let now = Utc::now();
    speech_at(&db, &event, &speaker, "Soon", now + Duration::minutes(10)).await?;
    speech_at(&db, &event, &speaker, "Later", now + Duration::hours(2)).await?;

    let reminded = send_due_reminders(&service, now, Duration::minutes(15)).await.unwrap();
    assert_eq!(reminded, 1);

    let again = send_due_reminders(&service, now, Duration::minutes(15)).await.unwrap();
    assert_eq!(again, 0);

    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 100);
    assert!(sent[0].1.contains("«Soon»"));

    Ok(())
}

#[tokio::test]
async fn test_inactive_speech_not_reminded() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender.clone(), FixedOffset::east_opt(0).unwrap());
    let (event, speaker) = seed(&db).await?;

    let now = Utc::now();
    let speech = speech_at(&db, &event, &speaker, "Cancelled", now + Duration::minutes(5)).await?;
    Speech::update(
        &db.pool,
        speech.id,
        &SpeechInput {
            event_id: event.id,
            speaker_id: speaker.id,
            title: speech.title.clone(),
            description: String::new(),
            start_time: speech.start_time,
            end_time: speech.end_time,
            is_active: false,
        },
    )
    .await?;

    assert_eq!(send_due_reminders(&service, now, Duration::minutes(15)).await.unwrap(), 0);
    assert!(sender.sent.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_short_lead_still_reminds_between_checks() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender.clone(), FixedOffset::east_opt(0).unwrap());
    let (event, speaker) = seed(&db).await?;

    let first_check = Utc::now();
    speech_at(&db, &event, &speaker, "Lightning talk", first_check + Duration::minutes(2)).await?;

    let mut reminded = 0;
    for minutes in [0, 5, 10] {
        reminded += send_due_reminders(&service, first_check + Duration::minutes(minutes), Duration::minutes(1))
            .await
            .unwrap();
    }
    assert_eq!(reminded, 1);

    let sent = sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("«Lightning talk»"));

    Ok(())
}

#[tokio::test]
async fn test_reminder_service_lifecycle() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender, FixedOffset::east_opt(0).unwrap());

    let mut reminders = ReminderService::new(service, 15).await.unwrap();
    reminders.start().await.unwrap();
    assert_eq!(reminders.check_reminders_now().await.unwrap(), 0);
    reminders.stop().await.unwrap();

    Ok(())
}
