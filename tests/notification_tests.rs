use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, FixedOffset, Utc};
use conference_bot::database::{connection::DatabaseManager, models::*};
use conference_bot::services::notifications::{
    DeliveryError, DisabledSender, MessageSender, NotificationService,
};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Records deliveries instead of talking to Telegram. Chats listed in
/// `failing` reject every message.
#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
    failing: Vec<i64>,
}

impl RecordingSender {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        if self.failing.contains(&chat_id) {
            return Err(DeliveryError::BotDisabled);
        }
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

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

async fn event(db: &DatabaseManager, title: &str) -> Result<Event> {
    Ok(Event::create(
        &db.pool,
        &EventInput {
            title: title.to_string(),
            description: String::new(),
            date: Utc::now(),
            is_active: true,
        },
    )
    .await?)
}

async fn subscriber(db: &DatabaseManager, telegram_id: i64, event_id: i64) -> Result<Subscription> {
    let (participant, _) =
        Participant::get_or_create(&db.pool, telegram_id, None, format!("User {telegram_id}")).await?;
    let (subscription, _) = Subscription::get_or_create(&db.pool, participant.id, event_id).await?;
    Ok(subscription)
}

#[tokio::test]
async fn test_program_change_reaches_flagged_subscribers() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender.clone(), utc());

    let conf = event(&db, "RustConf").await?;
    subscriber(&db, 100, conf.id).await?;
    let opted_out = subscriber(&db, 200, conf.id).await?;
    Subscription::toggle(&db.pool, opted_out.id, SubscriptionFlag::ProgramChanges).await?;

    let sent = service
        .send_program_change_notification(&conf, "Keynote moved to 11:00")
        .await?;

    assert_eq!(sent, 1);
    let deliveries = sender.sent();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, 100);
    assert!(deliveries[0].1.contains("Keynote moved to 11:00"));

    let log = Notification::list(&db.pool, &NotificationFilter::default()).await?;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].notification_type, "program_change");
    assert_eq!(log[0].event_id, Some(conf.id));
    assert!(log[0].is_sent);
    assert_eq!(log[0].sent_count, 1);

    Ok(())
}

#[tokio::test]
async fn test_failed_deliveries_are_not_counted() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender {
        failing: vec![200],
        ..Default::default()
    });
    let service = NotificationService::new(db.clone(), sender.clone(), utc());

    let conf = event(&db, "RustConf").await?;
    subscriber(&db, 100, conf.id).await?;
    subscriber(&db, 200, conf.id).await?;
    subscriber(&db, 300, conf.id).await?;

    let sent = service.send_reminder_notification(&conf, None).await?;
    assert_eq!(sent, 2);

    let recipients: Vec<i64> = sender.sent().into_iter().map(|(chat, _)| chat).collect();
    assert_eq!(recipients, vec![100, 300]);

    Ok(())
}

#[tokio::test]
async fn test_new_event_announcement() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender.clone(), utc());

    let old = event(&db, "Meetup").await?;
    let new = event(&db, "RustConf").await?;
    subscriber(&db, 100, old.id).await?;
    subscriber(&db, 200, old.id).await?;
    subscriber(&db, 200, new.id).await?;

    let sent = service.send_new_event_notification(&new).await?;

    assert_eq!(sent, 1);
    assert_eq!(sender.sent()[0].0, 100);
    assert!(sender.sent()[0].1.starts_with("🆕 New event: «RustConf»"));

    Ok(())
}

#[tokio::test]
async fn test_speech_reminder_records_speech() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let sender = Arc::new(RecordingSender::default());
    let service = NotificationService::new(db.clone(), sender.clone(), utc());

    let conf = event(&db, "RustConf").await?;
    subscriber(&db, 100, conf.id).await?;
    let speaker = Speaker::create(
        &db.pool,
        &SpeakerInput {
            name: "Ada".to_string(),
            telegram_id: None,
        },
    )
    .await?;
    let start = Utc::now() + Duration::minutes(10);
    let speech = Speech::create(
        &db.pool,
        &SpeechInput {
            event_id: conf.id,
            speaker_id: speaker.id,
            title: "Ownership".to_string(),
            description: String::new(),
            start_time: start,
            end_time: start + Duration::minutes(30),
            is_active: true,
        },
    )
    .await?;
    let details = SpeechDetails::find_by_id(&db.pool, speech.id).await?.unwrap();

    let sent = service.send_reminder_notification(&conf, Some(&details)).await?;

    assert_eq!(sent, 1);
    assert!(sender.sent()[0].1.starts_with("⏰ Reminder: «Ownership» by Ada"));
    assert!(Notification::exists_for_speech(&db.pool, speech.id, NotificationKind::Reminder).await?);

    Ok(())
}

#[tokio::test]
async fn test_disabled_sender_still_logs_notification() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let service = NotificationService::new(db.clone(), Arc::new(DisabledSender), utc());

    let conf = event(&db, "RustConf").await?;
    subscriber(&db, 100, conf.id).await?;

    let sent = service
        .send_program_change_notification(&conf, "Room changed")
        .await?;
    assert_eq!(sent, 0);

    let log = Notification::list(
        &db.pool,
        &NotificationFilter {
            is_sent: Some(true),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].sent_count, 0);

    Ok(())
}
