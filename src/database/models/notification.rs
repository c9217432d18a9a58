use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

/// Log of every broadcast sent to participants.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub event_id: Option<i64>,
    pub speech_id: Option<i64>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_sent: bool,
    pub sent_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ProgramChange,
    NewEvent,
    Reminder,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::ProgramChange => "program_change",
            NotificationKind::NewEvent => "new_event",
            NotificationKind::Reminder => "reminder",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    pub notification_type: Option<String>,
    pub is_sent: Option<bool>,
    pub event_id: Option<i64>,
}

const NOTIFICATION_COLUMNS: &str =
    "id, event_id, speech_id, notification_type, title, message, is_sent, sent_count, created_at";

impl Notification {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        kind: NotificationKind,
        event_id: Option<i64>,
        speech_id: Option<i64>,
        title: &str,
        message: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO notifications (event_id, speech_id, notification_type, title, message, \
             is_sent, sent_count, created_at) VALUES (?, ?, ?, ?, ?, 0, 0, ?)",
        )
        .bind(event_id)
        .bind(speech_id)
        .bind(kind.as_str())
        .bind(title)
        .bind(message)
        .bind(Utc::now())
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn mark_sent(
        pool: &sqlx::SqlitePool,
        id: i64,
        sent_count: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET is_sent = 1, sent_count = ? WHERE id = ?")
            .bind(sent_count)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists_for_speech(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
        kind: NotificationKind,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE speech_id = ? AND notification_type = ?",
        )
        .bind(speech_id)
        .bind(kind.as_str())
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &NotificationFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE 1 = 1"
        ));
        if let Some(kind) = filter.notification_type.as_deref() {
            builder.push(" AND notification_type = ").push_bind(kind.to_string());
        }
        if let Some(is_sent) = filter.is_sent {
            builder.push(" AND is_sent = ").push_bind(is_sent);
        }
        if let Some(event_id) = filter.event_id {
            builder.push(" AND event_id = ").push_bind(event_id);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder.build_query_as::<Notification>().fetch_all(pool).await
    }
}
