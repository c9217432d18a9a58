use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Speech {
    pub id: i64,
    pub event_id: i64,
    pub speaker_id: i64,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
}

/// A speech joined with its event title and speaker name.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SpeechDetails {
    pub id: i64,
    pub event_id: i64,
    pub event_title: String,
    pub speaker_id: i64,
    pub speaker_name: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechInput {
    pub event_id: i64,
    pub speaker_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechFilter {
    pub q: Option<String>,
    pub is_active: Option<bool>,
    pub event_id: Option<i64>,
    pub speaker_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

const SPEECH_COLUMNS: &str =
    "id, event_id, speaker_id, title, description, start_time, end_time, is_active";

const DETAILS_SELECT: &str = "SELECT s.id, s.event_id, e.title AS event_title, s.speaker_id, \
     sp.name AS speaker_name, s.title, s.start_time, s.end_time, s.is_active \
     FROM speeches s \
     JOIN events e ON e.id = s.event_id \
     JOIN speakers sp ON sp.id = s.speaker_id";

impl Speech {
    pub async fn create(pool: &sqlx::SqlitePool, input: &SpeechInput) -> Result<Self, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO speeches (event_id, speaker_id, title, description, start_time, end_time, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(input.event_id)
        .bind(input.speaker_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.is_active)
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speech>(&format!("SELECT {SPEECH_COLUMNS} FROM speeches WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &sqlx::SqlitePool,
        id: i64,
        input: &SpeechInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE speeches SET event_id = ?, speaker_id = ?, title = ?, description = ?, \
             start_time = ?, end_time = ?, is_active = ? WHERE id = ?",
        )
        .bind(input.event_id)
        .bind(input.speaker_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.is_active)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM speeches WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The speaker's most recent speech at the given event.
    pub async fn latest_for_speaker(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        speaker_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speech>(&format!(
            "SELECT {SPEECH_COLUMNS} FROM speeches WHERE event_id = ? AND speaker_id = ? \
             ORDER BY start_time DESC LIMIT 1"
        ))
        .bind(event_id)
        .bind(speaker_id)
        .fetch_optional(pool)
        .await
    }
}

impl SpeechDetails {
    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechDetails>(&format!("{DETAILS_SELECT} WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ids(pool: &sqlx::SqlitePool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!("{DETAILS_SELECT} WHERE s.id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY s.start_time");

        builder.build_query_as::<SpeechDetails>().fetch_all(pool).await
    }

    /// The speech running at `now`, if any. The speech's own `is_active`
    /// flag is ignored; the time window alone decides.
    pub async fn active_at(
        pool: &sqlx::SqlitePool,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechDetails>(&format!(
            "{DETAILS_SELECT} WHERE s.start_time <= ? AND s.end_time >= ? \
             ORDER BY s.start_time, s.id LIMIT 1"
        ))
        .bind(now)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Every speech of every active event, grouped by event.
    pub async fn for_active_events(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechDetails>(&format!(
            "{DETAILS_SELECT} WHERE e.is_active = 1 ORDER BY e.date, e.id, s.start_time, s.id"
        ))
        .fetch_all(pool)
        .await
    }

    /// Active speeches of active events starting in `(from, until]`.
    pub async fn starting_between(
        pool: &sqlx::SqlitePool,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechDetails>(&format!(
            "{DETAILS_SELECT} WHERE e.is_active = 1 AND s.is_active = 1 \
             AND s.start_time > ? AND s.start_time <= ? ORDER BY s.start_time"
        ))
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    /// Admin listing, newest start first.
    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &SpeechFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("{DETAILS_SELECT} WHERE 1 = 1"));

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            builder
                .push(" AND (s.title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR s.description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(is_active) = filter.is_active {
            builder.push(" AND s.is_active = ").push_bind(is_active);
        }
        if let Some(event_id) = filter.event_id {
            builder.push(" AND s.event_id = ").push_bind(event_id);
        }
        if let Some(speaker_id) = filter.speaker_id {
            builder.push(" AND s.speaker_id = ").push_bind(speaker_id);
        }
        builder.push(" ORDER BY s.start_time DESC, s.id DESC");

        builder.build_query_as::<SpeechDetails>().fetch_all(pool).await
    }
}
