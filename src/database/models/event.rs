use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin list row: the event plus its subscriber count.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventListItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub subscribers_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub q: Option<String>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

const EVENT_COLUMNS: &str = "id, title, description, date, is_active, created_at";

impl Event {
    pub async fn create(pool: &sqlx::SqlitePool, input: &EventInput) -> Result<Self, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO events (title, description, date, is_active, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.date)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active_by_id(
        pool: &sqlx::SqlitePool,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = ? AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Active events, soonest first.
    pub async fn find_active(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 ORDER BY date, id"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn first_active(pool: &sqlx::SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active = 1 ORDER BY date, id LIMIT 1"
        ))
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_ids(pool: &sqlx::SqlitePool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY date, id");

        builder.build_query_as::<Event>().fetch_all(pool).await
    }

    pub async fn update(
        pool: &sqlx::SqlitePool,
        id: i64,
        input: &EventInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET title = ?, description = ?, date = ?, is_active = ? WHERE id = ?",
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.date)
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
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin listing, newest date first.
    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &EventFilter,
    ) -> Result<Vec<EventListItem>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT e.id, e.title, e.description, e.date, e.is_active, e.created_at, \
             (SELECT COUNT(*) FROM subscriptions s WHERE s.event_id = e.id) AS subscribers_count \
             FROM events e WHERE 1 = 1",
        );

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            builder
                .push(" AND (e.title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(is_active) = filter.is_active {
            builder.push(" AND e.is_active = ").push_bind(is_active);
        }
        builder.push(" ORDER BY e.date DESC, e.id DESC");

        builder.build_query_as::<EventListItem>().fetch_all(pool).await
    }
}
