use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Speaker {
    pub id: i64,
    pub name: String,
    /// Links the speaker profile to a Telegram account for `/questions`.
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SpeakerListItem {
    pub id: i64,
    pub name: String,
    pub telegram_id: Option<i64>,
    pub speeches_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerInput {
    pub name: String,
    #[serde(default)]
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeakerFilter {
    pub q: Option<String>,
}

impl Speaker {
    pub async fn create(pool: &sqlx::SqlitePool, input: &SpeakerInput) -> Result<Self, sqlx::Error> {
        let id = sqlx::query("INSERT INTO speakers (name, telegram_id) VALUES (?, ?)")
            .bind(input.name.trim())
            .bind(input.telegram_id)
            .execute(pool)
            .await?
            .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speaker>("SELECT id, name, telegram_id FROM speakers WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speaker>(
            "SELECT id, name, telegram_id FROM speakers WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &sqlx::SqlitePool,
        id: i64,
        input: &SpeakerInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query("UPDATE speakers SET name = ?, telegram_id = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(input.telegram_id)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM speakers WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &SpeakerFilter,
    ) -> Result<Vec<SpeakerListItem>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT sp.id, sp.name, sp.telegram_id, \
             (SELECT COUNT(*) FROM speeches s WHERE s.speaker_id = sp.id) AS speeches_count \
             FROM speakers sp WHERE 1 = 1",
        );
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            builder.push(" AND sp.name LIKE ").push_bind(format!("%{q}%"));
        }
        builder.push(" ORDER BY sp.name");

        builder.build_query_as::<SpeakerListItem>().fetch_all(pool).await
    }
}
