use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub experience: Option<String>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ParticipantListItem {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub experience: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub questions_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantFilter {
    pub q: Option<String>,
    pub experience: Option<String>,
}

/// Self-reported seniority, collected by the `/profile` dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Experience {
    Junior,
    Middle,
    Senior,
    Lead,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::Junior,
        Experience::Middle,
        Experience::Senior,
        Experience::Lead,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Experience::Junior => "junior",
            Experience::Middle => "middle",
            Experience::Senior => "senior",
            Experience::Lead => "lead",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Experience::Junior => "Junior",
            Experience::Middle => "Middle",
            Experience::Senior => "Senior",
            Experience::Lead => "Lead / Head",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == value)
    }
}

const PARTICIPANT_COLUMNS: &str =
    "id, telegram_id, username, full_name, company, position, experience, registered_at";

impl Participant {
    /// Name shown to organizers: full name, then `@username`, then the raw id.
    pub fn display_name(&self) -> String {
        display_name(&self.full_name, self.username.as_deref(), self.telegram_id)
    }

    pub fn has_profile(&self) -> bool {
        self.company.is_some() || self.position.is_some()
    }

    /// Returns the participant and whether it was created by this call.
    /// Existing records keep their stored username and name.
    pub async fn get_or_create(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
        username: Option<String>,
        full_name: String,
    ) -> Result<(Self, bool), sqlx::Error> {
        let inserted = sqlx::query(
            "INSERT INTO participants (telegram_id, username, full_name, registered_at) \
             VALUES (?, ?, ?, ?) ON CONFLICT (telegram_id) DO NOTHING",
        )
        .bind(telegram_id)
        .bind(username)
        .bind(full_name.trim())
        .bind(Utc::now())
        .execute(pool)
        .await?
        .rows_affected()
            > 0;

        let participant = Self::find_by_telegram_id(pool, telegram_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok((participant, inserted))
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE telegram_id = ?"
        ))
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_profile(
        pool: &sqlx::SqlitePool,
        id: i64,
        company: &str,
        position: &str,
        experience: Experience,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE participants SET company = ?, position = ?, experience = ? WHERE id = ?",
        )
        .bind(company.trim())
        .bind(position.trim())
        .bind(experience.as_str())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn update(
        pool: &sqlx::SqlitePool,
        id: i64,
        input: &ParticipantInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE participants SET full_name = ?, username = ?, company = ?, position = ?, experience = ? \
             WHERE id = ?",
        )
        .bind(input.full_name.trim())
        .bind(&input.username)
        .bind(&input.company)
        .bind(&input.position)
        .bind(&input.experience)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM participants WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Other participants who filled in a networking profile.
    pub async fn networking_candidates(
        pool: &sqlx::SqlitePool,
        exclude_telegram_id: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE telegram_id != ? AND (company IS NOT NULL OR position IS NOT NULL) \
             ORDER BY RANDOM() LIMIT ?"
        ))
        .bind(exclude_telegram_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Telegram ids of the given participants, or of everyone when `ids` is empty.
    pub async fn telegram_ids(pool: &sqlx::SqlitePool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT telegram_id FROM participants");
        if !ids.is_empty() {
            builder.push(" WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        builder.push(" ORDER BY id");

        let rows = builder.build_query_as::<(i64,)>().fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(telegram_id,)| telegram_id).collect())
    }

    /// Admin listing, newest registrations first.
    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &ParticipantFilter,
    ) -> Result<Vec<ParticipantListItem>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT p.id, p.telegram_id, p.username, p.full_name, p.company, p.position, \
             p.experience, p.registered_at, \
             (SELECT COUNT(*) FROM questions q WHERE q.participant_id = p.id) AS questions_count \
             FROM participants p WHERE 1 = 1",
        );

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            builder
                .push(" AND (p.full_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.username LIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.company LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(experience) = filter.experience.as_deref() {
            builder.push(" AND p.experience = ").push_bind(experience.to_string());
        }
        builder.push(" ORDER BY p.registered_at DESC, p.id DESC");

        builder.build_query_as::<ParticipantListItem>().fetch_all(pool).await
    }
}

impl ParticipantListItem {
    pub fn display_name(&self) -> String {
        display_name(&self.full_name, self.username.as_deref(), self.telegram_id)
    }
}

pub fn display_name(full_name: &str, username: Option<&str>, telegram_id: i64) -> String {
    let full_name = full_name.trim();
    if !full_name.is_empty() {
        return full_name.to_string();
    }
    match username.filter(|u| !u.is_empty()) {
        Some(username) => format!("@{username}"),
        None => telegram_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(display_name("Ada Lovelace", Some("ada"), 1), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_falls_back_to_username_then_id() {
        assert_eq!(display_name("  ", Some("ada"), 1), "@ada");
        assert_eq!(display_name("", None, 42), "42");
        assert_eq!(display_name("", Some(""), 42), "42");
    }

    #[test]
    fn test_experience_parse() {
        assert_eq!(Experience::parse("senior"), Some(Experience::Senior));
        assert_eq!(Experience::parse("Senior"), None);
        assert_eq!(Experience::parse("guru"), None);
        for level in Experience::ALL {
            assert_eq!(Experience::parse(level.as_str()), Some(level));
        }
    }
}
