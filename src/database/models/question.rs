use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub speech_id: i64,
    pub participant_id: i64,
    pub question_text: String,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}

/// A question together with who asked it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionWithAuthor {
    pub id: i64,
    pub speech_id: i64,
    pub speech_title: String,
    pub participant_id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub question_text: String,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionFilter {
    pub is_answered: Option<bool>,
    pub speech_id: Option<i64>,
    pub q: Option<String>,
}

const QUESTION_COLUMNS: &str = "id, speech_id, participant_id, question_text, is_answered, created_at";

const WITH_AUTHOR_SELECT: &str = "SELECT q.id, q.speech_id, s.title AS speech_title, q.participant_id, \
     p.telegram_id, p.username, p.full_name, q.question_text, q.is_answered, q.created_at \
     FROM questions q \
     JOIN participants p ON p.id = q.participant_id \
     JOIN speeches s ON s.id = q.speech_id";

impl Question {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
        participant_id: i64,
        question_text: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO questions (speech_id, participant_id, question_text, is_answered, created_at) \
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(speech_id)
        .bind(participant_id)
        .bind(question_text.trim())
        .bind(Utc::now())
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(&format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_answered(
        pool: &sqlx::SqlitePool,
        id: i64,
        is_answered: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query("UPDATE questions SET is_answered = ? WHERE id = ?")
            .bind(is_answered)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Questions for a speech in the order they were asked.
    pub async fn for_speech(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
    ) -> Result<Vec<QuestionWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, QuestionWithAuthor>(&format!(
            "{WITH_AUTHOR_SELECT} WHERE q.speech_id = ? ORDER BY q.created_at, q.id"
        ))
        .bind(speech_id)
        .fetch_all(pool)
        .await
    }

    /// Admin listing, newest first.
    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &QuestionFilter,
    ) -> Result<Vec<QuestionWithAuthor>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("{WITH_AUTHOR_SELECT} WHERE 1 = 1"));

        if let Some(is_answered) = filter.is_answered {
            builder.push(" AND q.is_answered = ").push_bind(is_answered);
        }
        if let Some(speech_id) = filter.speech_id {
            builder.push(" AND q.speech_id = ").push_bind(speech_id);
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            builder
                .push(" AND (q.question_text LIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.full_name LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY q.created_at DESC, q.id DESC");

        builder.build_query_as::<QuestionWithAuthor>().fetch_all(pool).await
    }
}

/// Truncates question text for list views.
pub fn short_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_keeps_short_questions() {
        assert_eq!(short_text("How?", 50), "How?");
        let exact = "a".repeat(50);
        assert_eq!(short_text(&exact, 50), exact);
    }

    #[test]
    fn test_short_text_truncates_on_char_boundary() {
        let long = "вопрос ".repeat(20);
        let short = short_text(&long, 50);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 53);
    }
}
