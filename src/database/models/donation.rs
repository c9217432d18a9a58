use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub participant_id: i64,
    /// Whole currency units.
    pub amount: i64,
    pub currency: String,
    pub telegram_charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DonationListItem {
    pub id: i64,
    pub participant_id: i64,
    pub participant_name: String,
    pub amount: i64,
    pub currency: String,
    pub telegram_charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonationInput {
    pub participant_id: i64,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub telegram_charge_id: Option<String>,
}

impl Donation {
    pub async fn create(pool: &sqlx::SqlitePool, input: &DonationInput) -> Result<Self, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO donations (participant_id, amount, currency, telegram_charge_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(input.participant_id)
        .bind(input.amount)
        .bind(input.currency.trim().to_uppercase())
        .bind(&input.telegram_charge_id)
        .bind(Utc::now())
        .execute(pool)
        .await?
        .last_insert_rowid();

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            "SELECT id, participant_id, amount, currency, telegram_charge_id, created_at \
             FROM donations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &sqlx::SqlitePool) -> Result<Vec<DonationListItem>, sqlx::Error> {
        sqlx::query_as::<_, DonationListItem>(
            "SELECT d.id, d.participant_id, \
             COALESCE(NULLIF(p.full_name, ''), '@' || p.username, CAST(p.telegram_id AS TEXT)) AS participant_name, \
             d.amount, d.currency, d.telegram_charge_id, d.created_at \
             FROM donations d JOIN participants p ON p.id = d.participant_id \
             ORDER BY d.created_at DESC, d.id DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn total_for_participant(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0) FROM donations WHERE participant_id = ?",
        )
        .bind(participant_id)
        .fetch_one(pool)
        .await
    }
}
