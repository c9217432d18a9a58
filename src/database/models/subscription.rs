use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub participant_id: i64,
    pub event_id: i64,
    pub notify_program_changes: bool,
    pub notify_new_events: bool,
    pub notify_reminders: bool,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubscriptionListItem {
    pub id: i64,
    pub participant_id: i64,
    pub participant_name: String,
    pub event_id: i64,
    pub event_title: String,
    pub notify_program_changes: bool,
    pub notify_new_events: bool,
    pub notify_reminders: bool,
    pub subscribed_at: DateTime<Utc>,
}

/// Partial update of the notification flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionFlagsPatch {
    pub notify_program_changes: Option<bool>,
    pub notify_new_events: Option<bool>,
    pub notify_reminders: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionFilter {
    pub event_id: Option<i64>,
    pub q: Option<String>,
}

/// One of the three per-subscription notification switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionFlag {
    ProgramChanges,
    NewEvents,
    Reminders,
}

impl SubscriptionFlag {
    pub const ALL: [SubscriptionFlag; 3] = [
        SubscriptionFlag::ProgramChanges,
        SubscriptionFlag::NewEvents,
        SubscriptionFlag::Reminders,
    ];

    fn column(self) -> &'static str {
        match self {
            SubscriptionFlag::ProgramChanges => "notify_program_changes",
            SubscriptionFlag::NewEvents => "notify_new_events",
            SubscriptionFlag::Reminders => "notify_reminders",
        }
    }

    /// Short key used in callback data (`toggle_<key>_<id>`, `info_<key>`).
    pub fn key(self) -> &'static str {
        match self {
            SubscriptionFlag::ProgramChanges => "program",
            SubscriptionFlag::NewEvents => "events",
            SubscriptionFlag::Reminders => "reminders",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            SubscriptionFlag::ProgramChanges => "Program changes",
            SubscriptionFlag::NewEvents => "New events",
            SubscriptionFlag::Reminders => "Reminders",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SubscriptionFlag::ProgramChanges => "Get notified about changes to the event program",
            SubscriptionFlag::NewEvents => "Get notified when new events are announced",
            SubscriptionFlag::Reminders => "Get reminders before talks start",
        }
    }
}

const SUBSCRIPTION_COLUMNS: &str = "id, participant_id, event_id, notify_program_changes, \
     notify_new_events, notify_reminders, subscribed_at";

impl Subscription {
    pub fn flag(&self, flag: SubscriptionFlag) -> bool {
        match flag {
            SubscriptionFlag::ProgramChanges => self.notify_program_changes,
            SubscriptionFlag::NewEvents => self.notify_new_events,
            SubscriptionFlag::Reminders => self.notify_reminders,
        }
    }

    /// Returns the subscription and whether it was created by this call.
    /// New subscriptions start with every flag enabled.
    pub async fn get_or_create(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
        event_id: i64,
    ) -> Result<(Self, bool), sqlx::Error> {
        let created = sqlx::query(
            "INSERT INTO subscriptions (participant_id, event_id, notify_program_changes, \
             notify_new_events, notify_reminders, subscribed_at) \
             VALUES (?, ?, 1, 1, 1, ?) ON CONFLICT (participant_id, event_id) DO NOTHING",
        )
        .bind(participant_id)
        .bind(event_id)
        .bind(Utc::now())
        .execute(pool)
        .await?
        .rows_affected()
            > 0;

        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE participant_id = ? AND event_id = ?"
        ))
        .bind(participant_id)
        .bind(event_id)
        .fetch_one(pool)
        .await?;

        Ok((subscription, created))
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_for_participant(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE participant_id = ?")
            .bind(participant_id)
            .fetch_one(pool)
            .await
    }

    /// Flips a single flag and returns the updated row.
    pub async fn toggle(
        pool: &sqlx::SqlitePool,
        id: i64,
        flag: SubscriptionFlag,
    ) -> Result<Option<Self>, sqlx::Error> {
        let column = flag.column();
        let result = sqlx::query(&format!(
            "UPDATE subscriptions SET {column} = NOT {column} WHERE id = ?"
        ))
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn update_flags(
        pool: &sqlx::SqlitePool,
        id: i64,
        patch: &SubscriptionFlagsPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET \
             notify_program_changes = COALESCE(?, notify_program_changes), \
             notify_new_events = COALESCE(?, notify_new_events), \
             notify_reminders = COALESCE(?, notify_reminders) \
             WHERE id = ?",
        )
        .bind(patch.notify_program_changes)
        .bind(patch.notify_new_events)
        .bind(patch.notify_reminders)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Switches every flag off on every subscription of the participant.
    pub async fn disable_all_for_participant(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET notify_program_changes = 0, notify_new_events = 0, \
             notify_reminders = 0 WHERE participant_id = ?",
        )
        .bind(participant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Chat ids of the event's subscribers with `flag` enabled.
    pub async fn recipients(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        flag: SubscriptionFlag,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let column = flag.column();
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT p.telegram_id FROM subscriptions s \
             JOIN participants p ON p.id = s.participant_id \
             WHERE s.event_id = ? AND s.{column} = 1 ORDER BY s.id"
        ))
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Everyone who wants to hear about new events and has not already
    /// subscribed to this one.
    pub async fn new_event_recipients(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT p.telegram_id FROM subscriptions s \
             JOIN participants p ON p.id = s.participant_id \
             WHERE s.notify_new_events = 1 \
             AND p.id NOT IN (SELECT participant_id FROM subscriptions WHERE event_id = ?) \
             ORDER BY p.telegram_id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list(
        pool: &sqlx::SqlitePool,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SubscriptionListItem>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT s.id, s.participant_id, \
             COALESCE(NULLIF(p.full_name, ''), '@' || p.username, CAST(p.telegram_id AS TEXT)) AS participant_name, \
             s.event_id, e.title AS event_title, s.notify_program_changes, s.notify_new_events, \
             s.notify_reminders, s.subscribed_at \
             FROM subscriptions s \
             JOIN participants p ON p.id = s.participant_id \
             JOIN events e ON e.id = s.event_id WHERE 1 = 1",
        );
        if let Some(event_id) = filter.event_id {
            builder.push(" AND s.event_id = ").push_bind(event_id);
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            builder
                .push(" AND (p.full_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.username LIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.title LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY s.subscribed_at DESC, s.id DESC");

        builder.build_query_as::<SubscriptionListItem>().fetch_all(pool).await
    }
}
