use anyhow::{Context, Result};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::path::Path;
use tracing::info;

/// Shared handle to the conference database.
#[derive(Clone)]
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_parent_dir(database_url)?;

        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to {database_url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Lists user tables, used by the `migrate check` command.
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// `(version, description)` of every migration recorded by sqlx,
    /// oldest first. Empty when the schema was never migrated.
    pub async fn applied_migrations(&self) -> Result<Vec<(i64, String)>> {
        let tables = self.table_names().await?;
        if !tables.iter().any(|name| name == "_sqlx_migrations") {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT version, description FROM _sqlx_migrations WHERE success = 1 ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// File path behind a `sqlite:` URL, `None` for in-memory databases.
pub fn sqlite_path(database_url: &str) -> Option<&str> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    (!path.is_empty() && path != ":memory:").then_some(path)
}

fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(parent) = sqlite_path(database_url).and_then(|path| Path::new(path).parent()) else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() && !parent.exists() {
        info!("Creating directory {}", parent.display());
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_path() {
        assert_eq!(sqlite_path("sqlite:./data/conference.db"), Some("./data/conference.db"));
        assert_eq!(sqlite_path("sqlite:///tmp/c.db?mode=rwc"), Some("/tmp/c.db"));
        assert_eq!(sqlite_path("sqlite::memory:"), None);
        assert_eq!(sqlite_path("postgres://localhost/db"), None);
    }
}
