use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};

use shared::domain::{CounterId, Operation, COUNTER_ID};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredCounter {
    pub id: CounterId,
    pub value: i64,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;

        let storage = Self { pool };
        storage.ensure_counter_row().await?;
        Ok(storage)
    }

    // The single counter row is created eagerly so reads never observe an
    // empty table.
    async fn ensure_counter_row(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counters (
                id         INTEGER PRIMARY KEY,
                value      INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure counters table exists")?;

        sqlx::query("INSERT OR IGNORE INTO counters (id, value, updated_at) VALUES (?, 0, ?)")
            .bind(COUNTER_ID.0)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("failed to seed counter row")?;

        Ok(())
    }

    pub async fn load_counter(&self) -> Result<StoredCounter> {
        let row = sqlx::query("SELECT id, value, updated_at FROM counters WHERE id = ?")
            .bind(COUNTER_ID.0)
            .fetch_one(&self.pool)
            .await
            .context("failed to load counter row")?;

        Ok(StoredCounter {
            id: CounterId(row.get::<i64, _>("id")),
            value: row.get::<i64, _>("value"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        })
    }

    /// Applies `value ± 1` and stamps the mutation time in one statement,
    /// returning the replaced record.
    pub async fn apply_operation(&self, operation: Operation) -> Result<StoredCounter> {
        let row = sqlx::query(
            "UPDATE counters SET value = value + ?, updated_at = ? WHERE id = ?
             RETURNING id, value, updated_at",
        )
        .bind(operation.delta())
        .bind(Utc::now())
        .bind(COUNTER_ID.0)
        .fetch_one(&self.pool)
        .await
        .context("failed to apply counter operation")?;

        Ok(StoredCounter {
            id: CounterId(row.get::<i64, _>("id")),
            value: row.get::<i64, _>("value"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        })
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return Ok(());
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if path.is_empty() {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directory '{}' for database url '{database_url}'",
                    parent.display()
                )
            })?;
        }
    }

    Ok(())
}
