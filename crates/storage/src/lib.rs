use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{GuardianContact, PanicLogEntry};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn load_guardian_contact(&self) -> Result<Option<GuardianContact>> {
        let row = sqlx::query("SELECT name, phone_number FROM guardian_contact WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .context("failed to load guardian contact")?;
        Ok(row.and_then(|r| {
            GuardianContact::from_raw(&r.get::<String, _>(0), &r.get::<String, _>(1))
        }))
    }

    pub async fn save_guardian_contact(&self, contact: &GuardianContact) -> Result<()> {
        sqlx::query(
            "INSERT INTO guardian_contact (id, name, phone_number, updated_at)
             VALUES (1, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                phone_number = excluded.phone_number,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(contact.name())
        .bind(contact.phone_number())
        .execute(&self.pool)
        .await
        .context("failed to save guardian contact")?;
        Ok(())
    }

    pub async fn append_panic_log(&self) -> Result<PanicLogEntry> {
        self.append_panic_log_at(Utc::now()).await
    }

    /// Appends an entry no earlier than the newest one already in the ledger.
    pub async fn append_panic_log_at(&self, at: DateTime<Utc>) -> Result<PanicLogEntry> {
        let at_ns = at.timestamp_nanos_opt().unwrap_or(i64::MAX);
        let row = sqlx::query(
            "INSERT INTO panic_log (logged_at_ns)
             SELECT MAX(?, COALESCE((SELECT MAX(logged_at_ns) FROM panic_log), 0))
             RETURNING logged_at_ns",
        )
        .bind(at_ns)
        .fetch_one(&self.pool)
        .await
        .context("failed to append panic log entry")?;
        Ok(PanicLogEntry {
            timestamp: DateTime::<Utc>::from_timestamp_nanos(row.get::<i64, _>(0)),
        })
    }

    pub async fn list_panic_log(&self) -> Result<Vec<PanicLogEntry>> {
        let rows = sqlx::query("SELECT logged_at_ns FROM panic_log ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list panic log")?;
        Ok(rows
            .into_iter()
            .map(|r| PanicLogEntry {
                timestamp: DateTime::<Utc>::from_timestamp_nanos(r.get::<i64, _>(0)),
            })
            .collect())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
