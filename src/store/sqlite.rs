//! SQLite-backed implementation of [`PdfStore`].

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{NewPdf, PdfRecord, PdfStore, PdfUpdate, StoreError};

const MAX_CONNECTIONS: u32 = 5;

/// Open a connection pool for `database_url` and ensure the schema exists.
///
/// In-memory databases are pinned to a single connection so every query sees the same data.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        MAX_CONNECTIONS
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    initialize_schema(&pool).await?;
    tracing::debug!(max_connections, "Database pool ready");
    Ok(pool)
}

async fn initialize_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pdfs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            selected INTEGER NOT NULL DEFAULT 0,
            file TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pdfs_selected ON pdfs(selected)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Record store over a shared SQLite pool.
#[derive(Clone)]
pub struct SqlitePdfStore {
    pool: SqlitePool,
}

impl SqlitePdfStore {
    /// Wrap an initialized pool (see [`create_pool`]).
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PdfStore for SqlitePdfStore {
    async fn create(&self, pdf: NewPdf) -> Result<PdfRecord, StoreError> {
        let record = sqlx::query_as::<_, PdfRecord>(
            r#"
            INSERT INTO pdfs (name, selected, file)
            VALUES (?, ?, ?)
            RETURNING id, name, selected, file
            "#,
        )
        .bind(&pdf.name)
        .bind(pdf.selected)
        .bind(&pdf.file)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = record.id, name = %record.name, "PDF record created");
        Ok(record)
    }

    async fn list(&self, selected: Option<bool>) -> Result<Vec<PdfRecord>, StoreError> {
        let records = match selected {
            Some(flag) => {
                sqlx::query_as::<_, PdfRecord>(
                    "SELECT id, name, selected, file FROM pdfs WHERE selected = ? ORDER BY id ASC",
                )
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PdfRecord>(
                    "SELECT id, name, selected, file FROM pdfs ORDER BY id ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<Option<PdfRecord>, StoreError> {
        let record = sqlx::query_as::<_, PdfRecord>(
            "SELECT id, name, selected, file FROM pdfs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update(&self, id: i64, update: PdfUpdate) -> Result<Option<PdfRecord>, StoreError> {
        let record = sqlx::query_as::<_, PdfRecord>(
            r#"
            UPDATE pdfs
            SET name = COALESCE(?, name),
                selected = COALESCE(?, selected),
                file = COALESCE(?, file)
            WHERE id = ?
            RETURNING id, name, selected, file
            "#,
        )
        .bind(update.name)
        .bind(update.selected)
        .bind(update.file)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM pdfs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
