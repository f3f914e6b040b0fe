use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error as SqlxError;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::db::store::{DocStore, StoreError};
use crate::models::Document;

/// Run in order by `migrate`; every statement is idempotent
const SCHEMA_SQL: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id          UUID PRIMARY KEY,
        title       TEXT NOT NULL DEFAULT 'Untitled Document',
        content     TEXT NOT NULL DEFAULT '',
        owner       TEXT NOT NULL,
        editors     TEXT[] NOT NULL DEFAULT '{}',
        seekers     TEXT[] NOT NULL DEFAULT '{}',
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "ALTER TABLE documents ADD COLUMN IF NOT EXISTS share_token TEXT UNIQUE",
    "ALTER TABLE documents ADD COLUMN IF NOT EXISTS share_access_level TEXT",
];

const DOC_COLUMNS: &str =
    "id, title, content, owner, editors, seekers, created_at, updated_at, share_token, share_access_level";

/// Postgres backed document store
pub struct PgDocStore {
    pool: PgPool,
}

impl PgDocStore {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn connect(database_url: &str) -> Result<Self, SqlxError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // Close idle connections after 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // Recycle connections after 30 minutes
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create the documents table if it does not exist yet
    pub async fn migrate(&self) -> Result<(), SqlxError> {
        for statement in SCHEMA_SQL {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    fn log_pool_stats(&self, action: &str, id: &Uuid) {
        let pool_idle = self.pool.num_idle() as u32;
        let pool_size = self.pool.size();
        debug!(
            "{} document {}. Pool connections: {} idle, {} in use",
            action,
            id,
            pool_idle,
            pool_size.saturating_sub(pool_idle)
        );
    }

    async fn exists(&self, id: Uuid) -> Result<bool, SqlxError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM documents WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait]
impl DocStore for PgDocStore {
    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        self.log_pool_stats("Loading", &id);
        let sql = format!("SELECT {} FROM documents WHERE id = $1", DOC_COLUMNS);
        let doc = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to load document {}: {}", id, e);
                e
            })?;
        Ok(doc)
    }

    async fn insert(&self, doc: &Document) -> Result<(), StoreError> {
        self.log_pool_stats("Creating", &doc.id);
        sqlx::query(
            r#"
            INSERT INTO documents (id, title, content, owner, editors, seekers, created_at, updated_at,
                                   share_token, share_access_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(doc.id)
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&doc.owner)
        .bind(&doc.editors)
        .bind(&doc.seekers)
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .bind(&doc.share_token)
        .bind(&doc.share_access_level)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Option<Document>, StoreError> {
        self.log_pool_stats("Updating", &id);
        let sql = format!(
            r#"
            UPDATE documents
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            DOC_COLUMNS
        );
        let doc = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(title)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.log_pool_stats("Deleting", &id);
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, uid: &str) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM documents
            WHERE owner = $1 OR $1 = ANY(editors) OR $1 = ANY(seekers)
            ORDER BY updated_at DESC
            "#,
            DOC_COLUMNS
        );
        let docs = sqlx::query_as::<_, Document>(&sql)
            .bind(uid)
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    async fn add_seeker(&self, id: Uuid, uid: &str) -> Result<Option<bool>, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET seekers = array_append(seekers, $2::text)
            WHERE id = $1
                AND owner <> $2::text
                AND NOT ($2::text = ANY(editors))
                AND NOT ($2::text = ANY(seekers))
            "#,
        )
        .bind(id)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(Some(true));
        }
        Ok(self.exists(id).await?.then_some(false))
    }

    async fn promote_seeker(&self, id: Uuid, uid: &str) -> Result<Option<bool>, StoreError> {
        // Both lists change in one statement
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET seekers = array_remove(seekers, $2::text),
                editors = CASE
                    WHEN $2::text = ANY(editors) THEN editors
                    ELSE array_append(editors, $2::text)
                END
            WHERE id = $1 AND $2::text = ANY(seekers)
            "#,
        )
        .bind(id)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(Some(true));
        }
        Ok(self.exists(id).await?.then_some(false))
    }

    async fn set_share_token(&self, id: Uuid, token: &str, access_level: &str) -> Result<bool, StoreError> {
        self.log_pool_stats("Sharing", &id);
        let result = sqlx::query(
            "UPDATE documents SET share_token = $2, share_access_level = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(access_level)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
