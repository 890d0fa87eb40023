//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, short_code, destination, owner_id, is_protected, \
     password_hash, expires_at, click_limit, created_at";

#[derive(FromRow)]
struct ShortLinkRow {
    id: Uuid,
    short_code: String,
    destination: String,
    owner_id: Uuid,
    is_protected: bool,
    password_hash: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    click_limit: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(row: ShortLinkRow) -> Self {
        ShortLink {
            id: row.id,
            short_code: row.short_code,
            destination: row.destination,
            owner_id: row.owner_id,
            is_protected: row.is_protected,
            password_hash: row.password_hash,
            expires_at: row.expires_at,
            click_limit: row.click_limit,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for short links.
///
/// Uses SQLx prepared statements for SQL injection protection.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            r#"
            INSERT INTO short_links
                (id, short_code, destination, owner_id, is_protected,
                 password_hash, expires_at, click_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row: ShortLinkRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_link.short_code)
            .bind(&new_link.destination)
            .bind(new_link.owner_id)
            .bind(new_link.is_protected)
            .bind(&new_link.password_hash)
            .bind(new_link.expires_at)
            .bind(new_link.click_limit)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE short_code = $1");

        let row: Option<ShortLinkRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE id = $1");

        let row: Option<ShortLinkRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_owner_and_destination(
        &self,
        owner_id: Uuid,
        destination: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM short_links WHERE owner_id = $1 AND destination = $2"
        );

        let row: Option<ShortLinkRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(destination)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn decrement_click_limit(&self, id: Uuid) -> Result<Option<i32>, AppError> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE short_links
            SET click_limit = click_limit - 1
            WHERE id = $1 AND click_limit > 0
            RETURNING click_limit
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(remaining)
    }

    async fn delete_with_clicks(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM clicks WHERE short_link_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let code: Option<String> =
            sqlx::query_scalar("DELETE FROM short_links WHERE id = $1 RETURNING short_code")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(code)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
