//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct ClickRow {
    id: Uuid,
    short_link_id: Uuid,
    country: String,
    flag: String,
    clicked_at: DateTime<Utc>,
}

/// PostgreSQL repository for recorded clicks.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row: ClickRow = sqlx::query_as(
            r#"
            INSERT INTO clicks (id, short_link_id, country, flag, clicked_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, short_link_id, country, flag, clicked_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_click.short_link_id)
        .bind(&new_click.country)
        .bind(&new_click.flag)
        .bind(new_click.clicked_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Click {
            id: row.id,
            short_link_id: row.short_link_id,
            country: row.country,
            flag: row.flag,
            clicked_at: row.clicked_at,
        })
    }

    async fn count_by_link_id(&self, link_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE short_link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
