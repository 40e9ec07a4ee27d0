//! Favorites repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pur_beurre_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::favorite::FavoriteLink;

/// Persistence for the user to product bookmark relation.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert a link. Returns `false` if it already existed.
    async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError>;

    /// Delete a link. Returns `false` if it did not exist.
    async fn remove(&self, user_id: UserId, product_id: ProductId)
    -> Result<bool, RepositoryError>;

    /// All links of a user, newest first.
    async fn list(&self, user_id: UserId) -> Result<Vec<FavoriteLink>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    user_id: i64,
    product_id: i64,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for FavoriteLink {
    fn from(row: FavoriteRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` favorites repository.
#[derive(Debug, Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO pur_beurre.favorite (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM pur_beurre.favorite
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<FavoriteLink>, RepositoryError> {
        // id breaks ties between links created in the same transaction timestamp
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r"
            SELECT user_id, product_id, created_at
            FROM pur_beurre.favorite
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FavoriteLink::from).collect())
    }
}
