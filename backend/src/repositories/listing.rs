//! Listing repository.
//!
//! Listings are only ever created, read newest-first, or deleted.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::listing::Listing;
use crate::types::ListingId;

const TABLE_NAME: &str = "listings";
const SELECT_COLUMNS: &str = "id, title, image_url, notes, created_at, owner_steam_id";

/// Repository trait for listing storage.
///
/// Use `MockListingRepositoryTrait` in unit tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepositoryTrait: Send + Sync {
    /// All listings, newest first.
    async fn list_all(&self) -> Result<Vec<Listing>, AppError>;

    async fn create(&self, listing: &Listing) -> Result<Listing, AppError>;

    /// Deletes the listing if present; a missing id is not an error.
    async fn delete_by_id(&self, id: ListingId) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepositoryTrait for ListingRepository {
    async fn list_all(&self) -> Result<Vec<Listing>, AppError> {
        let query = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS, TABLE_NAME
        );
        let rows = sqlx::query_as::<_, Listing>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, listing: &Listing) -> Result<Listing, AppError> {
        let query = format!(
            "INSERT INTO {} (id, title, image_url, notes, created_at, owner_steam_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Listing>(&query)
            .bind(listing.id)
            .bind(&listing.title)
            .bind(&listing.image_url)
            .bind(&listing.notes)
            .bind(listing.created_at)
            .bind(&listing.owner_steam_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: ListingId) -> Result<(), AppError> {
        let query = format!("DELETE FROM {} WHERE id = $1", TABLE_NAME);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        tracing::debug!(listing_id = %id, deleted = result.rows_affected(), "listing delete");
        Ok(())
    }
}
