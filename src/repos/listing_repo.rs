/*
 * Responsibility
 * - SQLx operations for the listings table
 * - Takes a PgPool, returns rows; DB errors surface as RepoError
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct ListingRow {
    #[sqlx(rename = "listingId")]
    pub id: Uuid,
    #[sqlx(rename = "sellerId")]
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "priceCents")]
    pub price_cents: i64,
    pub category: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub async fn list_recent(db: &PgPool, limit: i64) -> Result<Vec<ListingRow>, RepoError> {
    let rows = sqlx::query_as::<_, ListingRow>(
        r#"
        SELECT "listingId", "sellerId", "title", "description", "priceCents", "category", "createdAt"
        FROM listings
        ORDER BY "createdAt" DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, listing_id: Uuid) -> Result<Option<ListingRow>, RepoError> {
    let row = sqlx::query_as::<_, ListingRow>(
        r#"
        SELECT "listingId", "sellerId", "title", "description", "priceCents", "category", "createdAt"
        FROM listings
        WHERE "listingId" = $1
        "#,
    )
    .bind(listing_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    seller_id: Uuid,
    title: &str,
    description: &str,
    price_cents: i64,
    category: &str,
) -> Result<ListingRow, RepoError> {
    let row = sqlx::query_as::<_, ListingRow>(
        r#"
        INSERT INTO listings ("sellerId", "title", "description", "priceCents", "category")
        VALUES ($1, $2, $3, $4, $5)
        RETURNING "listingId", "sellerId", "title", "description", "priceCents", "category", "createdAt"
        "#,
    )
    .bind(seller_id)
    .bind(title)
    .bind(description)
    .bind(price_cents)
    .bind(category)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, listing_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM listings
        WHERE "listingId" = $1
        "#,
    )
    .bind(listing_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
