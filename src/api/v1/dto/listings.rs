/*
 * Responsibility
 * - Listings request/response DTOs
 * - validate() holds shape checks only; ownership/role checks live elsewhere
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::listing_repo::ListingRow;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub category: String,
}

impl CreateListingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.len() > 140 {
            return Err("title must be <= 140 chars");
        }
        if self.description.len() > 4000 {
            return Err("description must be <= 4000 chars");
        }
        if self.price_cents <= 0 {
            return Err("price_cents must be positive");
        }
        if self.category.trim().is_empty() {
            return Err("category is required");
        }

        Ok(())
    }
}

// Deserialize as well: cached listing pages round-trip through JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl From<ListingRow> for ListingResponse {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            seller_id: row.seller_id,
            title: row.title,
            description: row.description,
            price_cents: row.price_cents,
            category: row.category,
            created_at: row.created_at,
        }
    }
}
