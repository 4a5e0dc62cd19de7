// src/db/like_repository.rs
// DOCUMENTATION: Like/dislike database operations
// PURPOSE: PostgreSQL implementation of LikeStore

use crate::db::LikeStore;
use crate::errors::PlacesError;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeStore for LikeRepository {
    /// Save like or dislike for a device
    /// DOCUMENTATION: Unique (device_id, place_id); concurrent writes race in the
    /// database and the last one wins.
    async fn upsert(
        &self,
        device_id: &str,
        place_id: i64,
        liked: bool,
    ) -> Result<(), PlacesError> {
        sqlx::query(
            r#"
            INSERT INTO "like" (device_id, place_id, is_liked)
            VALUES ($1, $2, $3)
            ON CONFLICT (device_id, place_id) DO UPDATE
            SET is_liked = EXCLUDED.is_liked,
                update_date = NOW()
            "#,
        )
        .bind(device_id)
        .bind(place_id)
        .bind(liked)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "Failed to save like for device {} and place {}: {}",
                device_id,
                place_id,
                e
            );
            PlacesError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    async fn batch_get(
        &self,
        device_id: &str,
        place_ids: &[i64],
    ) -> Result<HashMap<i64, bool>, PlacesError> {
        if place_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, bool)> = sqlx::query_as(
            r#"
            SELECT place_id, is_liked FROM "like"
            WHERE device_id = $1 AND place_id = ANY($2)
            "#,
        )
        .bind(device_id)
        .bind(place_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to load likes for device {}: {}", device_id, e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().collect())
    }
}
