// src/db/store.rs
// DOCUMENTATION: Storage capability traits
// PURPOSE: Let services depend on what the stores do, not on PostgreSQL

use crate::errors::PlacesError;
use crate::models::{NewPlace, Place};
use async_trait::async_trait;
use std::collections::HashMap;

/// Durable store of cached places
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Places whose Google place id is in `google_place_ids`, in no particular order.
    /// Ids without a record are simply absent from the result.
    async fn find_by_external_ids(
        &self,
        google_place_ids: &[String],
    ) -> Result<Vec<Place>, PlacesError>;

    /// Single-place lookup by internal id (no HTTP route uses it yet)
    #[allow(dead_code)]
    async fn find_by_id(&self, id: i64) -> Result<Place, PlacesError>;

    /// Insert one place and return it with its assigned id (backfill uses insert_batch)
    #[allow(dead_code)]
    async fn insert(&self, place: &NewPlace) -> Result<Place, PlacesError>;

    /// Insert all places in one write and return them with their assigned ids.
    async fn insert_batch(&self, places: &[NewPlace]) -> Result<Vec<Place>, PlacesError>;

    #[allow(dead_code)]
    async fn exists_by_external_id(&self, google_place_id: &str) -> Result<bool, PlacesError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, PlacesError>;

    /// Places the device has liked (dislikes excluded).
    async fn find_liked_by_device(&self, device_id: &str) -> Result<Vec<Place>, PlacesError>;
}

/// Durable per-(device, place) like/dislike store
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Insert or overwrite the opinion for (device, place).
    async fn upsert(&self, device_id: &str, place_id: i64, liked: bool)
        -> Result<(), PlacesError>;

    /// Recorded opinions of the device for the given places. Places without an
    /// opinion are absent from the map.
    async fn batch_get(
        &self,
        device_id: &str,
        place_ids: &[i64],
    ) -> Result<HashMap<i64, bool>, PlacesError>;
}
