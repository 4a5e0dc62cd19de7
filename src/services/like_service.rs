// src/services/like_service.rs
// DOCUMENTATION: Like/dislike recording
// PURPOSE: Validate the place, then overwrite the device's opinion

use crate::db::{LikeStore, PlaceStore};
use crate::errors::PlacesError;
use crate::models::LikePreference;
use std::sync::Arc;

pub struct LikeService {
    places: Arc<dyn PlaceStore>,
    likes: Arc<dyn LikeStore>,
}

impl LikeService {
    pub fn new(places: Arc<dyn PlaceStore>, likes: Arc<dyn LikeStore>) -> Self {
        Self { places, likes }
    }

    /// Record a like or dislike
    /// DOCUMENTATION: Always overwrites; there is no way back to "no opinion".
    pub async fn set_like(
        &self,
        device_id: &str,
        place_id: i64,
        liked: bool,
    ) -> Result<LikePreference, PlacesError> {
        if !self.places.exists_by_id(place_id).await? {
            log::warn!("Like for unknown place {} from {}", place_id, device_id);
            return Err(PlacesError::NotFound(place_id.to_string()));
        }

        self.likes.upsert(device_id, place_id, liked).await?;
        log::debug!("Device {} set liked={} on place {}", device_id, liked, place_id);

        Ok(LikePreference {
            device_id: device_id.to_string(),
            place_id,
            liked,
        })
    }
}
