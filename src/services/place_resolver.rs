// src/services/place_resolver.rs
// DOCUMENTATION: Cache-through resolution of Google place ids
// PURPOSE: Return stored places for a page of ids, backfilling unknown ones
//
// Process:
// 1. Batch lookup of all ids in the place store
// 2. Every id found -> return (no provider traffic)
// 3. Missing ids -> details (+ main photo) fetched concurrently, best effort
// 4. Wait until every dispatched fetch has settled, success or failure
// 5. One batch insert for all assembled places
// 6. Cached + inserted places, in no guaranteed order

use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::models::{NewPlace, Place};
use crate::services::{
    DetailField, PhotoArchive, PlaceProvider, MAX_PHOTO_HEIGHT, MAX_PHOTO_WIDTH,
};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

/// Fields requested when backfilling a place
pub const BACKFILL_FIELDS: &[DetailField] = &[
    DetailField::Url,
    DetailField::Name,
    DetailField::GeometryLocationLat,
    DetailField::GeometryLocationLng,
    DetailField::Photos,
];

pub struct PlaceResolver {
    places: Arc<dyn PlaceStore>,
    provider: Arc<dyn PlaceProvider>,
    photos: Arc<dyn PhotoArchive>,
    /// Upper bound on concurrent backfills within one resolve call
    concurrency: usize,
}

impl PlaceResolver {
    pub fn new(
        places: Arc<dyn PlaceStore>,
        provider: Arc<dyn PlaceProvider>,
        photos: Arc<dyn PhotoArchive>,
        concurrency: usize,
    ) -> Self {
        Self {
            places,
            provider,
            photos,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve Google place ids to stored places
    /// DOCUMENTATION: Store failures abort the call. A place whose details cannot be
    /// fetched is left out of the result and is not stored. Callers that need the
    /// input order must re-sort.
    pub async fn resolve(&self, google_place_ids: &[String]) -> Result<Vec<Place>, PlacesError> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = google_place_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut places = self.places.find_by_external_ids(&ids).await?;
        if places.len() == ids.len() {
            log::debug!("All {} places found in cache", ids.len());
            return Ok(places);
        }

        let missing: Vec<String> = {
            let known: HashSet<&str> =
                places.iter().map(|p| p.google_place_id.as_str()).collect();
            ids.iter()
                .filter(|id| !known.contains(id.as_str()))
                .cloned()
                .collect()
        };

        log::info!(
            "Backfilling {} of {} places from Google",
            missing.len(),
            ids.len()
        );

        // One settled outcome per dispatched id, so a failed fetch never stalls the
        // collection.
        let dispatched = missing.len();
        let new_places: Vec<NewPlace> = stream::iter(missing.iter())
            .map(|id| self.fetch_place(id))
            .buffer_unordered(self.concurrency)
            .filter_map(|place| async move { place })
            .collect()
            .await;

        if new_places.len() < dispatched {
            log::warn!(
                "{} of {} places could not be backfilled",
                dispatched - new_places.len(),
                dispatched
            );
        }

        if new_places.is_empty() {
            return Ok(places);
        }

        let inserted = self.places.insert_batch(&new_places).await?;
        places.extend(inserted);
        Ok(places)
    }

    /// Fetch details and main photo for one place
    /// DOCUMENTATION: None when details are unavailable; a photo failure only drops the photo
    async fn fetch_place(&self, google_place_id: &str) -> Option<NewPlace> {
        let details = match self
            .provider
            .place_details(google_place_id, BACKFILL_FIELDS)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                log::warn!("Skipping place {}: details failed: {}", google_place_id, e);
                return None;
            }
        };

        let photo_url = match details.photo_references.first() {
            Some(reference) => match self.archive_photo(google_place_id, reference).await {
                Ok(url) => Some(url),
                Err(e) => {
                    log::warn!("No photo for place {}: {}", google_place_id, e);
                    None
                }
            },
            None => None,
        };

        Some(NewPlace {
            google_place_id: google_place_id.to_string(),
            name: details.name,
            url: details.url,
            latitude: details.latitude,
            longitude: details.longitude,
            photo_url,
        })
    }

    async fn archive_photo(
        &self,
        google_place_id: &str,
        photo_reference: &str,
    ) -> Result<String, PlacesError> {
        let data = self
            .provider
            .photo(photo_reference, MAX_PHOTO_WIDTH, MAX_PHOTO_HEIGHT)
            .await?;
        self.photos.upload(google_place_id, data).await
    }
}
