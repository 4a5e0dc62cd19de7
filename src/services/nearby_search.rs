// src/services/nearby_search.rs
// DOCUMENTATION: Nearby and liked place searches
// PURPOSE: Combine provider search, cache resolution, likes and distances into results

use crate::db::{LikeStore, PlaceStore};
use crate::errors::PlacesError;
use crate::models::{NearbyResult, Place};
use crate::services::{geo, PlaceProvider, PlaceResolver};
use geo_types::Point;
use std::collections::HashMap;
use std::sync::Arc;

/// One page of nearby results
#[derive(Debug)]
pub struct NearbyResults {
    pub results: Vec<NearbyResult>,
    /// Provider cursor for the next page, None on the last page
    pub next_page_token: Option<String>,
}

pub struct NearbySearchService {
    provider: Arc<dyn PlaceProvider>,
    resolver: PlaceResolver,
    places: Arc<dyn PlaceStore>,
    likes: Arc<dyn LikeStore>,
}

impl NearbySearchService {
    pub fn new(
        provider: Arc<dyn PlaceProvider>,
        resolver: PlaceResolver,
        places: Arc<dyn PlaceStore>,
        likes: Arc<dyn LikeStore>,
    ) -> Self {
        Self {
            provider,
            resolver,
            places,
            likes,
        }
    }

    /// Restaurants around `origin`, in the provider's order
    /// DOCUMENTATION: Places that could not be backfilled are missing from the page,
    /// so a page can be shorter than the provider's.
    pub async fn search_nearby(
        &self,
        origin: Point<f64>,
        radius: u32,
        page_token: Option<&str>,
        device_id: Option<&str>,
    ) -> Result<NearbyResults, PlacesError> {
        let page_token = page_token.filter(|t| !t.is_empty());
        let page = self.provider.nearby_search(origin, radius, page_token).await?;

        let mut places = self.resolver.resolve(&page.place_ids).await?;

        let rank: HashMap<&str, usize> = page
            .place_ids
            .iter()
            .enumerate()
            .rev()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        places.sort_by_key(|p| rank.get(p.google_place_id.as_str()).copied());

        let likes = match device_id {
            Some(device_id) => {
                let ids: Vec<i64> = places.iter().map(|p| p.id).collect();
                self.likes.batch_get(device_id, &ids).await?
            }
            None => HashMap::new(),
        };

        let results = places
            .into_iter()
            .map(|place| {
                let liked = likes.get(&place.id).copied();
                project(place, origin, liked)
            })
            .collect();

        Ok(NearbyResults {
            results,
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Places the device liked, nearest first
    /// DOCUMENTATION: Served from the store only; `origin` is only used for distances.
    pub async fn search_liked(
        &self,
        device_id: &str,
        origin: Point<f64>,
    ) -> Result<Vec<NearbyResult>, PlacesError> {
        let places = self.places.find_liked_by_device(device_id).await?;

        let mut results: Vec<NearbyResult> = places
            .into_iter()
            .map(|place| project(place, origin, Some(true)))
            .collect();
        results.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));

        Ok(results)
    }
}

fn project(place: Place, origin: Point<f64>, liked: Option<bool>) -> NearbyResult {
    let distance_meters = geo::distance(origin, place.location());
    NearbyResult {
        place,
        liked,
        distance_meters,
    }
}
