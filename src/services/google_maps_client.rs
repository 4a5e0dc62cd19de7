// src/services/google_maps_client.rs
// DOCUMENTATION: Google Maps Places API client
// PURPOSE: Nearby search, place details and photo retrieval for the backfill pipeline

use crate::errors::PlacesError;
use async_trait::async_trait;
use geo_types::Point;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Photo size requested from the provider before archiving
pub const MAX_PHOTO_WIDTH: u32 = 600;
pub const MAX_PHOTO_HEIGHT: u32 = 800;

/// One page of nearby search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyPage {
    /// Google place ids in provider order
    pub place_ids: Vec<String>,
    /// Cursor for the next page, None on the last page
    pub next_page_token: Option<String>,
}

/// Place data needed to create a cached place
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub name: String,
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Photo references, best first
    pub photo_references: Vec<String>,
}

/// Place Details field mask entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Url,
    Name,
    GeometryLocationLat,
    GeometryLocationLng,
    Photos,
}

impl DetailField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailField::Url => "url",
            DetailField::Name => "name",
            DetailField::GeometryLocationLat => "geometry/location/lat",
            DetailField::GeometryLocationLng => "geometry/location/lng",
            DetailField::Photos => "photos",
        }
    }

    /// Comma separated mask for the `fields` query parameter
    pub fn mask(fields: &[DetailField]) -> String {
        fields
            .iter()
            .map(DetailField::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// External places provider
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Restaurants around `origin` (x = longitude, y = latitude)
    async fn nearby_search(
        &self,
        origin: Point<f64>,
        radius: u32,
        page_token: Option<&str>,
    ) -> Result<NearbyPage, PlacesError>;

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[DetailField],
    ) -> Result<PlaceDetails, PlacesError>;

    /// Raw image bytes for a photo reference
    async fn photo(
        &self,
        photo_reference: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<Vec<u8>, PlacesError>;
}

/// Google Places API client
/// DOCUMENTATION: Handles authentication and API calls to Google Places
pub struct GoogleMapsClient {
    /// HTTP client for making requests
    client: Client,
    /// Google Maps API key
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
}

/// Response from Google Places Nearby Search
#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<NearbySearchResult>,
    status: String,
    next_page_token: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResult {
    place_id: String,
}

/// Response from Google Place Details
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<GooglePlace>,
    status: String,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    name: Option<String>,
    url: Option<String>,
    geometry: Option<GoogleGeometry>,
    #[serde(default)]
    photos: Vec<GooglePhoto>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GooglePhoto {
    photo_reference: String,
}

impl GoogleMapsClient {
    /// Create new Google Places API client
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, PlacesError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            PlacesError::ExternalApiError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
        })
    }

    /// Issue a GET and decode the JSON body
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, PlacesError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Google Places {} request failed: {}", endpoint, e);
                PlacesError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Google Places API error {}: {}", status, body);
            return Err(PlacesError::ExternalApiError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            log::error!("Failed to parse Google Places {} response: {}", endpoint, e);
            PlacesError::ExternalApiError(format!("Parse error: {}", e))
        })
    }
}

/// Map a Places API status to success or error
/// DOCUMENTATION: OK and ZERO_RESULTS succeed; quota errors are reported separately
fn check_status(status: &str, error_message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => {
            log::error!("Google Places API quota exceeded");
            Err(PlacesError::RateLimitExceeded)
        }
        other => {
            let msg = error_message.unwrap_or_else(|| format!("Unexpected status: {}", other));
            log::error!("Google Places API returned {}: {}", other, msg);
            Err(PlacesError::ExternalApiError(msg))
        }
    }
}

impl NearbySearchResponse {
    fn into_page(self) -> Result<NearbyPage, PlacesError> {
        check_status(&self.status, self.error_message)?;

        Ok(NearbyPage {
            place_ids: self.results.into_iter().map(|r| r.place_id).collect(),
            next_page_token: self.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

impl DetailsResponse {
    fn into_details(self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        check_status(&self.status, self.error_message)?;

        let place = self.result.ok_or_else(|| {
            PlacesError::ExternalApiError(format!("No details returned for {}", place_id))
        })?;
        let location = place.geometry.map(|g| g.location).ok_or_else(|| {
            PlacesError::ExternalApiError(format!("No location returned for {}", place_id))
        })?;

        Ok(PlaceDetails {
            name: place.name.unwrap_or_default(),
            url: place.url.unwrap_or_default(),
            latitude: location.lat,
            longitude: location.lng,
            photo_references: place
                .photos
                .into_iter()
                .map(|p| p.photo_reference)
                .collect(),
        })
    }
}

#[async_trait]
impl PlaceProvider for GoogleMapsClient {
    /// Perform nearby search for restaurants
    /// DOCUMENTATION: With a page token Google ignores location and radius.
    async fn nearby_search(
        &self,
        origin: Point<f64>,
        radius: u32,
        page_token: Option<&str>,
    ) -> Result<NearbyPage, PlacesError> {
        let mut params = vec![
            ("location", format!("{},{}", origin.y(), origin.x())),
            ("radius", radius.to_string()),
            ("type", "restaurant".to_string()),
        ];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            params.push(("pagetoken", token.to_string()));
        }

        log::debug!(
            "Google Places nearby search: lat={}, lng={}, radius={}",
            origin.y(),
            origin.x(),
            radius
        );

        let response: NearbySearchResponse = self.get_json("nearbysearch/json", &params).await?;
        let page = response.into_page()?;
        log::info!("Google Places search returned {} results", page.place_ids.len());
        Ok(page)
    }

    async fn place_details(
        &self,
        place_id: &str,
        fields: &[DetailField],
    ) -> Result<PlaceDetails, PlacesError> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", DetailField::mask(fields)),
        ];

        log::debug!("Google Places details lookup: place_id={}", place_id);

        let response: DetailsResponse = self.get_json("details/json", &params).await?;
        response.into_details(place_id)
    }

    async fn photo(
        &self,
        photo_reference: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<Vec<u8>, PlacesError> {
        let url = format!("{}/photo", self.base_url);
        let params = [
            ("maxwidth", max_width.to_string()),
            ("maxheight", max_height.to_string()),
            ("photoreference", photo_reference.to_string()),
            ("key", self.api_key.clone()),
        ];

        // The endpoint redirects to the image itself
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| PlacesError::ExternalApiError(format!("Photo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PlacesError::ExternalApiError(format!(
                "Photo request failed with status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlacesError::ExternalApiError(format!("Photo read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}
