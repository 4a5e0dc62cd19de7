// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Defines database records, request-scoped projections and API DTOs

use geo_types::Point;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Represents a cached place record from the database
/// DOCUMENTATION: Maps to the `place` table. Created once per Google place id and
/// never modified afterwards by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Internal identifier assigned by the database
    pub id: i64,

    /// Google Places identifier (unique, used for cache lookups)
    pub google_place_id: String,

    /// Place name
    pub name: String,

    /// Google Maps URL for this place
    pub url: String,

    /// Geographic coordinates (extracted from PostGIS POINT)
    pub latitude: f64,
    pub longitude: f64,

    /// Public URL of the archived main photo
    pub photo_url: Option<String>,
}

/// A place assembled from provider data that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub google_place_id: String,
    pub name: String,
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: Option<String>,
}

impl Place {
    /// Location as a point (x = longitude, y = latitude)
    pub fn location(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A place as seen by one request: like state for the requesting user and the
/// distance from the query origin. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyResult {
    pub place: Place,
    pub liked: Option<bool>,
    pub distance_meters: f64,
}

impl NearbyResult {
    /// Convert to the API response DTO
    /// DOCUMENTATION: Drops the Google place id and truncates distance to whole meters
    pub fn to_response(&self) -> PlaceResponse {
        PlaceResponse {
            id: self.place.id,
            name: self.place.name.clone(),
            url: self.place.url.clone(),
            location: LocationResponse {
                latitude: self.place.latitude,
                longitude: self.place.longitude,
            },
            distance: self.distance_meters as u32,
            photo_url: self.place.photo_url.clone(),
            liked: self.liked,
        }
    }
}

/// Response DTO for a single place
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub location: LocationResponse,

    /// Distance from the query origin in meters
    pub distance: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    /// Like state of the requesting device, absent when there is no opinion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationResponse {
    pub latitude: f64,
    pub longitude: f64,
}

/// Response DTO for GET /places and GET /places/liked
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesResponse {
    pub places: Vec<PlaceResponse>,

    /// Opaque provider cursor, absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Query parameters for GET /places
/// DOCUMENTATION: `coordinates` is "<lat>,<lng>"; `device` identifies the requesting user
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(length(min = 3))]
    pub coordinates: String,

    /// Search radius in meters
    #[validate(range(min = 1, max = 50000))]
    pub radius: Option<u32>,

    #[serde(rename = "pagetoken")]
    pub page_token: Option<String>,

    pub device: Option<String>,
}

/// Query parameters for GET /places/liked
#[derive(Debug, Deserialize, Validate)]
pub struct LikedQuery {
    #[validate(length(min = 1))]
    pub device: String,

    #[validate(length(min = 3))]
    pub coordinates: String,
}
