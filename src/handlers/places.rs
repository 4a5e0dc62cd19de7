// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for place searches
// PURPOSE: Parse requests, call services, return responses

use crate::config::Config;
use crate::errors::PlacesError;
use crate::handlers::verify_basic_auth;
use crate::models::{LikedQuery, NearbyQuery, PlacesResponse};
use crate::services::NearbySearchService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use geo_types::Point;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Search radius when the request does not give one
const DEFAULT_RADIUS_M: u32 = 1000;

/// GET /places
/// Restaurants near `coordinates`, one provider page at a time
pub async fn find_nearby_places(
    req: HttpRequest,
    config: web::Data<Config>,
    search: web::Data<NearbySearchService>,
) -> Result<impl Responder, PlacesError> {
    verify_basic_auth(&req, &config)?;

    let query: NearbyQuery = parse_query(&req)?;
    if let Err(e) = query.validate() {
        return Err(PlacesError::ValidationError(e.to_string()));
    }
    let origin = parse_coordinates(&query.coordinates)?;

    let page = search
        .search_nearby(
            origin,
            query.radius.unwrap_or(DEFAULT_RADIUS_M),
            query.page_token.as_deref(),
            query.device.as_deref().filter(|d| !d.is_empty()),
        )
        .await?;

    Ok(HttpResponse::Ok().json(PlacesResponse {
        places: page.results.iter().map(|r| r.to_response()).collect(),
        next_page_token: page.next_page_token,
    }))
}

/// GET /places/liked
/// Places the device liked, with distances from `coordinates`
pub async fn find_liked_places(
    req: HttpRequest,
    config: web::Data<Config>,
    search: web::Data<NearbySearchService>,
) -> Result<impl Responder, PlacesError> {
    verify_basic_auth(&req, &config)?;

    let query: LikedQuery = parse_query(&req)?;
    if let Err(e) = query.validate() {
        return Err(PlacesError::ValidationError(e.to_string()));
    }
    let origin = parse_coordinates(&query.coordinates)?;

    let results = search.search_liked(&query.device, origin).await?;

    Ok(HttpResponse::Ok().json(PlacesResponse {
        places: results.iter().map(|r| r.to_response()).collect(),
        next_page_token: None,
    }))
}

/// Deserialize the query string. Runs after authentication so an anonymous caller
/// always gets 401, whatever the parameters.
fn parse_query<T: DeserializeOwned>(req: &HttpRequest) -> Result<T, PlacesError> {
    web::Query::<T>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .map_err(|e| PlacesError::InvalidInput(e.to_string()))
}

/// Parse "<lat>,<lng>" into a point (x = longitude, y = latitude)
pub fn parse_coordinates(value: &str) -> Result<Point<f64>, PlacesError> {
    let invalid = || PlacesError::InvalidInput(format!("Invalid coordinates: '{}'", value));

    let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(invalid());
    }

    Ok(Point::new(lng, lat))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("", web::get().to(find_nearby_places))
            .route("/liked", web::get().to(find_liked_places)),
    );
}
