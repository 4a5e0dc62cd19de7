// src/handlers/likes.rs
// DOCUMENTATION: HTTP handler for like/dislike updates
// PURPOSE: Record a device's opinion about a stored place

use crate::config::Config;
use crate::errors::PlacesError;
use crate::handlers::verify_basic_auth;
use crate::models::LikePath;
use crate::services::LikeService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};

/// POST /place/{place}/like/{device}/{liked}
pub async fn set_like(
    req: HttpRequest,
    config: web::Data<Config>,
    likes: web::Data<LikeService>,
) -> Result<impl Responder, PlacesError> {
    verify_basic_auth(&req, &config)?;

    let path: LikePath = req
        .match_info()
        .load()
        .map_err(|e| PlacesError::InvalidInput(format!("Invalid like path: {}", e)))?;
    if path.device.trim().is_empty() {
        return Err(PlacesError::InvalidInput("Device id must not be empty".to_string()));
    }

    let preference = likes.set_like(&path.device, path.place, path.liked).await?;
    Ok(HttpResponse::Ok().json(preference))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/place/{place}/like/{device}/{liked}",
        web::post().to(set_like),
    );
}
