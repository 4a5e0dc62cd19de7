// src/handlers/auth.rs
// DOCUMENTATION: HTTP Basic authentication
// PURPOSE: Guard the public API with the configured username and password

use crate::config::Config;
use crate::errors::PlacesError;
use actix_web::{http::header, HttpRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Check the Authorization header against API_USERNAME / API_PASSWORD
/// DOCUMENTATION: Any failure is reported as Unauthorized so callers cannot tell
/// a bad username from a bad password.
pub fn verify_basic_auth(req: &HttpRequest, config: &Config) -> Result<(), PlacesError> {
    let (username, password) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic_credentials)
        .ok_or_else(|| {
            log::warn!("Request without valid basic auth credentials");
            PlacesError::Unauthorized
        })?;

    let user_ok = constant_time_eq(username.as_bytes(), config.api_username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), config.api_password.as_bytes());
    if !(user_ok & pass_ok) {
        log::warn!("Request with invalid basic auth credentials");
        return Err(PlacesError::Unauthorized);
    }

    Ok(())
}

/// Decode "Basic base64(user:pass)"
fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Comparison whose duration depends only on the lengths
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
