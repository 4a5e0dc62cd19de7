// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod auth;
pub mod health;
pub mod likes;
pub mod places;

pub use auth::verify_basic_auth;
pub use health::config as health_config;
pub use likes::config as likes_config;
pub use places::config as places_config;
