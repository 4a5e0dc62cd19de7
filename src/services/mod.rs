// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod gcs_auth;
pub mod geo;
pub mod google_maps_client;
pub mod like_service;
pub mod nearby_search;
pub mod photo_archive;
pub mod place_resolver;

pub use gcs_auth::*;
pub use google_maps_client::*;
pub use like_service::*;
pub use nearby_search::*;
pub use photo_archive::*;
pub use place_resolver::*;
