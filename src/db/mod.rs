// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod like_repository;
pub mod repository;
pub mod store;

pub use like_repository::*;
pub use repository::*;
pub use store::*;
