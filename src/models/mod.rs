// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod like;
pub mod place;

pub use like::*;
pub use place::*;
