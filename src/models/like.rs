// src/models/like.rs
// DOCUMENTATION: Like/dislike data structures
// PURPOSE: Stored preference and the path parameters of the like endpoint

use serde::{Deserialize, Serialize};

/// A device's opinion about a place. Keyed by (device_id, place_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikePreference {
    pub device_id: String,
    pub place_id: i64,
    pub liked: bool,
}

/// Path parameters for POST /place/{place}/like/{device}/{liked}
#[derive(Debug, Deserialize)]
pub struct LikePath {
    pub place: i64,
    pub device: String,
    pub liked: bool,
}
