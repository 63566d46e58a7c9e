//! API response models.
//!
//! The external contract keeps the original service's `status` discriminator
//! on every payload: success bodies carry `"status": "success"` and error
//! bodies `"status": "error"` with a message, alongside a stable machine
//! code and a real HTTP status.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /get_config` success body: the active flat configuration record
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub status: String,
    pub mode: u8,
    pub cookie: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub mode: u8,
    pub components: HashMap<String, String>,
    pub version: String,
}
