//! Queue entry model.

use serde::{Deserialize, Serialize};

use printquote_core::types::JobId;

use crate::quote::Material;

/// An admitted print job. Immutable once admitted; this is exactly the
/// record serialized onto the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Where the worker downloads the input model from.
    pub download_url: String,
    /// Print material.
    pub material: Material,
    /// Layer height in millimetres.
    pub layer_height: f64,
    /// Infill percentage (0-100).
    pub infill: u8,
    /// Rush order flag.
    pub rush: bool,
}

impl Job {
    /// Serialize to the queue wire format.
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a queue payload.
    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}
