//! Error types for OGC requests and document parsing

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OwsError {
    #[error("Failed to construct HTTP client: {reason}")]
    Client { reason: String },

    #[error("Request to {url} did not complete: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed {what} document: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("Reprojection from {from} to {to} failed: {reason}")]
    Projection {
        from: String,
        to: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, OwsError>;
