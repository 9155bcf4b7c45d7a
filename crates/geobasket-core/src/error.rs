//! Error types for geobasket

use thiserror::Error;

use crate::models::tree::ItemId;

#[derive(Debug, Error)]
pub enum BasketError {
    // Discovery errors
    #[error("A discovery pass is already in progress")]
    DiscoveryInProgress,

    #[error("The basket has not been created. Call 'create' first")]
    NotCreated,

    // Selection errors
    #[error("Item {item} does not exist in the current tree")]
    NoSuchItem { item: ItemId },

    #[error("Item {item} is not selectable: {reason}")]
    NotSelectable { item: ItemId, reason: String },

    #[error("No item is currently selected")]
    NothingSelected,

    // Invariant violations
    #[error("Layer '{layer}' is checked but carries no export classification")]
    MissingClassification { layer: String },

    #[error("Selected item {item} carries no export information")]
    MissingExportInfo { item: ItemId },

    #[error("The selection tree has no global-properties item")]
    MissingGlobalProperties,

    // Submission errors
    #[error("Extraction request to {url} did not complete: {reason}")]
    SubmissionFailed { url: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BasketError>;
