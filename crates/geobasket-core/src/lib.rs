//! geobasket Core - Domain models, configuration, and events
//!
//! This crate contains the core domain types of the geobasket system: service
//! descriptors, layer candidates, export classifications, the selection tree,
//! the export request payload, and the typed event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{BasketError, Result};
