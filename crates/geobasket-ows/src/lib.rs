//! geobasket OWS - OGC wire plumbing
//!
//! Capabilities and describe-layer document parsing, request URL builders,
//! the [`OwsClient`] port consumed by the discovery engine, and the reqwest
//! adapter implementing it against live services.

pub mod capabilities;
pub mod describe;
pub mod error;
pub mod http;
pub mod ports;
pub mod records;
pub mod reproject;
pub mod urls;

pub use error::{OwsError, Result};
pub use http::HttpOwsClient;
pub use ports::OwsClient;
pub use records::{DescribeLayerRecord, SrsBoundingBox, WfsFeatureTypeRecord, WmsLayerRecord};
