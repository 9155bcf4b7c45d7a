//! Service-list loading.
//!
//! The basket configuration file carries both the engine settings (read by
//! `BasketConfig`) and the `[[services]]` / `[[layers]]` tables read here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use geobasket_core::models::{OwsProtocol, ServiceDescriptor};

#[derive(Debug, Deserialize)]
struct ServicesFile {
    #[serde(default)]
    services: Vec<ServiceEntry>,
    #[serde(default)]
    layers: Vec<LayerEntry>,
}

/// One whole-service entry
#[derive(Debug, Deserialize)]
struct ServiceEntry {
    url: String,
    protocol: OwsProtocol,
    name: Option<String>,
}

/// One standalone-layer entry
#[derive(Debug, Deserialize)]
struct LayerEntry {
    url: String,
    protocol: OwsProtocol,
    layer: String,
}

/// Load the configured descriptors: whole services first, then standalone
/// layers.
pub fn load_descriptors(path: &Path) -> Result<Vec<ServiceDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let file: ServicesFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

    let mut descriptors = Vec::with_capacity(file.services.len() + file.layers.len());
    for entry in file.services {
        let name = entry.name.unwrap_or_else(|| entry.url.clone());
        descriptors.push(ServiceDescriptor::service(entry.url, entry.protocol, name));
    }
    for entry in file.layers {
        descriptors.push(ServiceDescriptor::single_layer(entry.url, entry.protocol, entry.layer));
    }
    Ok(descriptors)
}
