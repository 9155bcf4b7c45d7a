use serde::{Deserialize, Serialize};
use std::fmt;

/// OGC protocol spoken by a capabilities endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OwsProtocol {
    Wms,
    Wfs,
}

impl fmt::Display for OwsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwsProtocol::Wms => write!(f, "WMS"),
            OwsProtocol::Wfs => write!(f, "WFS"),
        }
    }
}

/// One capabilities endpoint, optionally scoped to a single named layer.
///
/// Immutable once created; supplied by external configuration. A descriptor
/// with `single_layer_name` set represents a standalone layer reference: only
/// the matching record of the capabilities response is considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Capabilities endpoint URL
    pub url: String,

    /// Protocol of the endpoint
    pub protocol: OwsProtocol,

    /// When set, scope discovery to this one advertised layer
    pub single_layer_name: Option<String>,

    /// Human-readable service name for display
    pub display_name: String,
}

impl ServiceDescriptor {
    /// Descriptor covering a whole service
    pub fn service(
        url: impl Into<String>,
        protocol: OwsProtocol,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            protocol,
            single_layer_name: None,
            display_name: display_name.into(),
        }
    }

    /// Descriptor scoped to one named layer
    pub fn single_layer(
        url: impl Into<String>,
        protocol: OwsProtocol,
        layer_name: impl Into<String>,
    ) -> Self {
        let layer_name = layer_name.into();
        Self {
            url: url.into(),
            protocol,
            display_name: layer_name.clone(),
            single_layer_name: Some(layer_name),
        }
    }

    /// Whether this descriptor targets a single layer rather than a service
    pub fn is_single_layer(&self) -> bool {
        self.single_layer_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_layer_descriptor() {
        let desc =
            ServiceDescriptor::single_layer("https://geo.example.org/wms", OwsProtocol::Wms, "roads");
        assert!(desc.is_single_layer());
        assert_eq!(desc.display_name, "roads");
        assert_eq!(desc.single_layer_name.as_deref(), Some("roads"));
    }

    #[test]
    fn test_protocol_serialization() {
        assert_eq!(serde_json::to_string(&OwsProtocol::Wms).unwrap(), "\"WMS\"");
        assert_eq!(serde_json::to_string(&OwsProtocol::Wfs).unwrap(), "\"WFS\"");
    }
}
