use geo::Rect;
use serde::{Deserialize, Serialize};

use super::service::ServiceDescriptor;

/// An extent tagged with the CRS its coordinates are expressed in.
///
/// The extent is stored as `[min_x, min_y, max_x, max_y]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// CRS identifier, e.g. "EPSG:4326"
    pub srs: String,

    /// Extent as min_x, min_y, max_x, max_y
    pub extent: [f64; 4],
}

impl BoundingBox {
    pub fn new(srs: impl Into<String>, extent: [f64; 4]) -> Self {
        Self { srs: srs.into(), extent }
    }

    /// View the extent as a `geo::Rect`
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            geo::coord! { x: self.extent[0], y: self.extent[1] },
            geo::coord! { x: self.extent[2], y: self.extent[3] },
        )
    }

    pub fn from_rect(srs: impl Into<String>, rect: Rect<f64>) -> Self {
        Self {
            srs: srs.into(),
            extent: [rect.min().x, rect.min().y, rect.max().x, rect.max().y],
        }
    }
}

/// One advertised layer, produced by the capability fetcher.
///
/// The candidate carries everything the classifier needs: the request
/// parameter (`name`), the originating service, and the extent resolved by
/// the capabilities bounding-box policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerCandidate {
    /// Human-readable title from the capabilities document
    pub title: String,

    /// Layer request parameter (the native layer handle)
    pub name: String,

    /// The service this candidate was advertised by
    pub service: ServiceDescriptor,

    /// Resolved extent and CRS for this layer
    pub bbox: BoundingBox,

    /// Namespace of the feature type, when the service declares one
    pub namespace: Option<String>,
}

impl LayerCandidate {
    /// Display name: the title when present, the raw name otherwise
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// Shorten a layer name for tree display.
///
/// Names longer than `max_len` characters are truncated with a trailing
/// ellipsis; the full name stays available in the data model.
pub fn shorten_layer_name(name: &str, max_len: usize) -> String {
    let count = name.chars().count();
    if count <= max_len || max_len < 4 {
        return name.to_string();
    }
    let truncated: String = name.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
}
