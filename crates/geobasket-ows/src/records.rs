//! Wire-level records extracted from OGC documents.
//!
//! These carry exactly what the discovery engine consumes; everything else in
//! the source documents is dropped at parse time.

/// One `BoundingBox` advertisement of a WMS layer
#[derive(Debug, Clone, PartialEq)]
pub struct SrsBoundingBox {
    pub srs: String,
    pub extent: [f64; 4],
}

/// One layer advertised by a WMS capabilities document.
///
/// SRS codes and bounding boxes are accumulated through layer nesting, so a
/// record reflects everything inherited from its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsLayerRecord {
    pub name: String,
    pub title: String,

    /// Per-SRS bounding boxes, in document order
    pub bbox_by_srs: Vec<SrsBoundingBox>,

    /// Advertised SRS codes, in document order. A listed code is supported.
    pub supported_srs: Vec<String>,

    /// The lon/lat extent (EPSG:4326), when advertised
    pub latlon_bbox: Option<[f64; 4]>,
}

/// One feature type advertised by a WFS capabilities document
#[derive(Debug, Clone, PartialEq)]
pub struct WfsFeatureTypeRecord {
    /// Advertised name, possibly namespace-prefixed ("topp:states")
    pub name: String,
    pub title: String,

    /// Namespace URI resolved from the name's prefix, when declared
    pub namespace: Option<String>,
}

impl WfsFeatureTypeRecord {
    /// The name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }
}

/// One layer description returned by a WMS DescribeLayer request
#[derive(Debug, Clone, PartialEq)]
pub struct DescribeLayerRecord {
    /// Declared export service type, verbatim ("WFS", "WCS", or anything
    /// else the server chose to answer)
    pub ows_type: String,

    /// Declared export service URL; empty when the server gave none
    pub ows_url: String,

    /// Layer/type name to use against the export service
    pub layer_name: String,

    pub layer_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_strips_prefix() {
        let record = WfsFeatureTypeRecord {
            name: "topp:states".to_string(),
            title: "USA Population".to_string(),
            namespace: Some("http://www.openplans.org/topp".to_string()),
        };
        assert_eq!(record.local_name(), "states");

        let bare = WfsFeatureTypeRecord {
            name: "states".to_string(),
            title: String::new(),
            namespace: None,
        };
        assert_eq!(bare.local_name(), "states");
    }
}
