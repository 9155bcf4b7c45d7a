use serde::{Deserialize, Serialize};
use std::fmt;

use super::layer::BoundingBox;

/// Service type a layer is extracted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OwsExportType {
    Wfs,
    Wcs,
}

impl fmt::Display for OwsExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwsExportType::Wfs => write!(f, "WFS"),
            OwsExportType::Wcs => write!(f, "WCS"),
        }
    }
}

/// The resolved "how to extract this layer" record.
///
/// Starts absent on a candidate; populated by the layer classifier before the
/// layer becomes selectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportClassification {
    pub ows_type: OwsExportType,
    pub ows_url: String,
    pub layer_name: String,
    pub layer_type: Option<String>,
    pub namespace: Option<String>,
}

/// User-editable export parameters for one item.
///
/// Every field is optional; an unset field means "inherit the global
/// default", which the extraction server resolves. The global-properties item
/// uses `raster_format`/`vector_format`, regular layers use `format`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub projection: Option<String>,
    pub resolution: Option<f64>,
    pub format: Option<String>,
    pub raster_format: Option<String>,
    pub vector_format: Option<String>,
    pub bbox: Option<BoundingBox>,
    /// When explicitly false, the layer's own bbox is sent instead of the
    /// global one
    pub bbox_from_global: Option<bool>,
}

impl ExportOptions {
    /// Merge the set fields of `other` into self, leaving unset fields alone
    pub fn merge(&mut self, other: ExportOptions) {
        if other.projection.is_some() {
            self.projection = other.projection;
        }
        if other.resolution.is_some() {
            self.resolution = other.resolution;
        }
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.raster_format.is_some() {
            self.raster_format = other.raster_format;
        }
        if other.vector_format.is_some() {
            self.vector_format = other.vector_format;
        }
        if other.bbox.is_some() {
            self.bbox = other.bbox;
        }
        if other.bbox_from_global.is_some() {
            self.bbox_from_global = other.bbox_from_global;
        }
    }
}

/// Export state attached to a selectable leaf: the extent resolved at
/// discovery time, the classification, and the user-edited options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Extent and CRS resolved for this item at discovery time
    pub bbox: BoundingBox,

    /// Resolved export service, absent until classification succeeds
    pub classification: Option<ExportClassification>,

    /// User-edited overrides
    pub options: ExportOptions,
}

impl ExportInfo {
    pub fn new(bbox: BoundingBox) -> Self {
        Self { bbox, classification: None, options: ExportOptions::default() }
    }

    pub fn classified(bbox: BoundingBox, classification: ExportClassification) -> Self {
        Self { bbox, classification: Some(classification), options: ExportOptions::default() }
    }

    /// Extent to ship for this item: the user override when set, the
    /// discovery-time extent otherwise
    pub fn effective_bbox(&self) -> &BoundingBox {
        self.options.bbox.as_ref().unwrap_or(&self.bbox)
    }
}

/// Bounding box as the batch endpoint expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BboxSpec {
    pub srs: String,
    pub value: [f64; 4],
}

impl From<&BoundingBox> for BboxSpec {
    fn from(bbox: &BoundingBox) -> Self {
        Self { srs: bbox.srs.clone(), value: bbox.extent }
    }
}

/// Defaults applied to every layer without a per-layer override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalProperties {
    pub projection: Option<String>,
    pub resolution: Option<f64>,
    pub raster_format: Option<String>,
    pub vector_format: Option<String>,
    pub bbox: BboxSpec,
}

/// One per-layer override record of the batch payload.
///
/// Unset overrides are serialized as explicit nulls: the server resolves
/// "inherit global default", not the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    pub projection: Option<String>,
    pub resolution: Option<f64>,
    pub format: Option<String>,
    pub bbox: Option<BboxSpec>,
    pub ows_url: String,
    pub ows_type: OwsExportType,
    pub layer_name: String,
    pub namespace: Option<String>,
}

/// The batch extraction payload.
///
/// Built once, synchronously, from the checked leaves at submission time;
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub emails: Vec<String>,
    pub global_properties: GlobalProperties,
    pub layers: Vec<LayerSpec>,
}
