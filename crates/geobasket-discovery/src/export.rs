//! Export request assembly.
//!
//! A pure, synchronous transform from the checked-leaf set to the batch
//! payload. Per-layer overrides are shipped only when set; everything else
//! is an explicit null that the extraction server resolves against the
//! global properties.

use geobasket_core::error::{BasketError, Result};
use geobasket_core::models::{
    BboxSpec, ExportRequest, GlobalProperties, LayerSpec, LayerTree, TreeItem,
};

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Build the batch payload from the current checked-leaf set.
///
/// Returns `None` when nothing is checked: submission is a silent no-op. A
/// checked leaf without a classification is an invariant violation and
/// fails the build.
pub fn build_export_request(tree: &LayerTree, email: &str) -> Result<Option<ExportRequest>> {
    let checked = tree.checked_leaves();
    if checked.is_empty() {
        return Ok(None);
    }

    let global_id = tree
        .global_properties_item()
        .ok_or(BasketError::MissingGlobalProperties)?;
    let global = tree
        .get(global_id)
        .and_then(TreeItem::as_leaf)
        .and_then(|leaf| leaf.export.as_ref())
        .ok_or(BasketError::MissingExportInfo { item: global_id })?;

    let global_properties = GlobalProperties {
        projection: non_empty(&global.options.projection),
        resolution: global.options.resolution,
        raster_format: non_empty(&global.options.raster_format),
        vector_format: non_empty(&global.options.vector_format),
        bbox: BboxSpec::from(global.effective_bbox()),
    };

    let mut layers = Vec::with_capacity(checked.len());
    for id in checked {
        let item = tree.get(id).ok_or(BasketError::NoSuchItem { item: id })?;
        let leaf = item.as_leaf().ok_or(BasketError::NoSuchItem { item: id })?;
        let export = leaf.export.as_ref().ok_or_else(|| BasketError::MissingClassification {
            layer: item.display_name.clone(),
        })?;
        let classification =
            export.classification.as_ref().ok_or_else(|| BasketError::MissingClassification {
                layer: item.display_name.clone(),
            })?;

        layers.push(LayerSpec {
            projection: non_empty(&export.options.projection),
            resolution: export.options.resolution,
            format: non_empty(&export.options.format),
            bbox: if export.options.bbox_from_global == Some(false) {
                Some(BboxSpec::from(export.effective_bbox()))
            } else {
                None
            },
            ows_url: classification.ows_url.clone(),
            ows_type: classification.ows_type,
            layer_name: classification.layer_name.clone(),
            namespace: classification.namespace.clone(),
        });
    }

    Ok(Some(ExportRequest {
        emails: vec![email.to_string()],
        global_properties,
        layers,
    }))
}
