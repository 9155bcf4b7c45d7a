//! Incremental tree aggregation.
//!
//! Outcomes from the fetcher and the classifier arrive in no guaranteed
//! order; each attaches its item as it settles. Displayed sibling order is
//! produced by the tree's name sort, so arrival order never shows.

use geobasket_core::models::{
    shorten_layer_name, ExportClassification, ExportInfo, ItemId, LayerCandidate, LeafItem,
    ServiceDescriptor,
};

use crate::session::DiscoverySession;

impl DiscoverySession {
    fn shorten(&self, name: &str) -> String {
        shorten_layer_name(name, self.settings().max_layer_name_length)
    }

    /// Create the group item representing one successfully fetched service
    pub(crate) fn attach_service_group(&self, descriptor: &ServiceDescriptor) -> ItemId {
        let parent = self.services_group();
        self.with_tree_mut(|tree| {
            tree.add_group(parent, descriptor.display_name.clone(), Some(descriptor.clone()))
        })
    }

    /// One service whose capabilities request failed: a disabled placeholder
    /// group (or error leaf for a standalone layer) plus one notification.
    /// Candidate layers are never enumerated.
    pub(crate) fn attach_failed_service(&self, descriptor: &ServiceDescriptor, message: String) {
        if let Some(layer_name) = &descriptor.single_layer_name {
            let parent = self.layers_group();
            let display = self.shorten(layer_name);
            self.with_tree_mut(|tree| {
                tree.add_leaf(parent, display, LeafItem::error(message.clone()))
            });
            self.emit_load_error(descriptor.url.clone(), Some(layer_name.clone()), message);
        } else {
            let parent = self.services_group();
            self.with_tree_mut(|tree| {
                tree.add_disabled_group(
                    parent,
                    descriptor.display_name.clone(),
                    Some(descriptor.clone()),
                    message.clone(),
                )
            });
            self.emit_load_error(descriptor.url.clone(), None, message);
        }
    }

    /// The descriptor named a layer the service does not advertise
    pub(crate) fn attach_missing_layer(&self, descriptor: &ServiceDescriptor, layer_name: &str) {
        let parent = self.layers_group();
        let message = "layer does not exist on the specified service";
        let display = self.shorten(layer_name);
        self.with_tree_mut(|tree| tree.add_leaf(parent, display, LeafItem::error(message)));
        self.emit_load_error(descriptor.url.clone(), Some(layer_name.to_string()), message);
    }

    /// A disabled error leaf for one candidate layer, plus one notification
    pub(crate) fn attach_error_leaf(
        &self,
        parent: ItemId,
        service_url: &str,
        layer_display: &str,
        message: String,
    ) {
        let display = self.shorten(layer_display);
        self.with_tree_mut(|tree| tree.add_leaf(parent, display, LeafItem::error(message.clone())));
        self.emit_load_error(
            service_url.to_string(),
            Some(layer_display.to_string()),
            message,
        );
    }

    /// A selectable leaf carrying a resolved candidate
    pub(crate) fn attach_layer_leaf(
        &self,
        parent: ItemId,
        candidate: LayerCandidate,
        classification: ExportClassification,
    ) -> ItemId {
        let display = self.shorten(candidate.display_name());
        let checked = self.settings().layers_checked;
        let export = ExportInfo::classified(candidate.bbox.clone(), classification);
        self.with_tree_mut(|tree| {
            tree.add_leaf(parent, display, LeafItem::layer(candidate, export, checked))
        })
    }
}
