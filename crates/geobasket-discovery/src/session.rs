//! Per-pass discovery state.
//!
//! A [`DiscoverySession`] bundles the pending-operation counter, the tree
//! being built, and the event bus for exactly one discovery pass. Sessions
//! are never reused: the next pass gets a fresh one, so a stale counter can
//! never leak between passes.

use std::sync::Mutex;
use tokio::sync::Notify;

use geobasket_core::config::BasketConfig;
use geobasket_core::events::{BasketEvent, EventBus, LoadErrorDetail};
use geobasket_core::models::{BoundingBox, ExportInfo, ItemId, LayerTree, LeafItem};
use std::sync::Arc;

/// Shared counter of in-flight asynchronous operations.
///
/// Initialized to the number of capabilities requests before the pass
/// starts, incremented before every dependent probe is dispatched, and
/// decremented exactly once when a probe settles. The completion signal
/// fires exactly once, when the counter reaches zero after initialization.
#[derive(Debug, Default)]
pub struct PendingCounter {
    inner: Mutex<CounterInner>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct CounterInner {
    pending: u64,
    initialized: bool,
    completions: u32,
}

impl PendingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the counter with the number of initially scheduled operations.
    ///
    /// A pass with nothing to do completes immediately.
    pub fn initialize(&self, expected: u64) {
        let fire = {
            let mut inner = self.inner.lock().expect("pending counter lock poisoned");
            debug_assert!(!inner.initialized, "counter initialized twice");
            inner.pending = expected;
            inner.initialized = true;
            if inner.pending == 0 {
                inner.completions += 1;
                true
            } else {
                false
            }
        };
        if fire {
            self.notify.notify_waiters();
        }
    }

    /// Register one more in-flight operation. Must happen before the
    /// operation is dispatched.
    pub fn increment(&self) {
        let mut inner = self.inner.lock().expect("pending counter lock poisoned");
        inner.pending += 1;
    }

    /// Record that one operation settled, successfully or not
    pub fn decrement(&self) {
        let fire = {
            let mut inner = self.inner.lock().expect("pending counter lock poisoned");
            if inner.pending == 0 {
                tracing::error!("pending counter decremented below zero");
                return;
            }
            inner.pending -= 1;
            if inner.pending == 0 && inner.initialized && inner.completions == 0 {
                inner.completions += 1;
                true
            } else {
                false
            }
        };
        if fire {
            self.notify.notify_waiters();
        }
    }

    pub fn pending(&self) -> u64 {
        self.inner.lock().expect("pending counter lock poisoned").pending
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock().expect("pending counter lock poisoned").initialized
    }

    pub fn is_complete(&self) -> bool {
        self.completion_count() > 0
    }

    /// How many times the completion signal has fired. Never exceeds one.
    pub fn completion_count(&self) -> u32 {
        self.inner.lock().expect("pending counter lock poisoned").completions
    }

    /// Wait until the pass is complete. Returns immediately if it already is.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_complete() {
                return;
            }
            notified.await;
        }
    }
}

/// Discovery knobs snapshotted from [`BasketConfig`] for one pass
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub global_crs: String,
    pub global_extent: [f64; 4],
    pub layers_checked: bool,
    pub max_layer_name_length: usize,
}

impl DiscoverySettings {
    pub fn from_config(config: &BasketConfig) -> Self {
        Self {
            global_crs: config.global_crs.value.clone(),
            global_extent: config.global_extent.value,
            layers_checked: config.layers_checked.value,
            max_layer_name_length: config.max_layer_name_length.value,
        }
    }

    pub fn global_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.global_crs.clone(), self.global_extent)
    }
}

/// State of one discovery pass: counter, tree under construction, event bus.
#[derive(Debug)]
pub struct DiscoverySession {
    counter: PendingCounter,
    tree: Mutex<LayerTree>,
    events: Arc<EventBus>,
    settings: DiscoverySettings,
    global_item: ItemId,
    layers_group: Option<ItemId>,
    services_group: Option<ItemId>,
}

impl DiscoverySession {
    /// Build the skeleton hierarchy: root, the global-properties item, and
    /// the container groups needed by the configured descriptors.
    pub fn new(
        settings: DiscoverySettings,
        events: Arc<EventBus>,
        has_standalone_layers: bool,
        has_services: bool,
    ) -> Self {
        let mut tree = LayerTree::new("Extraction basket");
        let root = tree.root();

        let global_item = tree.add_leaf(
            root,
            "Default parameters",
            LeafItem::global_properties(ExportInfo::new(settings.global_bbox())),
        );

        let layers_group =
            has_standalone_layers.then(|| tree.add_group(root, "OGC layers", None));
        let services_group = has_services.then(|| tree.add_group(root, "OGC services", None));

        Self {
            counter: PendingCounter::new(),
            tree: Mutex::new(tree),
            events,
            settings,
            global_item,
            layers_group,
            services_group,
        }
    }

    pub fn counter(&self) -> &PendingCounter {
        &self.counter
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    pub fn global_item(&self) -> ItemId {
        self.global_item
    }

    /// Parent for standalone-layer items; falls back to the root when no
    /// standalone layers were configured
    pub fn layers_group(&self) -> ItemId {
        self.layers_group
            .unwrap_or_else(|| self.with_tree(|tree| tree.root()))
    }

    /// Parent for service groups; falls back to the root when no services
    /// were configured
    pub fn services_group(&self) -> ItemId {
        self.services_group
            .unwrap_or_else(|| self.with_tree(|tree| tree.root()))
    }

    pub fn with_tree<R>(&self, f: impl FnOnce(&LayerTree) -> R) -> R {
        f(&self.tree.lock().expect("tree lock poisoned"))
    }

    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut LayerTree) -> R) -> R {
        f(&mut self.tree.lock().expect("tree lock poisoned"))
    }

    /// Owned copy of the current hierarchy
    pub fn snapshot(&self) -> LayerTree {
        self.with_tree(|tree| tree.clone())
    }

    pub fn emit(&self, event: &BasketEvent) {
        self.events.emit(event);
    }

    /// Emit one structured `loaderror` notification
    pub fn emit_load_error(
        &self,
        service: impl Into<String>,
        layer: Option<String>,
        message: impl Into<String>,
    ) {
        let detail = LoadErrorDetail {
            service: service.into(),
            layer,
            message: message.into(),
        };
        tracing::warn!(
            service = %detail.service,
            layer = detail.layer.as_deref().unwrap_or(""),
            "{}",
            detail.message
        );
        self.events.emit(&BasketEvent::LoadError(detail));
    }
}
