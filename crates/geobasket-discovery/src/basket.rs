//! The extraction basket facade.
//!
//! [`LayerBasket`] ties one set of configured descriptors to discovery
//! passes, selection state, export options, and batch submission. The
//! embedding layer owns rendering and checkboxes; it drives the basket
//! through item ids and listens on the event bus.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

use geobasket_core::config::BasketConfig;
use geobasket_core::error::{BasketError, Result};
use geobasket_core::events::{BasketEvent, EventBus};
use geobasket_core::models::{ExportOptions, ItemId, LayerTree, ServiceDescriptor, TreeItem};
use geobasket_ows::OwsClient;

use crate::discovery::run_fetches;
use crate::export::build_export_request;
use crate::session::{DiscoverySession, DiscoverySettings};

/// Opaque handle to the embedding layer's map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHandle(pub u64);

/// Opaque handle to the embedding layer's vector overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorLayerHandle(pub u64);

/// UI trigger disabled while a submission cools down
pub trait ExtractTrigger: Send + Sync {
    fn set_enabled(&self, enabled: bool);
}

#[derive(Default)]
struct BasketState {
    session: Option<Arc<DiscoverySession>>,
    selected: Option<ItemId>,
    map: Option<MapHandle>,
    vector_layer: Option<VectorLayerHandle>,
}

pub struct LayerBasket<C: OwsClient + ?Sized> {
    client: Arc<C>,
    config: BasketConfig,
    descriptors: Vec<ServiceDescriptor>,
    events: Arc<EventBus>,
    state: Mutex<BasketState>,
}

impl<C: OwsClient + ?Sized + 'static> LayerBasket<C> {
    pub fn new(
        client: Arc<C>,
        config: BasketConfig,
        descriptors: Vec<ServiceDescriptor>,
    ) -> Self {
        Self {
            client,
            config,
            descriptors,
            events: Arc::new(EventBus::new()),
            state: Mutex::new(BasketState::default()),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register an event listener
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&BasketEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BasketState> {
        self.state.lock().expect("basket state lock poisoned")
    }

    fn fresh_session(&self) -> Arc<DiscoverySession> {
        let has_layers = self.descriptors.iter().any(ServiceDescriptor::is_single_layer);
        let has_services = self.descriptors.iter().any(|d| !d.is_single_layer());
        Arc::new(DiscoverySession::new(
            DiscoverySettings::from_config(&self.config),
            Arc::clone(&self.events),
            has_layers,
            has_services,
        ))
    }

    /// Build the skeleton hierarchy for the next discovery pass.
    ///
    /// Fails while a previous pass is still pending; a finished pass is
    /// replaced wholesale.
    pub fn create(&self) -> Result<LayerTree> {
        let mut state = self.lock_state();
        if let Some(session) = &state.session {
            if session.counter().is_initialized() && !session.counter().is_complete() {
                return Err(BasketError::DiscoveryInProgress);
            }
        }
        let session = self.fresh_session();
        let snapshot = session.snapshot();
        state.session = Some(session);
        state.selected = None;
        Ok(snapshot)
    }

    /// Start the discovery pass over the configured descriptors.
    ///
    /// Returns immediately; outcomes stream into the tree and the event bus
    /// as probes settle. Must run inside a tokio runtime. The default
    /// selection is the global-properties item.
    pub fn init(&self, map: MapHandle, vector_layer: VectorLayerHandle) -> Result<()> {
        let session = {
            let mut state = self.lock_state();
            let current = match &state.session {
                None => return Err(BasketError::NotCreated),
                Some(session) => Arc::clone(session),
            };
            let session = if current.counter().is_initialized() {
                if !current.counter().is_complete() {
                    return Err(BasketError::DiscoveryInProgress);
                }
                // previous pass finished: the hierarchy is replaced
                let fresh = self.fresh_session();
                state.session = Some(Arc::clone(&fresh));
                state.selected = None;
                fresh
            } else {
                current
            };
            state.map = Some(map);
            state.vector_layer = Some(vector_layer);
            session
        };

        // arm the counter before returning so an overlapping init is
        // rejected even if the spawned pass has not been polled yet
        session.counter().initialize(self.descriptors.len() as u64);

        let client = Arc::clone(&self.client);
        let descriptors = self.descriptors.clone();
        tokio::spawn(run_fetches(Arc::clone(&session), client, descriptors));

        self.select(session.global_item())
    }

    /// Wait until the running pass has settled every probe
    pub async fn wait_discovery(&self) -> Result<()> {
        let session = self
            .lock_state()
            .session
            .as_ref()
            .map(Arc::clone)
            .ok_or(BasketError::NotCreated)?;
        session.counter().wait_idle().await;
        Ok(())
    }

    pub fn map_handle(&self) -> Option<MapHandle> {
        self.lock_state().map
    }

    pub fn vector_layer_handle(&self) -> Option<VectorLayerHandle> {
        self.lock_state().vector_layer
    }

    /// Owned copy of the current hierarchy, when one exists
    pub fn tree(&self) -> Option<LayerTree> {
        self.lock_state().session.as_ref().map(|session| session.snapshot())
    }

    /// Select one enabled leaf.
    ///
    /// Fires `beforelayerchange` when a selection is replaced, then
    /// `layerchange` with the new item's export info. A selectable leaf
    /// without export info is an invariant violation.
    pub fn select(&self, item: ItemId) -> Result<()> {
        let mut state = self.lock_state();
        let session = state.session.as_ref().ok_or(BasketError::NotCreated)?;

        let found = session.with_tree(|tree| {
            tree.get(item).map(|tree_item| {
                tree_item
                    .as_leaf()
                    .map(|leaf| (!leaf.disabled, leaf.export.clone(), leaf.is_global_properties))
            })
        });

        let leaf = match found {
            None => return Err(BasketError::NoSuchItem { item }),
            Some(None) => {
                return Err(BasketError::NotSelectable {
                    item,
                    reason: "only leaf items are selectable".to_string(),
                })
            }
            Some(Some((false, _, _))) => {
                return Err(BasketError::NotSelectable {
                    item,
                    reason: "item is disabled".to_string(),
                })
            }
            Some(Some((true, export, is_global))) => (export, is_global),
        };
        let (export, is_global_properties) = leaf;
        let export_info = export.ok_or(BasketError::MissingExportInfo { item })?;

        let had_selection = state.selected.is_some();
        state.selected = Some(item);
        // release the state lock before running listeners
        drop(state);

        if had_selection {
            self.events.emit(&BasketEvent::BeforeLayerChange);
        }
        self.events.emit(&BasketEvent::LayerChange { export_info, is_global_properties });
        Ok(())
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.lock_state().selected
    }

    /// Merge user-edited export options into the selected item
    pub fn save_export_options(&self, options: ExportOptions) -> Result<()> {
        let state = self.lock_state();
        let session = state.session.as_ref().ok_or(BasketError::NotCreated)?;
        let selected = state.selected.ok_or(BasketError::NothingSelected)?;

        session.with_tree_mut(|tree| {
            let leaf = tree
                .get_mut(selected)
                .and_then(TreeItem::as_leaf_mut)
                .ok_or(BasketError::NoSuchItem { item: selected })?;
            let export = leaf
                .export
                .as_mut()
                .ok_or(BasketError::MissingExportInfo { item: selected })?;
            export.options.merge(options);
            Ok(())
        })
    }

    /// Check or uncheck an item; groups cascade. Returns how many leaves
    /// changed state.
    pub fn set_checked(&self, item: ItemId, checked: bool) -> Result<usize> {
        let state = self.lock_state();
        let session = state.session.as_ref().ok_or(BasketError::NotCreated)?;
        Ok(session.with_tree_mut(|tree| tree.set_checked(item, checked)))
    }

    /// Number of layers currently in the extraction basket
    pub fn selected_layers_count(&self) -> usize {
        self.lock_state()
            .session
            .as_ref()
            .map(|session| session.with_tree(|tree| tree.checked_count()))
            .unwrap_or(0)
    }

    /// Check every checkable layer; returns how many changed state
    pub fn select_all_layers(&self) -> usize {
        self.lock_state()
            .session
            .as_ref()
            .map(|session| session.with_tree_mut(|tree| tree.select_all()))
            .unwrap_or(0)
    }

    /// Submit the checked layers as one batch extraction request.
    ///
    /// With nothing checked this is a silent no-op: no network call, no
    /// error, `Ok(false)`. On success the optional trigger is disabled for
    /// the configured cooldown.
    pub async fn extract(
        &self,
        email: &str,
        trigger: Option<Arc<dyn ExtractTrigger>>,
    ) -> Result<bool> {
        let snapshot = {
            let state = self.lock_state();
            match &state.session {
                None => return Ok(false),
                Some(session) => session.snapshot(),
            }
        };

        let Some(request) = build_export_request(&snapshot, email)? else {
            return Ok(false);
        };

        self.events.emit(&BasketEvent::BeforeExtract);
        let url = self.config.extractor_batch_url.value.clone();
        info!(url = %url, layers = request.layers.len(), "submitting extraction request");

        if let Err(e) = self.client.submit_extraction(&url, &request).await {
            warn!(url = %url, error = %e, "extraction request failed");
            return Err(BasketError::SubmissionFailed { url, reason: e.to_string() });
        }

        if let Some(trigger) = trigger {
            trigger.set_enabled(false);
            let cooldown = Duration::from_secs(self.config.extract_cooldown_secs.value);
            tokio::spawn(async move {
                tokio::time::sleep(cooldown).await;
                trigger.set_enabled(true);
            });
        }

        Ok(true)
    }
}
