//! Integration tests for the basket facade: selection protocol, export
//! options, extraction submission, and pass lifecycle.

mod common;

use common::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use geobasket_core::config::BasketConfig;
use geobasket_core::error::BasketError;
use geobasket_core::events::BasketEvent;
use geobasket_core::models::{ExportOptions, ItemId, OwsProtocol, ServiceDescriptor};
use geobasket_discovery::{ExtractTrigger, LayerBasket, MapHandle, VectorLayerHandle};

struct FlagTrigger {
    enabled: AtomicBool,
}

impl FlagTrigger {
    fn new() -> Arc<Self> {
        Arc::new(Self { enabled: AtomicBool::new(true) })
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl ExtractTrigger for FlagTrigger {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

fn config() -> BasketConfig {
    let mut config = BasketConfig::with_defaults();
    config.extractor_batch_url.value = "https://geo.example.org/extractor/initiate".to_string();
    config.extract_cooldown_secs.value = 0;
    config
}

fn two_layer_client() -> MockOwsClient {
    MockOwsClient::new().with_wfs_capabilities(
        "https://geo.example.org/wfs",
        vec![wfs_record("rivers", "Rivers", None), wfs_record("lakes", "Lakes", None)],
    )
}

fn wfs_descriptors() -> Vec<ServiceDescriptor> {
    vec![ServiceDescriptor::service("https://geo.example.org/wfs", OwsProtocol::Wfs, "Geo")]
}

fn build_basket(
    client: MockOwsClient,
    config: BasketConfig,
) -> (LayerBasket<MockOwsClient>, Arc<MockOwsClient>) {
    let client = Arc::new(client);
    let basket = LayerBasket::new(Arc::clone(&client), config, wfs_descriptors());
    (basket, client)
}

async fn discovered(
    client: MockOwsClient,
) -> (LayerBasket<MockOwsClient>, Arc<MockOwsClient>) {
    let (basket, client) = build_basket(client, config());
    basket.create().unwrap();
    basket.init(MapHandle(1), VectorLayerHandle(2)).unwrap();
    basket.wait_discovery().await.unwrap();
    (basket, client)
}

fn leaf_by_name(basket: &LayerBasket<MockOwsClient>, name: &str) -> ItemId {
    let tree = basket.tree().unwrap();
    tree.leaves()
        .into_iter()
        .find(|id| tree.get(*id).map(|item| item.display_name == name).unwrap_or(false))
        .unwrap()
}

#[tokio::test]
async fn extract_submits_checked_layers() {
    let (basket, client) = discovered(two_layer_client()).await;
    assert_eq!(basket.selected_layers_count(), 2);

    let before_extract = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&before_extract);
    basket.subscribe(move |event| {
        if matches!(event, BasketEvent::BeforeExtract) {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });

    let trigger = FlagTrigger::new();
    let submitted = basket
        .extract("user@example.org", Some(trigger.clone() as Arc<dyn ExtractTrigger>))
        .await
        .unwrap();
    assert!(submitted);
    assert_eq!(before_extract.load(Ordering::SeqCst), 1);

    // trigger is disabled until the cooldown elapses
    assert!(!trigger.is_enabled());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(trigger.is_enabled());

    let submissions = client.submissions.lock().unwrap();
    assert_eq!(submissions.len(), 1);
    let request = &submissions[0];
    assert_eq!(request.emails, vec!["user@example.org"]);
    // depth-first display order: Lakes before Rivers
    let names: Vec<&str> = request.layers.iter().map(|l| l.layer_name.as_str()).collect();
    assert_eq!(names, vec!["lakes", "rivers"]);
    // unset overrides ship as nulls
    assert!(request.layers[0].projection.is_none());
    assert!(request.layers[0].bbox.is_none());
}

#[tokio::test]
async fn extract_with_zero_checked_leaves_is_a_silent_noop() {
    let mut config = config();
    config.layers_checked.value = false;
    let (basket, client) = build_basket(two_layer_client(), config);
    basket.create().unwrap();
    basket.init(MapHandle(1), VectorLayerHandle(2)).unwrap();
    basket.wait_discovery().await.unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&fired);
    basket.subscribe(move |event| {
        if matches!(event, BasketEvent::BeforeExtract) {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });

    let submitted = basket.extract("user@example.org", None).await.unwrap();
    assert!(!submitted);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(client.submissions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn overlapping_discovery_passes_are_rejected() {
    let client = MockOwsClient::new().with_wms_capabilities_delayed(
        "https://slow.example.org/wms",
        vec![wms_record("roads", "Roads")],
        Duration::from_millis(100),
    );
    // no describe-layer scripted: that probe fails after the delay, which is
    // fine for lifecycle purposes
    let descriptors =
        vec![ServiceDescriptor::service("https://slow.example.org/wms", OwsProtocol::Wms, "Slow")];
    let basket = LayerBasket::new(Arc::new(client), config(), descriptors);

    basket.create().unwrap();
    basket.init(MapHandle(1), VectorLayerHandle(2)).unwrap();

    assert!(matches!(
        basket.init(MapHandle(1), VectorLayerHandle(2)),
        Err(BasketError::DiscoveryInProgress)
    ));
    assert!(matches!(basket.create(), Err(BasketError::DiscoveryInProgress)));

    basket.wait_discovery().await.unwrap();

    // a finished pass can be superseded
    basket.init(MapHandle(1), VectorLayerHandle(2)).unwrap();
    basket.wait_discovery().await.unwrap();
}

#[tokio::test]
async fn default_selection_is_the_global_properties_item() {
    let (basket, _client) = build_basket(two_layer_client(), config());
    basket.create().unwrap();

    let layer_changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&layer_changes);
    basket.subscribe(move |event| {
        if let BasketEvent::LayerChange { is_global_properties, .. } = event {
            sink.lock().unwrap().push(*is_global_properties);
        }
    });

    basket.init(MapHandle(1), VectorLayerHandle(2)).unwrap();
    basket.wait_discovery().await.unwrap();

    let changes = layer_changes.lock().unwrap();
    assert_eq!(changes.as_slice(), &[true]);

    let tree = basket.tree().unwrap();
    assert_eq!(basket.selected(), tree.global_properties_item());
    assert_eq!(basket.map_handle(), Some(MapHandle(1)));
    assert_eq!(basket.vector_layer_handle(), Some(VectorLayerHandle(2)));
}

#[tokio::test]
async fn saved_options_flow_into_the_payload() {
    let (basket, client) = discovered(two_layer_client()).await;

    let before_changes = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&before_changes);
    basket.subscribe(move |event| {
        if matches!(event, BasketEvent::BeforeLayerChange) {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });

    let rivers = leaf_by_name(&basket, "Rivers");
    basket.select(rivers).unwrap();
    // replacing the default selection announces the change first
    assert_eq!(before_changes.load(Ordering::SeqCst), 1);

    basket
        .save_export_options(ExportOptions {
            projection: Some("EPSG:2154".to_string()),
            resolution: Some(0.5),
            bbox_from_global: Some(false),
            ..Default::default()
        })
        .unwrap();

    basket.extract("user@example.org", None).await.unwrap();

    let submissions = client.submissions.lock().unwrap();
    let rivers_spec =
        submissions[0].layers.iter().find(|l| l.layer_name == "rivers").unwrap();
    assert_eq!(rivers_spec.projection.as_deref(), Some("EPSG:2154"));
    assert_eq!(rivers_spec.resolution, Some(0.5));
    assert!(rivers_spec.bbox.is_some());

    let lakes_spec = submissions[0].layers.iter().find(|l| l.layer_name == "lakes").unwrap();
    assert!(lakes_spec.projection.is_none());
    assert!(lakes_spec.bbox.is_none());
}

#[tokio::test]
async fn selecting_a_disabled_or_group_item_fails() {
    let client = MockOwsClient::new().with_wfs_capabilities(
        "https://geo.example.org/wfs",
        vec![wfs_record("rivers", "Rivers", None)],
    );
    let (basket, _client) = discovered(client).await;
    let tree = basket.tree().unwrap();

    // groups are not selectable
    let group = tree
        .children_sorted(tree.root())
        .into_iter()
        .find(|id| tree.get(*id).map(|item| !item.is_leaf()).unwrap_or(false))
        .unwrap();
    assert!(matches!(basket.select(group), Err(BasketError::NotSelectable { .. })));

    // unknown ids are reported as such
    assert!(matches!(
        basket.select(ItemId(9999)),
        Err(BasketError::NoSuchItem { .. })
    ));
}

#[tokio::test]
async fn failed_submission_keeps_the_trigger_enabled() {
    let client = two_layer_client().with_submit_failure();
    let (basket, _client) = discovered(client).await;

    let trigger = FlagTrigger::new();
    let result = basket
        .extract("user@example.org", Some(trigger.clone() as Arc<dyn ExtractTrigger>))
        .await;

    assert!(matches!(result, Err(BasketError::SubmissionFailed { .. })));
    assert!(trigger.is_enabled());
}

#[tokio::test]
async fn select_all_layers_checks_everything_once() {
    let mut config = config();
    config.layers_checked.value = false;
    let (basket, _client) = build_basket(two_layer_client(), config);
    basket.create().unwrap();
    basket.init(MapHandle(1), VectorLayerHandle(2)).unwrap();
    basket.wait_discovery().await.unwrap();

    assert_eq!(basket.selected_layers_count(), 0);
    assert_eq!(basket.select_all_layers(), 2);
    assert_eq!(basket.selected_layers_count(), 2);
    assert_eq!(basket.select_all_layers(), 0);
}
