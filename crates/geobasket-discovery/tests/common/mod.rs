//! Scripted in-memory OWS client shared by the integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use geobasket_core::models::ExportRequest;
use geobasket_ows::error::OwsError;
use geobasket_ows::{DescribeLayerRecord, OwsClient, SrsBoundingBox, WfsFeatureTypeRecord, WmsLayerRecord};

type OwsResult<T> = geobasket_ows::Result<T>;

fn transport_failure(url: &str) -> OwsError {
    OwsError::Transport { url: url.to_string(), reason: "connection refused".to_string() }
}

#[derive(Clone)]
struct Scripted<T> {
    outcome: Option<T>,
    delay: Duration,
}

/// Per-probe call counters, for asserting which probes ran
#[derive(Default)]
#[allow(dead_code)]
pub struct ProbeCounters {
    pub wms_capabilities: AtomicUsize,
    pub wfs_capabilities: AtomicUsize,
    pub describe_layer: AtomicUsize,
    pub feature_type: AtomicUsize,
    pub coverage: AtomicUsize,
}

/// OWS client whose every response is scripted by the test.
///
/// Unscripted requests fail with a transport error. Optional per-entry
/// delays let tests scramble arrival order.
#[derive(Default)]
pub struct MockOwsClient {
    wms_caps: HashMap<String, Scripted<Vec<WmsLayerRecord>>>,
    wfs_caps: HashMap<String, Scripted<Vec<WfsFeatureTypeRecord>>>,
    describe_layers: HashMap<(String, String), Scripted<Vec<DescribeLayerRecord>>>,
    feature_pings: HashMap<(String, String), Scripted<()>>,
    coverage_pings: HashMap<(String, String), Scripted<()>>,
    submit_failure: bool,
    pub counters: ProbeCounters,
    pub submissions: Mutex<Vec<ExportRequest>>,
}

#[allow(dead_code)]
impl MockOwsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wms_capabilities(mut self, url: &str, records: Vec<WmsLayerRecord>) -> Self {
        self.wms_caps.insert(
            url.to_string(),
            Scripted { outcome: Some(records), delay: Duration::ZERO },
        );
        self
    }

    pub fn with_wms_capabilities_delayed(
        mut self,
        url: &str,
        records: Vec<WmsLayerRecord>,
        delay: Duration,
    ) -> Self {
        self.wms_caps.insert(url.to_string(), Scripted { outcome: Some(records), delay });
        self
    }

    pub fn with_wms_failure(mut self, url: &str) -> Self {
        self.wms_caps
            .insert(url.to_string(), Scripted { outcome: None, delay: Duration::ZERO });
        self
    }

    pub fn with_wfs_capabilities(mut self, url: &str, records: Vec<WfsFeatureTypeRecord>) -> Self {
        self.wfs_caps.insert(
            url.to_string(),
            Scripted { outcome: Some(records), delay: Duration::ZERO },
        );
        self
    }

    pub fn with_wfs_failure(mut self, url: &str) -> Self {
        self.wfs_caps
            .insert(url.to_string(), Scripted { outcome: None, delay: Duration::ZERO });
        self
    }

    pub fn with_describe_layer(
        mut self,
        url: &str,
        layer: &str,
        records: Vec<DescribeLayerRecord>,
    ) -> Self {
        self.describe_layers.insert(
            (url.to_string(), layer.to_string()),
            Scripted { outcome: Some(records), delay: Duration::ZERO },
        );
        self
    }

    pub fn with_describe_layer_failure(mut self, url: &str, layer: &str) -> Self {
        self.describe_layers.insert(
            (url.to_string(), layer.to_string()),
            Scripted { outcome: None, delay: Duration::ZERO },
        );
        self
    }

    pub fn with_feature_ping(mut self, url: &str, type_name: &str, ok: bool) -> Self {
        self.feature_pings.insert(
            (url.to_string(), type_name.to_string()),
            Scripted { outcome: ok.then_some(()), delay: Duration::ZERO },
        );
        self
    }

    pub fn with_coverage_ping(mut self, url: &str, coverage: &str, ok: bool) -> Self {
        self.coverage_pings.insert(
            (url.to_string(), coverage.to_string()),
            Scripted { outcome: ok.then_some(()), delay: Duration::ZERO },
        );
        self
    }

    pub fn with_submit_failure(mut self) -> Self {
        self.submit_failure = true;
        self
    }

    async fn resolve<T: Clone>(
        entry: Option<&Scripted<T>>,
        url: &str,
    ) -> OwsResult<T> {
        match entry {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.outcome.clone().ok_or_else(|| transport_failure(url))
            }
            None => Err(transport_failure(url)),
        }
    }
}

#[async_trait]
impl OwsClient for MockOwsClient {
    async fn wms_capabilities(&self, url: &str) -> OwsResult<Vec<WmsLayerRecord>> {
        self.counters.wms_capabilities.fetch_add(1, Ordering::SeqCst);
        Self::resolve(self.wms_caps.get(url), url).await
    }

    async fn wfs_capabilities(&self, url: &str) -> OwsResult<Vec<WfsFeatureTypeRecord>> {
        self.counters.wfs_capabilities.fetch_add(1, Ordering::SeqCst);
        Self::resolve(self.wfs_caps.get(url), url).await
    }

    async fn describe_layer(&self, url: &str, layer: &str) -> OwsResult<Vec<DescribeLayerRecord>> {
        self.counters.describe_layer.fetch_add(1, Ordering::SeqCst);
        let key = (url.to_string(), layer.to_string());
        Self::resolve(self.describe_layers.get(&key), url).await
    }

    async fn describe_feature_type(&self, url: &str, type_name: &str) -> OwsResult<()> {
        self.counters.feature_type.fetch_add(1, Ordering::SeqCst);
        let key = (url.to_string(), type_name.to_string());
        Self::resolve(self.feature_pings.get(&key), url).await
    }

    async fn describe_coverage(&self, url: &str, coverage: &str) -> OwsResult<()> {
        self.counters.coverage.fetch_add(1, Ordering::SeqCst);
        let key = (url.to_string(), coverage.to_string());
        Self::resolve(self.coverage_pings.get(&key), url).await
    }

    async fn submit_extraction(&self, url: &str, request: &ExportRequest) -> OwsResult<()> {
        if self.submit_failure {
            return Err(OwsError::Status { url: url.to_string(), status: 500 });
        }
        self.submissions.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// A WMS layer record with an advertised per-SRS bounding box
#[allow(dead_code)]
pub fn wms_record(name: &str, title: &str) -> WmsLayerRecord {
    WmsLayerRecord {
        name: name.to_string(),
        title: title.to_string(),
        bbox_by_srs: vec![SrsBoundingBox {
            srs: "EPSG:2154".to_string(),
            extent: [100000.0, 6000000.0, 1300000.0, 7200000.0],
        }],
        supported_srs: vec!["EPSG:4326".to_string(), "EPSG:2154".to_string()],
        latlon_bbox: Some([-5.2, 41.3, 9.6, 51.1]),
    }
}

/// A WMS layer record advertising only an unusable SRS and no bounding box
#[allow(dead_code)]
pub fn wms_record_without_projection(name: &str) -> WmsLayerRecord {
    WmsLayerRecord {
        name: name.to_string(),
        title: name.to_string(),
        bbox_by_srs: vec![],
        supported_srs: vec!["EPSG:WGS84(DD)".to_string()],
        latlon_bbox: Some([-5.2, 41.3, 9.6, 51.1]),
    }
}

#[allow(dead_code)]
pub fn wfs_record(name: &str, title: &str, namespace: Option<&str>) -> WfsFeatureTypeRecord {
    WfsFeatureTypeRecord {
        name: name.to_string(),
        title: title.to_string(),
        namespace: namespace.map(String::from),
    }
}

#[allow(dead_code)]
pub fn describe_record(ows_type: &str, ows_url: &str, layer_name: &str) -> DescribeLayerRecord {
    DescribeLayerRecord {
        ows_type: ows_type.to_string(),
        ows_url: ows_url.to_string(),
        layer_name: layer_name.to_string(),
        layer_type: None,
    }
}
