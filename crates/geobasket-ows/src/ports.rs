//! Port trait for OGC network operations.
//!
//! The discovery engine talks to services exclusively through [`OwsClient`],
//! so tests can script every capabilities response and probe outcome.

use async_trait::async_trait;

use crate::error::Result;
use crate::records::{DescribeLayerRecord, WfsFeatureTypeRecord, WmsLayerRecord};
use geobasket_core::models::ExportRequest;

#[async_trait]
pub trait OwsClient: Send + Sync {
    /// Fetch and parse a WMS GetCapabilities document
    async fn wms_capabilities(&self, url: &str) -> Result<Vec<WmsLayerRecord>>;

    /// Fetch and parse a WFS GetCapabilities document
    async fn wfs_capabilities(&self, url: &str) -> Result<Vec<WfsFeatureTypeRecord>>;

    /// Issue a WMS DescribeLayer request for one layer
    async fn describe_layer(&self, url: &str, layer: &str) -> Result<Vec<DescribeLayerRecord>>;

    /// Ping a WFS DescribeFeatureType endpoint; the body is ignored
    async fn describe_feature_type(&self, url: &str, type_name: &str) -> Result<()>;

    /// Ping a WCS DescribeCoverage endpoint; the body is ignored
    async fn describe_coverage(&self, url: &str, coverage: &str) -> Result<()>;

    /// POST one batch extraction request to the submission endpoint
    async fn submit_extraction(&self, url: &str, request: &ExportRequest) -> Result<()>;
}
