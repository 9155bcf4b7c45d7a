//! reqwest adapter for [`OwsClient`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::capabilities::{parse_wfs_capabilities, parse_wms_capabilities};
use crate::describe::parse_describe_layer;
use crate::error::{OwsError, Result};
use crate::ports::OwsClient;
use crate::records::{DescribeLayerRecord, WfsFeatureTypeRecord, WmsLayerRecord};
use crate::urls;
use geobasket_core::models::ExportRequest;

/// HTTP client for live OGC services.
///
/// A per-request timeout is always set: a hung probe would otherwise keep the
/// pending-operation counter above zero forever and discovery would never
/// complete.
pub struct HttpOwsClient {
    client: reqwest::Client,
}

impl HttpOwsClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OwsError::Client { reason: e.to_string() })?;
        Ok(Self { client })
    }

    async fn get_checked(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url = %url, "OGC request");
        let response = self.client.get(url).send().await.map_err(|e| OwsError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(OwsError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        self.get_checked(url)
            .await?
            .text()
            .await
            .map_err(|e| OwsError::Transport { url: url.to_string(), reason: e.to_string() })
    }
}

#[async_trait]
impl OwsClient for HttpOwsClient {
    async fn wms_capabilities(&self, url: &str) -> Result<Vec<WmsLayerRecord>> {
        let body = self.get_text(&urls::wms_capabilities_url(url)).await?;
        parse_wms_capabilities(&body)
    }

    async fn wfs_capabilities(&self, url: &str) -> Result<Vec<WfsFeatureTypeRecord>> {
        let body = self.get_text(&urls::wfs_capabilities_url(url)).await?;
        parse_wfs_capabilities(&body)
    }

    async fn describe_layer(&self, url: &str, layer: &str) -> Result<Vec<DescribeLayerRecord>> {
        let body = self.get_text(&urls::describe_layer_url(url, layer)).await?;
        parse_describe_layer(&body)
    }

    async fn describe_feature_type(&self, url: &str, type_name: &str) -> Result<()> {
        self.get_checked(&urls::describe_feature_type_url(url, type_name))
            .await
            .map(|_| ())
    }

    async fn describe_coverage(&self, url: &str, coverage: &str) -> Result<()> {
        self.get_checked(&urls::describe_coverage_url(url, coverage))
            .await
            .map(|_| ())
    }

    async fn submit_extraction(&self, url: &str, request: &ExportRequest) -> Result<()> {
        debug!(url = %url, layers = request.layers.len(), "submitting extraction request");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| OwsError::Transport { url: url.to_string(), reason: e.to_string() })?;
        if !response.status().is_success() {
            return Err(OwsError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
