//! Export-service classification for WMS-sourced candidates.
//!
//! A DescribeLayer answer is trusted when it declares WCS, but a declared
//! WFS must be confirmed: GeoServer's DescribeLayer labels coverage services
//! as WFS (GEOS-2631). The confirmation pings DescribeFeatureType on the
//! declared endpoint and, if that fails, DescribeCoverage on the endpoint
//! derived by the dispatcher path substitution.
//!
//! Counter protocol: the caller registers the DescribeLayer probe before
//! invoking [`classify_wms_candidate`]; every further probe is registered
//! here before dispatch and settled exactly once, whichever branch runs.

use tracing::debug;

use geobasket_core::models::{ExportClassification, ItemId, LayerCandidate, OwsExportType};
use geobasket_ows::{urls, OwsClient};

use crate::session::DiscoverySession;

fn declared_export_type(raw: &str) -> Option<OwsExportType> {
    match raw {
        "WFS" => Some(OwsExportType::Wfs),
        "WCS" => Some(OwsExportType::Wcs),
        _ => None,
    }
}

/// Resolve the export service of one WMS-sourced candidate and attach the
/// outcome to the tree.
///
/// The pending-operation counter must already account for the DescribeLayer
/// probe issued here.
pub(crate) async fn classify_wms_candidate<C>(
    session: &DiscoverySession,
    client: &C,
    parent: ItemId,
    candidate: LayerCandidate,
) where
    C: OwsClient + ?Sized,
{
    let service_url = candidate.service.url.clone();
    let records = match client.describe_layer(&service_url, &candidate.name).await {
        Ok(records) => records,
        Err(e) => {
            debug!(layer = %candidate.name, error = %e, "DescribeLayer request failed");
            session.attach_error_leaf(
                parent,
                &service_url,
                candidate.display_name(),
                format!("the DescribeLayer request on {} did not complete", service_url),
            );
            session.counter().decrement();
            return;
        }
    };

    let Some(record) = records.first() else {
        session.attach_error_leaf(
            parent,
            &service_url,
            candidate.display_name(),
            "no export service available".to_string(),
        );
        session.counter().decrement();
        return;
    };

    let declared = match declared_export_type(&record.ows_type) {
        Some(declared) if !record.ows_url.is_empty() => declared,
        _ => {
            session.attach_error_leaf(
                parent,
                &service_url,
                candidate.display_name(),
                "no suitable export service available".to_string(),
            );
            session.counter().decrement();
            return;
        }
    };

    let layer_name = if record.layer_name.is_empty() {
        candidate.name.clone()
    } else {
        record.layer_name.clone()
    };
    let classification = ExportClassification {
        ows_type: declared,
        ows_url: record.ows_url.clone(),
        layer_name,
        layer_type: record.layer_type.clone(),
        namespace: None,
    };

    if declared == OwsExportType::Wcs {
        // DescribeLayer is trusted for WCS
        session.attach_layer_leaf(parent, candidate, classification);
        session.counter().decrement();
        return;
    }

    // Declared WFS: confirm with a DescribeFeatureType ping before trusting
    // it. Register the ping, then settle the DescribeLayer probe.
    session.counter().increment();
    session.counter().decrement();

    let feature_ping = client
        .describe_feature_type(&classification.ows_url, &classification.layer_name)
        .await;

    match feature_ping {
        Ok(()) => {
            session.attach_layer_leaf(parent, candidate, classification);
            session.counter().decrement();
        }
        Err(e) => {
            debug!(
                layer = %classification.layer_name,
                error = %e,
                "DescribeFeatureType ping failed, trying the derived WCS endpoint"
            );
            let wcs_url = urls::derive_wcs_url(&classification.ows_url);

            // register the coverage ping, then settle the feature-type probe
            session.counter().increment();
            session.counter().decrement();

            let coverage_ping = client
                .describe_coverage(&wcs_url, &classification.layer_name)
                .await;

            match coverage_ping {
                Ok(()) => {
                    let reclassified = ExportClassification {
                        ows_type: OwsExportType::Wcs,
                        ows_url: wcs_url,
                        ..classification
                    };
                    session.attach_layer_leaf(parent, candidate, reclassified);
                    session.counter().decrement();
                }
                Err(_) => {
                    let full_url =
                        urls::describe_coverage_url(&wcs_url, &classification.layer_name);
                    session.attach_error_leaf(
                        parent,
                        &service_url,
                        candidate.display_name(),
                        format!("WCS service {} not valid", full_url),
                    );
                    session.counter().decrement();
                }
            }
        }
    }
}
