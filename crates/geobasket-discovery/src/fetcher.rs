//! Capability fetching and candidate extraction.
//!
//! One fetch covers one configured descriptor: a whole service or a single
//! standalone layer. Failures never propagate past this module; every
//! outcome lands in the tree and on the event bus.

use futures::future::join_all;
use tracing::debug;

use geobasket_core::models::{
    BoundingBox, ExportClassification, LayerCandidate, OwsExportType, OwsProtocol,
    ServiceDescriptor,
};
use geobasket_ows::{reproject, OwsClient, WmsLayerRecord};

use crate::classifier::classify_wms_candidate;
use crate::session::DiscoverySession;

/// GeoServer advertises this non-standard code (GEOS-3223); it cannot be
/// used for requests and is skipped when picking a fallback SRS.
const NON_STANDARD_WGS84_CODE: &str = "EPSG:WGS84(DD)";

/// Resolve the extent of a WMS layer record.
///
/// Order: a per-SRS bounding box when the record has one, else the first
/// usable advertised SRS with the lon/lat extent reprojected into it. `None`
/// means no supported projection could be found.
fn resolve_wms_bbox(record: &WmsLayerRecord) -> Option<BoundingBox> {
    if let Some(bbox) = record.bbox_by_srs.first() {
        return Some(BoundingBox::new(bbox.srs.clone(), bbox.extent));
    }

    let srs = record
        .supported_srs
        .iter()
        .find(|code| code.as_str() != NON_STANDARD_WGS84_CODE)?;
    let latlon = record.latlon_bbox?;
    reproject::latlon_extent_to_srs(latlon, srs).ok()
}

/// Fetch one descriptor's capabilities and drive its layers through
/// classification. Settles exactly one unit of the pending-operation
/// counter for the capabilities request itself.
pub(crate) async fn fetch_service<C>(
    session: &DiscoverySession,
    client: &C,
    descriptor: ServiceDescriptor,
) where
    C: OwsClient + ?Sized,
{
    match descriptor.protocol {
        OwsProtocol::Wms => fetch_wms(session, client, descriptor).await,
        OwsProtocol::Wfs => fetch_wfs(session, client, descriptor).await,
    }
}

async fn fetch_wms<C>(session: &DiscoverySession, client: &C, descriptor: ServiceDescriptor)
where
    C: OwsClient + ?Sized,
{
    let url = descriptor.url.clone();
    let records = match client.wms_capabilities(&url).await {
        Ok(records) => records,
        Err(e) => {
            debug!(url = %url, error = %e, "WMS capabilities request failed");
            session.attach_failed_service(
                &descriptor,
                format!("the WMS capabilities request on {} did not complete", url),
            );
            session.counter().decrement();
            return;
        }
    };

    let (parent, records) = if let Some(target) = descriptor.single_layer_name.clone() {
        match records.into_iter().find(|record| record.name == target) {
            Some(record) => (session.layers_group(), vec![record]),
            None => {
                session.attach_missing_layer(&descriptor, &target);
                session.counter().decrement();
                return;
            }
        }
    } else {
        (session.attach_service_group(&descriptor), records)
    };

    let mut candidates = Vec::new();
    for record in records {
        match resolve_wms_bbox(&record) {
            Some(bbox) => candidates.push(LayerCandidate {
                title: record.title,
                name: record.name,
                service: descriptor.clone(),
                bbox,
                namespace: None,
            }),
            None => {
                let display = if record.title.is_empty() { &record.name } else { &record.title };
                session.attach_error_leaf(
                    parent,
                    &url,
                    display,
                    "no supported projection found for this layer".to_string(),
                );
            }
        }
    }

    // Register one DescribeLayer probe per candidate before anything is
    // dispatched, so the counter can never touch zero while work remains.
    for _ in &candidates {
        session.counter().increment();
    }

    let classifications = candidates
        .into_iter()
        .map(|candidate| classify_wms_candidate(session, client, parent, candidate));

    // capabilities request settled
    session.counter().decrement();

    join_all(classifications).await;
}

async fn fetch_wfs<C>(session: &DiscoverySession, client: &C, descriptor: ServiceDescriptor)
where
    C: OwsClient + ?Sized,
{
    let url = descriptor.url.clone();
    let records = match client.wfs_capabilities(&url).await {
        Ok(records) => records,
        Err(e) => {
            debug!(url = %url, error = %e, "WFS capabilities request failed");
            session.attach_failed_service(
                &descriptor,
                format!("the WFS capabilities request on {} did not complete", url),
            );
            session.counter().decrement();
            return;
        }
    };

    let (parent, records) = if let Some(target) = descriptor.single_layer_name.clone() {
        // requested names may carry a namespace prefix; match on local parts
        let target_local = target.rsplit(':').next().unwrap_or(&target).to_string();
        match records.into_iter().find(|record| record.local_name() == target_local) {
            Some(record) => (session.layers_group(), vec![record]),
            None => {
                session.attach_missing_layer(&descriptor, &target);
                session.counter().decrement();
                return;
            }
        }
    } else {
        (session.attach_service_group(&descriptor), records)
    };

    // A WFS-sourced layer is its own export service: classification is
    // immediate, no probes.
    for record in records {
        let classification = ExportClassification {
            ows_type: OwsExportType::Wfs,
            ows_url: url.clone(),
            layer_name: record.local_name().to_string(),
            layer_type: None,
            namespace: record.namespace.clone(),
        };
        let candidate = LayerCandidate {
            title: record.title.clone(),
            name: record.name.clone(),
            service: descriptor.clone(),
            bbox: session.settings().global_bbox(),
            namespace: record.namespace,
        };
        session.attach_layer_leaf(parent, candidate, classification);
    }

    session.counter().decrement();
}
