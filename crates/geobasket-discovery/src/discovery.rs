//! Discovery pass orchestration.

use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

use geobasket_core::models::ServiceDescriptor;
use geobasket_ows::OwsClient;

use crate::fetcher::fetch_service;
use crate::session::DiscoverySession;

/// Run one full discovery pass to completion.
///
/// The pending-operation counter starts at the number of descriptors
/// (services plus standalone layers) and settles as capabilities requests
/// and dependent probes resolve; the session signals completion exactly
/// when the last probe lands. Failures never abort sibling descriptors.
pub async fn run_discovery<C>(
    session: Arc<DiscoverySession>,
    client: Arc<C>,
    descriptors: Vec<ServiceDescriptor>,
) where
    C: OwsClient + ?Sized,
{
    session.counter().initialize(descriptors.len() as u64);
    run_fetches(session, client, descriptors).await;
}

/// Fan out over already-registered descriptors. The counter must have been
/// initialized before this is awaited or spawned.
pub(crate) async fn run_fetches<C>(
    session: Arc<DiscoverySession>,
    client: Arc<C>,
    descriptors: Vec<ServiceDescriptor>,
) where
    C: OwsClient + ?Sized,
{
    info!(descriptors = descriptors.len(), "discovery pass started");

    let fetches = descriptors.into_iter().map(|descriptor| {
        let session = Arc::clone(&session);
        let client = Arc::clone(&client);
        async move { fetch_service(session.as_ref(), client.as_ref(), descriptor).await }
    });
    join_all(fetches).await;

    info!(items = session.with_tree(|tree| tree.len()), "discovery pass settled");
}
