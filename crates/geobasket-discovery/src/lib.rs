//! geobasket Discovery - Asynchronous layer discovery and extraction
//!
//! One discovery pass fans out over the configured services and standalone
//! layers: capabilities are fetched, every candidate layer is classified to
//! its usable export service, and the outcomes aggregate into the selection
//! tree. A shared pending-operation counter gates the completion signal. The
//! [`LayerBasket`] facade ties the pass to selection, export options, and
//! batch submission.

mod aggregator;
mod classifier;
mod fetcher;

pub mod basket;
pub mod discovery;
pub mod export;
pub mod session;

pub use basket::{ExtractTrigger, LayerBasket, MapHandle, VectorLayerHandle};
pub use discovery::run_discovery;
pub use export::build_export_request;
pub use session::{DiscoverySession, DiscoverySettings, PendingCounter};
