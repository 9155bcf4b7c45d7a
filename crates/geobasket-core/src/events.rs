//! Typed events produced by the extraction basket.
//!
//! The embedding layer registers callbacks on the [`EventBus`]; the basket
//! fires events from selection changes, discovery error recovery, and
//! extraction.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::models::export::ExportInfo;

/// Structured error detail delivered with [`BasketEvent::LoadError`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadErrorDetail {
    /// Capabilities endpoint the failure belongs to
    pub service: String,

    /// Affected layer, when the failure is layer-scoped
    pub layer: Option<String>,

    pub message: String,
}

/// Events observable on the basket
#[derive(Debug, Clone, PartialEq)]
pub enum BasketEvent {
    /// A layer selection is about to change
    BeforeLayerChange,

    /// A layer selection has changed
    LayerChange {
        export_info: ExportInfo,
        is_global_properties: bool,
    },

    /// Extraction is about to be submitted
    BeforeExtract,

    /// An error occurred while checking a layer or service
    LoadError(LoadErrorDetail),
}

type Callback = Box<dyn Fn(&BasketEvent) + Send + Sync>;

/// Callback-registration bus for [`BasketEvent`]s.
///
/// Listeners are invoked synchronously, in registration order, on the task
/// that fires the event.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Callback>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&BasketEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .expect("event bus lock poisoned")
            .push(Box::new(listener));
    }

    /// Deliver an event to every registered listener
    pub fn emit(&self, event: &BasketEvent) {
        for listener in self.listeners.read().expect("event bus lock poisoned").iter() {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.listeners.read().map(|l| l.len()).unwrap_or(0);
        f.debug_struct("EventBus").field("listeners", &count).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = Arc::clone(&count);
            bus.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.emit(&BasketEvent::BeforeExtract);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_load_error_payload() {
        let bus = EventBus::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        bus.subscribe(move |event| {
            if let BasketEvent::LoadError(detail) = event {
                seen_clone.write().unwrap().push(detail.clone());
            }
        });

        bus.emit(&BasketEvent::LoadError(LoadErrorDetail {
            service: "https://geo.example.org/wms".to_string(),
            layer: Some("roads".to_string()),
            message: "layer does not exist on the specified service".to_string(),
        }));
        bus.emit(&BasketEvent::BeforeLayerChange);

        let seen = seen.read().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].layer.as_deref(), Some("roads"));
    }
}
