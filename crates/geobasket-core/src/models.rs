pub mod export;
pub mod layer;
pub mod service;
pub mod tree;

pub use export::{
    BboxSpec, ExportClassification, ExportInfo, ExportOptions, ExportRequest, GlobalProperties,
    LayerSpec, OwsExportType,
};
pub use layer::{shorten_layer_name, BoundingBox, LayerCandidate};
pub use service::{OwsProtocol, ServiceDescriptor};
pub use tree::{GroupItem, ItemId, ItemKind, LayerTree, LeafItem, TreeItem};
