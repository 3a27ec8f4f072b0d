pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod parser;

pub use catalog::{NodeCatalog, NodeTemplate, Orientation, PortTemplate};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, Padding, PortMetrics, load_config};
pub use error::{LayoutError, Result};
pub use interaction::{DragEvent, DragState, InteractionController, Notification};
pub use ir::{Document, RawEndpoint, RawGraph, RawLink, RawNode, RawNodeTemplate, RawPortTemplate};
pub use layout::{Layout, LinkSegment, OriginShift, Point, Rect, Refresh, Size};
pub use layout_dump::{LayoutDump, write_layout_dump};
pub use model::{GraphModel, Link, Node};
pub use parser::parse_document;

use indexmap::IndexMap;

/// Builds the graph model from a raw description, applying default geometry.
pub fn build_model(raw: &RawGraph, config: &LayoutConfig) -> Result<GraphModel> {
    GraphModel::from_raw(raw, &config.node_defaults)
}

/// Validates node-type templates into a shared catalog.
pub fn register_node_types(
    templates: &IndexMap<String, RawNodeTemplate>,
    config: &LayoutConfig,
) -> Result<NodeCatalog> {
    NodeCatalog::register(templates, config.ports)
}

/// Writes the model's current geometry back into the raw format.
pub fn export_model(layout: &Layout) -> RawGraph {
    layout.export()
}

/// Templates, model and validation in one step.
pub fn build_layout(document: Document, config: LayoutConfig) -> Result<Layout> {
    let (node_types, graph) = document.into_parts();
    let catalog = register_node_types(&node_types, &config)?;
    let model = build_model(&graph, &config)?;
    Layout::new(model, catalog, config)
}
