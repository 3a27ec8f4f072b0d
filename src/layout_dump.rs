use crate::error::Result;
use crate::layout::{Layout, LinkSegment, Point, Rect};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Everything a renderer needs to paint the current state, in root space.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub css_class: Option<String>,
    pub parent_id: Option<String>,
    pub local: Rect,
    pub world: Rect,
    pub ports: Vec<PortDump>,
    pub link_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDump {
    pub name: String,
    pub orientation: String,
    pub css_class: Option<String>,
    pub rect: Rect,
    pub anchor: Point,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub id: String,
    pub source: String,
    pub source_port: String,
    pub target: String,
    pub target_port: String,
    pub segment: LinkSegment,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Result<Self> {
        let model = layout.model();
        let metrics = layout.catalog().metrics();

        let mut nodes = Vec::with_capacity(model.node_count());
        for node in model.nodes() {
            let world = model.world_bounds(&node.id)?;
            let template = layout.catalog().template(&node.kind);
            let ports = template
                .map(|template| {
                    template
                        .ports
                        .iter()
                        .map(|(name, port)| {
                            let corner = port.orientation.edge_position(node.size(), metrics);
                            let size = port.orientation.bounding_size(metrics);
                            let anchor = port.orientation.anchor_point(node.size(), metrics);
                            PortDump {
                                name: name.clone(),
                                orientation: port.orientation.to_string(),
                                css_class: port.css_class.clone(),
                                rect: Rect::new(corner.x, corner.y, size.width, size.height)
                                    .translated(world.origin()),
                                anchor: anchor.offset(world.origin()),
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            nodes.push(NodeDump {
                id: node.id.clone(),
                kind: node.kind.clone(),
                label: node.display_label().to_string(),
                css_class: template.and_then(|template| template.css_class.clone()),
                parent_id: node.parent_id.clone(),
                local: node.bounds(),
                world,
                ports,
                link_ids: node.link_ids().iter().cloned().collect(),
            });
        }

        let mut links = Vec::with_capacity(model.link_count());
        for link in model.links() {
            links.push(LinkDump {
                id: link.id.clone(),
                source: link.source.node.clone(),
                source_port: link.source.port.clone(),
                target: link.target.node.clone(),
                target_port: link.target.port.clone(),
                segment: layout.link_segment(&link.id)?,
            });
        }

        Ok(LayoutDump { nodes, links })
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout)?;
    serde_json::to_writer_pretty(&mut writer, &dump)?;
    writer.flush()?;
    Ok(())
}
