use crate::config::NodeDefaults;
use crate::error::{LayoutError, Result};
use crate::ir::{RawEndpoint, RawGraph, RawLink, RawNode};
use crate::layout::{Point, Rect, Size};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub parent_id: Option<String>,
    pub kind: String,
    pub label: Option<String>,
    pub user_data: IndexMap<String, serde_json::Value>,
    pub extra: IndexMap<String, serde_json::Value>,
    children: Vec<String>,
    link_ids: IndexSet<String>,
}

impl Node {
    fn from_raw(id: &str, raw: &RawNode, defaults: &NodeDefaults) -> Result<Self> {
        let kind = raw.kind.clone().ok_or_else(|| LayoutError::MissingType {
            node: id.to_string(),
        })?;
        Ok(Self {
            id: id.to_string(),
            x: raw.x.unwrap_or(defaults.x),
            y: raw.y.unwrap_or(defaults.y),
            width: raw.width.unwrap_or(defaults.width),
            height: raw.height.unwrap_or(defaults.height),
            parent_id: raw.parent_id.clone(),
            kind,
            label: raw.label.clone(),
            user_data: raw.user_data.clone(),
            extra: raw.extra.clone(),
            children: Vec::new(),
            link_ids: IndexSet::new(),
        })
    }

    /// Immediate children, in document order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Links touching this node or anything nested inside it, in registration order.
    pub fn link_ids(&self) -> &IndexSet<String> {
        &self.link_ids
    }

    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// Box in the parent's frame.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: String,
    pub port: String,
}

impl From<&RawEndpoint> for Endpoint {
    fn from(raw: &RawEndpoint) -> Self {
        Self {
            node: raw.id.clone(),
            port: raw.port.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: String,
    pub source: Endpoint,
    pub target: Endpoint,
}

/// Owns every node and link together with the containment tree and the
/// ancestor-inclusive link membership index.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: IndexMap<String, Node>,
    links: IndexMap<String, Link>,
}

impl GraphModel {
    pub fn from_raw(raw: &RawGraph, defaults: &NodeDefaults) -> Result<Self> {
        let mut nodes = IndexMap::with_capacity(raw.nodes.len());
        for (id, raw_node) in &raw.nodes {
            nodes.insert(id.clone(), Node::from_raw(id, raw_node, defaults)?);
        }

        for node in nodes.values() {
            if let Some(parent) = &node.parent_id {
                if !nodes.contains_key(parent) {
                    return Err(LayoutError::ParentNotFound {
                        node: node.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }
        check_acyclic(&nodes)?;

        let parents: Vec<(String, String)> = nodes
            .values()
            .filter_map(|node| {
                node.parent_id
                    .as_ref()
                    .map(|parent| (parent.clone(), node.id.clone()))
            })
            .collect();
        for (parent, child) in parents {
            if let Some(parent) = nodes.get_mut(&parent) {
                parent.children.push(child);
            }
        }

        let mut model = Self {
            nodes,
            links: IndexMap::with_capacity(raw.links.len()),
        };
        for (id, link) in &raw.links {
            model.add_link(id, link)?;
        }

        tracing::debug!(
            nodes = model.nodes.len(),
            links = model.links.len(),
            "built graph model"
        );
        Ok(model)
    }

    /// Registers a link and records it on both endpoints and all of their
    /// ancestors. Sole writer of the membership index.
    pub fn add_link(&mut self, id: &str, desc: &RawLink) -> Result<()> {
        if self.links.contains_key(id) {
            return Err(LayoutError::DuplicateLink(id.to_string()));
        }
        for endpoint in [&desc.source, &desc.target] {
            if !self.nodes.contains_key(&endpoint.id) {
                return Err(LayoutError::EndpointNotFound {
                    link: id.to_string(),
                    node: endpoint.id.clone(),
                });
            }
        }

        let link = Link {
            id: id.to_string(),
            source: Endpoint::from(&desc.source),
            target: Endpoint::from(&desc.target),
        };
        for start in [&link.source.node, &link.target.node] {
            let mut cursor = Some(start.clone());
            while let Some(node_id) = cursor {
                let Some(node) = self.nodes.get_mut(&node_id) else {
                    break;
                };
                node.link_ids.insert(link.id.clone());
                cursor = node.parent_id.clone();
            }
        }
        tracing::trace!(link = id, source = %link.source.node, target = %link.target.node, "registered link");
        self.links.insert(link.id.clone(), link);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| LayoutError::NodeNotFound(id.to_string()))
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| LayoutError::NodeNotFound(id.to_string()))
    }

    pub fn link(&self, id: &str) -> Result<&Link> {
        self.links
            .get(id)
            .ok_or_else(|| LayoutError::LinkNotFound(id.to_string()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn children_of(&self, id: &str) -> Result<&[String]> {
        Ok(self.node(id)?.children())
    }

    /// Parent chain of a node, closest first. Empty for a root.
    pub fn ancestors(&self, id: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut cursor = self.node(id)?.parent_id.as_deref();
        while let Some(parent) = cursor {
            out.push(parent.to_string());
            cursor = self.node(parent)?.parent_id.as_deref();
        }
        Ok(out)
    }

    /// Every node nested under `id`, breadth first.
    pub fn descendants(&self, id: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current)? {
                out.push(child.clone());
                queue.push_back(child);
            }
        }
        Ok(out)
    }

    pub fn depth(&self, id: &str) -> Result<usize> {
        Ok(self.ancestors(id)?.len())
    }

    /// Origin of the node's own frame expressed in root space.
    pub fn world_origin(&self, id: &str) -> Result<Point> {
        let mut origin = Point::default();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            origin = origin.offset(Point::new(node.x, node.y));
            cursor = node.parent_id.as_deref();
        }
        Ok(origin)
    }

    /// The node's box in root space.
    pub fn world_bounds(&self, id: &str) -> Result<Rect> {
        let node = self.node(id)?;
        let parent_origin = match node.parent_id.as_deref() {
            Some(parent) => self.world_origin(parent)?,
            None => Point::default(),
        };
        Ok(node.bounds().translated(parent_origin))
    }

    /// Writes the current state back into the raw format, rounding geometry
    /// to `precision` decimal places.
    pub fn export(&self, precision: u32) -> RawGraph {
        let mut raw = RawGraph::new();
        for node in self.nodes.values() {
            raw.nodes.insert(
                node.id.clone(),
                RawNode {
                    x: Some(round_to(node.x, precision)),
                    y: Some(round_to(node.y, precision)),
                    width: Some(round_to(node.width, precision)),
                    height: Some(round_to(node.height, precision)),
                    parent_id: node.parent_id.clone(),
                    kind: Some(node.kind.clone()),
                    label: node.label.clone(),
                    user_data: node.user_data.clone(),
                    extra: node.extra.clone(),
                },
            );
        }
        for link in self.links.values() {
            raw.links.insert(
                link.id.clone(),
                RawLink {
                    source: RawEndpoint::new(&link.source.node, &link.source.port),
                    target: RawEndpoint::new(&link.target.node, &link.target.port),
                },
            );
        }
        raw
    }
}

fn check_acyclic(nodes: &IndexMap<String, Node>) -> Result<()> {
    let mut settled: HashSet<&str> = HashSet::new();
    for start in nodes.keys() {
        let mut path: HashSet<&str> = HashSet::new();
        let mut cursor = Some(start.as_str());
        while let Some(current) = cursor {
            if settled.contains(current) {
                break;
            }
            if !path.insert(current) {
                return Err(LayoutError::ContainmentCycle {
                    node: current.to_string(),
                });
            }
            cursor = nodes.get(current).and_then(|node| node.parent_id.as_deref());
        }
        settled.extend(path);
    }
    Ok(())
}

/// Beyond this many decimals an f32 carries no further information.
const MAX_EXPORT_PRECISION: u32 = 9;

fn round_to(value: f32, precision: u32) -> f32 {
    let factor = 10f64.powi(precision.min(MAX_EXPORT_PRECISION) as i32);
    ((value as f64 * factor).round() / factor) as f32
}
