use crate::config::PortMetrics;
use crate::error::{LayoutError, Result};
use crate::ir::RawNodeTemplate;
use crate::layout::{Point, Size};
use indexmap::IndexMap;
use std::sync::Arc;

/// The side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Top,
    Bottom,
    Left,
    Right,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn is_horizontal_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Size of the port rectangle. Independent of the node it sits on.
    pub fn bounding_size(self, metrics: &PortMetrics) -> Size {
        if self.is_horizontal_edge() {
            Size::new(metrics.length, metrics.thickness)
        } else {
            Size::new(metrics.thickness, metrics.length)
        }
    }

    /// Top-left corner of the port rectangle in the node's local frame.
    ///
    /// The rectangle is centred along its edge and sits flush against the
    /// outside of the node boundary.
    pub fn edge_position(self, node: Size, metrics: &PortMetrics) -> Point {
        let along_x = (node.width - metrics.length) / 2.0;
        let along_y = (node.height - metrics.length) / 2.0;
        match self {
            Self::Top => Point::new(along_x, -metrics.thickness),
            Self::Bottom => Point::new(along_x, node.height),
            Self::Left => Point::new(-metrics.thickness, along_y),
            Self::Right => Point::new(node.width, along_y),
        }
    }

    /// Where links attach: the centre of the port rectangle, in the node's local frame.
    pub fn anchor_point(self, node: Size, metrics: &PortMetrics) -> Point {
        let corner = self.edge_position(node, metrics);
        let size = self.bounding_size(metrics);
        Point::new(corner.x + size.width / 2.0, corner.y + size.height / 2.0)
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortTemplate {
    pub orientation: Orientation,
    pub css_class: Option<String>,
}

impl PortTemplate {
    pub fn new(name: &str, orientation: &str, css_class: Option<String>) -> Result<Self> {
        let orientation =
            Orientation::from_token(orientation).ok_or_else(|| LayoutError::InvalidOrientation {
                port: name.to_string(),
                value: orientation.to_string(),
            })?;
        Ok(Self {
            orientation,
            css_class,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeTemplate {
    pub css_class: Option<String>,
    pub ports: IndexMap<String, PortTemplate>,
}

impl NodeTemplate {
    pub fn port(&self, name: &str) -> Option<&PortTemplate> {
        self.ports.get(name)
    }
}

/// Validated node-type templates, shared read-only by every node of a type.
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    metrics: PortMetrics,
    templates: IndexMap<String, Arc<NodeTemplate>>,
}

impl NodeCatalog {
    /// Validates every port orientation once; nothing is registered on failure.
    pub fn register(
        raw: &IndexMap<String, RawNodeTemplate>,
        metrics: PortMetrics,
    ) -> Result<Self> {
        let mut templates = IndexMap::with_capacity(raw.len());
        for (kind, template) in raw {
            let mut ports = IndexMap::with_capacity(template.ports.len());
            for (name, port) in &template.ports {
                let port = PortTemplate::new(name, &port.orientation, port.css_class.clone())?;
                ports.insert(name.clone(), port);
            }
            templates.insert(
                kind.clone(),
                Arc::new(NodeTemplate {
                    css_class: template.css_class.clone(),
                    ports,
                }),
            );
        }
        tracing::debug!(types = templates.len(), "registered node types");
        Ok(Self { metrics, templates })
    }

    pub fn metrics(&self) -> &PortMetrics {
        &self.metrics
    }

    pub fn template(&self, kind: &str) -> Option<&Arc<NodeTemplate>> {
        self.templates.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
