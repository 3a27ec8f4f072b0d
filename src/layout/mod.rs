mod fit;
pub(crate) mod types;
pub use fit::{embeds_extent, fit_embeds};
pub use types::*;

use crate::catalog::{NodeCatalog, PortTemplate};
use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::ir::{RawGraph, RawLink};
use crate::model::{Endpoint, GraphModel};
use indexmap::IndexSet;

/// Nodes and links whose geometry changed during one operation, in the
/// order they were first touched, plus the containers fitted along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refresh {
    pub nodes: IndexSet<String>,
    pub links: IndexSet<String>,
    pub fitted: Vec<(String, OriginShift)>,
}

impl Refresh {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty() && self.fitted.is_empty()
    }

    fn touch_node(&mut self, model: &GraphModel, id: &str) -> Result<()> {
        self.nodes.insert(id.to_string());
        for link in model.node(id)?.link_ids() {
            self.links.insert(link.clone());
        }
        Ok(())
    }
}

/// The graph model paired with the validated catalog it was checked against.
#[derive(Debug, Clone)]
pub struct Layout {
    model: GraphModel,
    catalog: NodeCatalog,
    config: LayoutConfig,
}

impl Layout {
    /// Checks every node type and link port against the catalog.
    pub fn new(model: GraphModel, catalog: NodeCatalog, config: LayoutConfig) -> Result<Self> {
        for node in model.nodes() {
            if catalog.template(&node.kind).is_none() {
                return Err(LayoutError::UnknownType {
                    node: node.id.clone(),
                    kind: node.kind.clone(),
                });
            }
        }
        let layout = Self {
            model,
            catalog,
            config,
        };
        for link in layout.model.links() {
            layout.port_template(&link.source)?;
            layout.port_template(&link.target)?;
        }
        Ok(layout)
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Registers a link after checking both ports exist on their node types.
    pub fn add_link(&mut self, id: &str, desc: &RawLink) -> Result<()> {
        for raw in [&desc.source, &desc.target] {
            if self.model.node(&raw.id).is_err() {
                return Err(LayoutError::EndpointNotFound {
                    link: id.to_string(),
                    node: raw.id.clone(),
                });
            }
            self.port_template(&Endpoint::from(raw))?;
        }
        self.model.add_link(id, desc)
    }

    fn port_template(&self, endpoint: &Endpoint) -> Result<&PortTemplate> {
        let node = self.model.node(&endpoint.node)?;
        self.catalog
            .template(&node.kind)
            .and_then(|template| template.port(&endpoint.port))
            .ok_or_else(|| LayoutError::UnknownPort {
                node: endpoint.node.clone(),
                port: endpoint.port.clone(),
            })
    }

    /// Anchor of `port` in the node's local frame.
    pub fn anchor_position(&self, node: &str, port: &str) -> Result<Point> {
        let endpoint = Endpoint {
            node: node.to_string(),
            port: port.to_string(),
        };
        let template = self.port_template(&endpoint)?;
        let size = self.model.node(node)?.size();
        Ok(template
            .orientation
            .anchor_point(size, self.catalog.metrics()))
    }

    /// Anchor of `port` in root space, through every enclosing container.
    pub fn absolute_anchor_position(&self, node: &str, port: &str) -> Result<Point> {
        let local = self.anchor_position(node, port)?;
        Ok(self.model.world_origin(node)?.offset(local))
    }

    pub fn link_segment(&self, link: &str) -> Result<LinkSegment> {
        let link = self.model.link(link)?;
        Ok(LinkSegment {
            source: self.absolute_anchor_position(&link.source.node, &link.source.port)?,
            target: self.absolute_anchor_position(&link.target.node, &link.target.port)?,
        })
    }

    /// Fits one container and reports what the host must redraw.
    pub fn fit_embeds(&mut self, container: &str) -> Result<(OriginShift, Refresh)> {
        let mut refresh = Refresh::default();
        let shift = self.fit_into(container, &mut refresh)?;
        Ok((shift, refresh))
    }

    fn fit_into(&mut self, container: &str, refresh: &mut Refresh) -> Result<OriginShift> {
        let shift = fit_embeds(&mut self.model, container, &self.config.padding)?;
        let children = self.model.children_of(container)?;
        if children.is_empty() {
            return Ok(shift);
        }
        for child in children {
            refresh.nodes.insert(child.clone());
        }
        // The container's membership covers every link of its subtree.
        refresh.touch_node(&self.model, container)?;
        refresh.fitted.push((container.to_string(), shift));
        Ok(shift)
    }

    /// Places `node` at `(x, y)` in its parent's frame, then re-fits each
    /// ancestor from the closest outwards.
    pub fn move_node(&mut self, node: &str, x: f32, y: f32) -> Result<Refresh> {
        let ancestors = self.model.ancestors(node)?;
        let target = self.model.node_mut(node)?;
        target.x = x;
        target.y = y;

        let mut refresh = Refresh::default();
        for ancestor in &ancestors {
            self.fit_into(ancestor, &mut refresh)?;
        }
        refresh.touch_node(&self.model, node)?;
        Ok(refresh)
    }

    /// Fits every container, deepest first, so each box is computed from
    /// already-fitted children.
    pub fn fit_all(&mut self) -> Result<Refresh> {
        let mut containers: Vec<(usize, String)> = Vec::new();
        for node in self.model.nodes().filter(|node| node.is_container()) {
            containers.push((self.model.depth(&node.id)?, node.id.clone()));
        }
        containers.sort_by(|a, b| b.0.cmp(&a.0));

        let mut refresh = Refresh::default();
        for (_, container) in &containers {
            self.fit_into(container, &mut refresh)?;
        }
        Ok(refresh)
    }

    pub fn export(&self) -> RawGraph {
        self.model.export(self.config.export_precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NodeDefaults, PortMetrics};
    use crate::ir::{RawEndpoint, RawNode, RawNodeTemplate, RawPortTemplate};
    use indexmap::IndexMap;

    fn catalog() -> NodeCatalog {
        let mut ports = IndexMap::new();
        for (name, orientation) in [("in", "top"), ("out", "bottom"), ("west", "left")] {
            ports.insert(
                name.to_string(),
                RawPortTemplate {
                    orientation: orientation.to_string(),
                    css_class: None,
                },
            );
        }
        let mut raw = IndexMap::new();
        raw.insert(
            "task".to_string(),
            RawNodeTemplate {
                css_class: None,
                ports,
            },
        );
        raw.insert("group".to_string(), RawNodeTemplate::default());
        NodeCatalog::register(&raw, PortMetrics::default()).unwrap()
    }

    fn build(raw: &RawGraph) -> Result<Layout> {
        let model = GraphModel::from_raw(raw, &NodeDefaults::default())?;
        Layout::new(model, catalog(), LayoutConfig::default())
    }

    fn nested() -> RawGraph {
        let mut raw = RawGraph::new();
        raw.push_node("outer", RawNode::typed("group").at(100.0, 100.0))
            .push_node("inner", RawNode::typed("group").at(0.0, 0.0).within("outer"))
            .push_node("leaf", RawNode::typed("task").at(20.0, 40.0).within("inner"))
            .push_node("free", RawNode::typed("task").at(500.0, 0.0))
            .push_link(
                "l1",
                RawEndpoint::new("leaf", "out"),
                RawEndpoint::new("free", "in"),
            );
        raw
    }

    #[test]
    fn rejects_unknown_type() {
        let mut raw = RawGraph::new();
        raw.push_node("a", RawNode::typed("widget"));
        assert_eq!(
            build(&raw).unwrap_err(),
            LayoutError::UnknownType {
                node: "a".to_string(),
                kind: "widget".to_string(),
            }
        );
    }

    #[test]
    fn rejects_link_to_missing_port() {
        let mut raw = nested();
        raw.push_link(
            "l2",
            RawEndpoint::new("leaf", "nowhere"),
            RawEndpoint::new("free", "in"),
        );
        assert!(matches!(build(&raw), Err(LayoutError::UnknownPort { .. })));
    }

    #[test]
    fn add_link_checks_ports_before_registering() {
        let mut layout = build(&nested()).unwrap();
        let bad = RawLink {
            source: RawEndpoint::new("leaf", "out"),
            target: RawEndpoint::new("free", "east"),
        };
        assert!(layout.add_link("l2", &bad).is_err());
        assert!(layout.model().link("l2").is_err());
        assert_eq!(layout.model().node("outer").unwrap().link_ids().len(), 1);

        let good = RawLink {
            source: RawEndpoint::new("leaf", "west"),
            target: RawEndpoint::new("free", "in"),
        };
        layout.add_link("l2", &good).unwrap();
        assert!(layout.model().node("inner").unwrap().link_ids().contains("l2"));
    }

    #[test]
    fn anchor_position_is_local() {
        let layout = build(&nested()).unwrap();
        assert_eq!(layout.anchor_position("free", "in").unwrap(), Point::new(50.0, -3.5));
        assert_eq!(layout.anchor_position("free", "out").unwrap(), Point::new(50.0, 53.5));
        assert!(matches!(
            layout.anchor_position("free", "east"),
            Err(LayoutError::UnknownPort { .. })
        ));
    }

    #[test]
    fn link_segment_uses_root_space() {
        let layout = build(&nested()).unwrap();
        let segment = layout.link_segment("l1").unwrap();
        // leaf origin: 100 + 0 + 20, 100 + 0 + 40
        assert_eq!(segment.source, Point::new(170.0, 193.5));
        assert_eq!(segment.target, Point::new(550.0, -3.5));
    }

    #[test]
    fn move_fits_ancestors_inner_to_outer() {
        let mut layout = build(&nested()).unwrap();
        let refresh = layout.move_node("leaf", 50.0, 60.0).unwrap();
        let order: Vec<&str> = refresh.fitted.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["inner", "outer"]);
        assert!(refresh.nodes.contains("leaf"));
        assert!(refresh.nodes.contains("inner"));
        assert!(refresh.nodes.contains("outer"));
        assert!(!refresh.nodes.contains("free"));
        assert_eq!(refresh.links.len(), 1);
    }

    #[test]
    fn move_keeps_containers_tight() {
        let mut layout = build(&nested()).unwrap();
        layout.move_node("leaf", 50.0, 60.0).unwrap();
        let model = layout.model();
        let leaf = model.world_bounds("leaf").unwrap();
        let inner = model.world_bounds("inner").unwrap();
        let outer = model.world_bounds("outer").unwrap();
        let pad = layout.config().padding;
        assert_eq!(inner.x, leaf.x - pad.left);
        assert_eq!(inner.y, leaf.y - pad.top);
        assert_eq!(inner.right(), leaf.right() + pad.right);
        assert_eq!(inner.bottom(), leaf.bottom() + pad.bottom);
        assert_eq!(outer.x, inner.x - pad.left);
        assert_eq!(outer.bottom(), inner.bottom() + pad.bottom);
    }

    #[test]
    fn moving_a_root_skips_fitting() {
        let mut layout = build(&nested()).unwrap();
        let refresh = layout.move_node("free", 10.0, 10.0).unwrap();
        assert!(refresh.fitted.is_empty());
        let nodes: Vec<&str> = refresh.nodes.iter().map(String::as_str).collect();
        assert_eq!(nodes, vec!["free"]);
        assert_eq!(
            layout.model().node("free").unwrap().bounds(),
            Rect::new(10.0, 10.0, 100.0, 50.0)
        );
    }

    #[test]
    fn fit_embeds_reports_refresh_set() {
        let mut layout = build(&nested()).unwrap();
        let (shift, refresh) = layout.fit_embeds("inner").unwrap();
        assert_eq!(shift, OriginShift { x: 10.0, y: 10.0 });
        assert_eq!(refresh.fitted, vec![("inner".to_string(), shift)]);
        let nodes: Vec<&str> = refresh.nodes.iter().map(String::as_str).collect();
        assert_eq!(nodes, vec!["leaf", "inner"]);
        assert!(refresh.links.contains("l1"));

        let (_, untouched) = layout.fit_embeds("free").unwrap();
        assert!(untouched.is_empty());
    }

    #[test]
    fn fit_all_goes_deepest_first() {
        let mut layout = build(&nested()).unwrap();
        let refresh = layout.fit_all().unwrap();
        let order: Vec<&str> = refresh.fitted.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["inner", "outer"]);

        let again = layout.fit_all().unwrap();
        assert!(again.fitted.iter().all(|(_, shift)| shift.is_zero()));
    }
}
