use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw graph description as supplied by (and written back to) the host.
///
/// Both maps keep document order; links are registered in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: IndexMap<String, RawNode>,
    #[serde(default)]
    pub links: IndexMap<String, RawLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub user_data: IndexMap<String, serde_json::Value>,
    /// Host fields the layout does not interpret; written back untouched.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEndpoint {
    pub id: String,
    pub port: String,
}

impl RawEndpoint {
    pub fn new(id: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            port: port.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub source: RawEndpoint,
    pub target: RawEndpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPortTemplate {
    pub orientation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodeTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    #[serde(default)]
    pub ports: IndexMap<String, RawPortTemplate>,
}

/// A single input file: node-type templates plus the graph itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub node_types: IndexMap<String, RawNodeTemplate>,
    #[serde(default)]
    pub nodes: IndexMap<String, RawNode>,
    #[serde(default)]
    pub links: IndexMap<String, RawLink>,
}

impl Document {
    pub fn new(node_types: IndexMap<String, RawNodeTemplate>, graph: RawGraph) -> Self {
        Self {
            node_types,
            nodes: graph.nodes,
            links: graph.links,
        }
    }

    pub fn into_parts(self) -> (IndexMap<String, RawNodeTemplate>, RawGraph) {
        (
            self.node_types,
            RawGraph {
                nodes: self.nodes,
                links: self.links,
            },
        )
    }
}

impl RawGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a node description. Handy for building graphs in code.
    pub fn push_node(&mut self, id: &str, node: RawNode) -> &mut Self {
        self.nodes.insert(id.to_string(), node);
        self
    }

    pub fn push_link(&mut self, id: &str, source: RawEndpoint, target: RawEndpoint) -> &mut Self {
        self.links
            .insert(id.to_string(), RawLink { source, target });
        self
    }
}

impl RawNode {
    pub fn typed(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn within(mut self, parent: &str) -> Self {
        self.parent_id = Some(parent.to_string());
        self
    }
}
