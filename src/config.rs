use serde::{Deserialize, Serialize};
use std::path::Path;

/// Space kept between a container's edge and its outermost embeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for Padding {
    fn default() -> Self {
        // Top is taller to leave room for the container's label.
        Self {
            left: 10.0,
            top: 30.0,
            right: 10.0,
            bottom: 10.0,
        }
    }
}

/// Port rectangle dimensions: `length` runs along the node edge,
/// `thickness` crosses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortMetrics {
    pub length: f32,
    pub thickness: f32,
}

impl Default for PortMetrics {
    fn default() -> Self {
        Self {
            length: 15.0,
            thickness: 7.0,
        }
    }
}

/// Geometry applied to nodes that leave a field unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDefaults {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub padding: Padding,
    pub ports: PortMetrics,
    pub node_defaults: NodeDefaults,
    /// Decimal places kept when geometry is written back to the raw graph.
    pub export_precision: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            ports: PortMetrics::default(),
            node_defaults: NodeDefaults::default(),
            export_precision: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PaddingFile {
    left: Option<f32>,
    top: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct PortMetricsFile {
    length: Option<f32>,
    thickness: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct NodeDefaultsFile {
    x: Option<f32>,
    y: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    padding: Option<PaddingFile>,
    ports: Option<PortMetricsFile>,
    node_defaults: Option<NodeDefaultsFile>,
    export_precision: Option<u32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a (possibly partial) JSON config; fields it leaves out keep their defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = LayoutConfig::default();

    if let Some(padding) = parsed.padding {
        if let Some(v) = padding.left {
            config.padding.left = v;
        }
        if let Some(v) = padding.top {
            config.padding.top = v;
        }
        if let Some(v) = padding.right {
            config.padding.right = v;
        }
        if let Some(v) = padding.bottom {
            config.padding.bottom = v;
        }
    }

    if let Some(ports) = parsed.ports {
        if let Some(v) = ports.length {
            config.ports.length = v;
        }
        if let Some(v) = ports.thickness {
            config.ports.thickness = v;
        }
    }

    if let Some(defaults) = parsed.node_defaults {
        if let Some(v) = defaults.x {
            config.node_defaults.x = v;
        }
        if let Some(v) = defaults.y {
            config.node_defaults.y = v;
        }
        if let Some(v) = defaults.width {
            config.node_defaults.width = v;
        }
        if let Some(v) = defaults.height {
            config.node_defaults.height = v;
        }
    }

    if let Some(v) = parsed.export_precision {
        config.export_precision = v;
    }

    Ok(config)
}
