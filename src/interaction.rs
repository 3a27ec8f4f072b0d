use crate::error::{LayoutError, Result};
use crate::layout::{Layout, LinkSegment, OriginShift, Rect, Refresh};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        node: String,
    },
}

/// Pointer events forwarded by the host UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    Start { node: String },
    Move { node: String, x: f32, y: f32 },
    End { node: String },
}

/// What a renderer needs to repaint after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    ActiveChanged {
        node: String,
        active: bool,
    },
    ContainerFitted {
        node: String,
        shift: OriginShift,
    },
    NodeChanged {
        node: String,
        local: Rect,
        world: Rect,
    },
    LinkChanged {
        link: String,
        segment: LinkSegment,
    },
}

/// Drives `idle -> dragging -> idle`. Every handler runs to completion
/// before returning, so an abandoned drag leaves the model as the last
/// processed move put it.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: DragState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn active_node(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { node } => Some(node.as_str()),
        }
    }

    pub fn handle(&mut self, layout: &mut Layout, event: DragEvent) -> Result<Vec<Notification>> {
        match event {
            DragEvent::Start { node } => self.drag_start(layout, &node),
            DragEvent::Move { node, x, y } => self.node_moved(layout, &node, x, y),
            DragEvent::End { node } => self.drag_end(&node),
        }
    }

    /// Starting a drag while another is active releases the previous node first.
    pub fn drag_start(&mut self, layout: &Layout, node: &str) -> Result<Vec<Notification>> {
        layout.model().node(node)?;
        let mut out = Vec::new();
        if let DragState::Dragging { node: previous } = &self.state {
            if previous == node {
                return Ok(out);
            }
            out.push(Notification::ActiveChanged {
                node: previous.clone(),
                active: false,
            });
        }
        tracing::debug!(node, "drag started");
        self.state = DragState::Dragging {
            node: node.to_string(),
        };
        out.push(Notification::ActiveChanged {
            node: node.to_string(),
            active: true,
        });
        Ok(out)
    }

    pub fn node_moved(
        &mut self,
        layout: &mut Layout,
        node: &str,
        x: f32,
        y: f32,
    ) -> Result<Vec<Notification>> {
        self.ensure_dragging(node)?;
        tracing::trace!(node, x, y, "drag move");
        let refresh = layout.move_node(node, x, y)?;
        notifications(layout, &refresh)
    }

    pub fn drag_end(&mut self, node: &str) -> Result<Vec<Notification>> {
        self.ensure_dragging(node)?;
        tracing::debug!(node, "drag ended");
        self.state = DragState::Idle;
        Ok(vec![Notification::ActiveChanged {
            node: node.to_string(),
            active: false,
        }])
    }

    fn ensure_dragging(&self, node: &str) -> Result<()> {
        match &self.state {
            DragState::Dragging { node: active } if active == node => Ok(()),
            _ => Err(LayoutError::NotDragging(node.to_string())),
        }
    }
}

/// Turns a refresh set into notifications carrying final geometry:
/// fits (inner to outer), then nodes, then links.
pub fn notifications(layout: &Layout, refresh: &Refresh) -> Result<Vec<Notification>> {
    let model = layout.model();
    let mut out = Vec::with_capacity(refresh.fitted.len() + refresh.nodes.len() + refresh.links.len());
    for (node, shift) in &refresh.fitted {
        out.push(Notification::ContainerFitted {
            node: node.clone(),
            shift: *shift,
        });
    }
    for node in &refresh.nodes {
        out.push(Notification::NodeChanged {
            node: node.clone(),
            local: model.node(node)?.bounds(),
            world: model.world_bounds(node)?,
        });
    }
    for link in &refresh.links {
        out.push(Notification::LinkChanged {
            link: link.clone(),
            segment: layout.link_segment(link)?,
        });
    }
    Ok(out)
}
