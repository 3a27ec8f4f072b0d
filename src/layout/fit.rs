use crate::config::Padding;
use crate::error::Result;
use crate::model::GraphModel;

use super::{OriginShift, Rect, Size};

/// Smallest box (in the container's current frame) that encloses every child
/// plus padding. `None` when there is nothing to enclose.
pub fn embeds_extent(model: &GraphModel, container: &str, padding: &Padding) -> Result<Option<Rect>> {
    let children = model.children_of(container)?;
    if children.is_empty() {
        return Ok(None);
    }

    let mut left = f32::INFINITY;
    let mut top = f32::INFINITY;
    let mut right = f32::NEG_INFINITY;
    let mut bottom = f32::NEG_INFINITY;
    for child in children {
        let child = model.node(child)?;
        left = left.min(child.x - padding.left);
        top = top.min(child.y - padding.top);
        right = right.max(child.x + child.width + padding.right);
        bottom = bottom.max(child.y + child.height + padding.bottom);
    }
    Ok(Some(Rect::new(left, top, right - left, bottom - top)))
}

/// Re-fits `container` around its immediate children.
///
/// Children keep their root-space position: their local coordinates drop by
/// the extent's origin while the container's own origin moves by the same
/// amount. Returns that move. A childless container is left alone, and so is
/// one whose box already matches its children to within float noise.
pub fn fit_embeds(model: &mut GraphModel, container: &str, padding: &Padding) -> Result<OriginShift> {
    let Some(extent) = embeds_extent(model, container, padding)? else {
        tracing::trace!(container, "no embeds to fit");
        return Ok(OriginShift::default());
    };
    if already_fitted(model.node(container)?.size(), extent) {
        tracing::trace!(container, "embeds already fitted");
        return Ok(OriginShift::default());
    }

    let children = model.children_of(container)?.to_vec();
    for child in &children {
        let child = model.node_mut(child)?;
        child.x -= extent.x;
        child.y -= extent.y;
    }
    // Size is measured in the re-anchored frame so a repeat fit sees the same box.
    let size = embeds_extent(model, container, padding)?
        .map(|rect| rect.size())
        .unwrap_or_else(|| extent.size());

    let node = model.node_mut(container)?;
    node.x += extent.x;
    node.y += extent.y;
    node.width = size.width;
    node.height = size.height;

    tracing::debug!(
        container,
        shift_x = extent.x,
        shift_y = extent.y,
        width = size.width,
        height = size.height,
        "fitted embeds"
    );
    Ok(OriginShift {
        x: extent.x,
        y: extent.y,
    })
}

/// Re-anchoring children leaves residues of a few ULPs; those are not movement.
fn already_fitted(current: Size, extent: Rect) -> bool {
    let scale = extent.width.abs().max(extent.height.abs()).max(1.0);
    let tolerance = scale * f32::EPSILON * 4.0;
    extent.x.abs() <= tolerance
        && extent.y.abs() <= tolerance
        && (current.width - extent.width).abs() <= tolerance
        && (current.height - extent.height).abs() <= tolerance
}
