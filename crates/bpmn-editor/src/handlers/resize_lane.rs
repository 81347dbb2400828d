//! `lane.resize`: resize a lane. Balanced resizing lets neighbouring lanes
//! give up (or take) the space; otherwise the space tool shifts everything
//! beyond the moved border.

use bpmn_core::{Bounds, BpmnType, Delta, ElementIndex};

use crate::command::{Direction, LaneResizeContext, ShapeResizeContext, SpaceToolContext};
use crate::error::ModelingError;
use crate::lane_util::{compute_lanes_resize, lanes_root};
use crate::modeler::Modeler;

use super::space_tool::{Axis, calculate_adjustments};

const SPACE_OFFSET: f64 = 10.0;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut LaneResizeContext) -> Result<(), ModelingError> {
    if ctx.balanced {
        resize_balanced(modeler, ctx.shape, ctx.new_bounds)
    } else {
        resize_space(modeler, ctx.shape, ctx.new_bounds)
    }
}

fn resize_balanced(
    modeler: &mut Modeler,
    shape: ElementIndex,
    new_bounds: Bounds,
) -> Result<(), ModelingError> {
    let needed = compute_lanes_resize(modeler, shape, new_bounds);
    modeler.execute(ShapeResizeContext::new(shape, new_bounds))?;
    for (other, bounds) in needed {
        modeler.execute(ShapeResizeContext::new(other, bounds))?;
    }
    Ok(())
}

fn resize_space(
    modeler: &mut Modeler,
    shape: ElementIndex,
    new_bounds: Bounds,
) -> Result<(), ModelingError> {
    let old = modeler.element(shape).bounds;
    let diff = new_bounds.trbl().sub(&old.trbl());
    let root = lanes_root(modeler, shape).unwrap_or(shape);

    let mut all_affected = vec![root];
    all_affected.extend(modeler.canvas.descendants(&[root]));
    all_affected.retain(|e| {
        !modeler.element(*e).is_connection() || modeler.is(*e, |t| t != BpmnType::MessageFlow)
    });

    if diff.bottom != 0.0 || diff.top != 0.0 {
        let towards_bottom = diff.bottom != 0.0;
        let change = if towards_bottom { diff.bottom } else { diff.top };
        let (start, direction) = if towards_bottom {
            (old.bottom() - SPACE_OFFSET, Direction::South)
        } else {
            (old.y + SPACE_OFFSET, Direction::North)
        };
        let offset = if diff.top > 0.0 || diff.bottom < 0.0 {
            -change
        } else {
            change
        };
        let adjustments = calculate_adjustments(modeler, &all_affected, Axis::Y, offset, start);
        modeler.execute(SpaceToolContext {
            moving_shapes: adjustments.moving_shapes,
            resizing_shapes: adjustments.resizing_shapes,
            delta: Delta::new(0.0, change),
            direction,
            start,
        })?;
    }

    if diff.left != 0.0 || diff.right != 0.0 {
        let towards_right = diff.right != 0.0;
        let change = if towards_right { diff.right } else { diff.left };
        let (start, direction) = if towards_right {
            (old.right() - SPACE_OFFSET, Direction::East)
        } else {
            (old.x + SPACE_OFFSET, Direction::West)
        };
        let offset = if diff.left > 0.0 || diff.right < 0.0 {
            -change
        } else {
            change
        };
        let adjustments = calculate_adjustments(modeler, &all_affected, Axis::X, offset, start);
        modeler.execute(SpaceToolContext {
            moving_shapes: adjustments.moving_shapes,
            resizing_shapes: adjustments.resizing_shapes,
            delta: Delta::new(change, 0.0),
            direction,
            start,
        })?;
    }
    Ok(())
}
