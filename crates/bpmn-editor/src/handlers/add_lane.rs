//! `lane.add`: add a lane before or after a lane (or participant), opening
//! space for it with the space tool. Vertical pools add lanes left or right.

use bpmn_core::{Bounds, BpmnType, Delta, ElementIndex};

use crate::command::{
    CreateHints, Direction, LaneAddContext, LaneLocation, Placement, ShapeCreateContext,
    SpaceToolContext,
};
use crate::element_factory::ShapeAttrs;
use crate::error::ModelingError;
use crate::lane_util::{child_lanes, indented, is_horizontal, lanes_root};
use crate::modeler::Modeler;

use super::space_tool::{Axis, calculate_adjustments};

/// Distance between the lane border and the line the space tool opens at.
const SPACE_OFFSET: f64 = 10.0;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut LaneAddContext) -> Result<(), ModelingError> {
    let shape = ctx.shape;
    let root = lanes_root(modeler, shape).unwrap_or(shape);
    let horizontal = is_horizontal(modeler, root);
    let before = match (ctx.location, horizontal) {
        (LaneLocation::Top, true) | (LaneLocation::Left, false) => true,
        (LaneLocation::Bottom, true) | (LaneLocation::Right, false) => false,
        (location, _) => {
            return Err(ModelingError::InvalidArgument(format!(
                "cannot add a lane at {location:?} of a {} pool",
                if horizontal { "horizontal" } else { "vertical" }
            )));
        }
    };

    let is_root = root == shape;
    let lane_parent = if is_root {
        shape
    } else {
        modeler.element(shape).parent.unwrap_or(root)
    };
    let indentation = modeler.config.lane_indentation;
    let lane_size = modeler.config.lane_height;
    let bounds = modeler.element(shape).bounds;

    if child_lanes(modeler, lane_parent).is_empty() {
        create_lane(modeler, lane_parent, indented(bounds, indentation, horizontal))?;
    }

    // work top to bottom, transposed for vertical pools
    let along = |b: Bounds| if horizontal { b } else { b.transpose() };
    let area = along(bounds);
    let affected = collect_affected(modeler, root, shape);
    let (offset, lane_position, space_position) = if before {
        (-lane_size, area.y, area.y + SPACE_OFFSET)
    } else {
        (lane_size, area.bottom(), area.bottom() - SPACE_OFFSET)
    };
    let (axis, delta, direction) = match (horizontal, before) {
        (true, true) => (Axis::Y, Delta::new(0.0, offset), Direction::North),
        (true, false) => (Axis::Y, Delta::new(0.0, offset), Direction::South),
        (false, true) => (Axis::X, Delta::new(offset, 0.0), Direction::West),
        (false, false) => (Axis::X, Delta::new(offset, 0.0), Direction::East),
    };
    let adjustments = calculate_adjustments(modeler, &affected, axis, offset, space_position);
    modeler.execute(SpaceToolContext {
        moving_shapes: adjustments.moving_shapes,
        resizing_shapes: adjustments.resizing_shapes,
        delta,
        direction,
        start: space_position,
    })?;

    let indent = if is_root { indentation } else { 0.0 };
    let y = if before {
        lane_position - lane_size
    } else {
        lane_position
    };
    let lane = Bounds::new(area.x + indent, y, area.width - indent, lane_size);
    let new_lane = create_lane(modeler, lane_parent, along(lane))?;
    ctx.new_lane = Some(new_lane);
    Ok(())
}

/// Everything under the lanes root that may need to move, except the
/// subtree of `shape` itself.
fn collect_affected(modeler: &Modeler, root: ElementIndex, shape: ElementIndex) -> Vec<ElementIndex> {
    let mut affected = Vec::new();
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        affected.push(element);
        let el = modeler.element(element);
        if let Some(label) = el.label {
            affected.push(label);
        }
        if element == shape {
            continue;
        }
        stack.extend(el.children.iter().rev().filter(|c| **c != shape));
    }
    affected
}

/// Create a fresh lane under `parent`.
pub(crate) fn create_lane(
    modeler: &mut Modeler,
    parent: ElementIndex,
    bounds: Bounds,
) -> Result<ElementIndex, ModelingError> {
    let horizontal = is_horizontal(modeler, parent);
    let lane = modeler
        .element_factory()
        .create_shape(&ShapeAttrs::new(BpmnType::Lane).horizontal(horizontal))?;
    modeler.execute(ShapeCreateContext {
        shape: lane,
        placement: Placement::Bounds(bounds),
        parent,
        parent_index: None,
        host: None,
        hints: CreateHints::default(),
    })?;
    Ok(lane)
}
