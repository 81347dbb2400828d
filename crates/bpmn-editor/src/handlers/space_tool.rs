//! `spaceTool`: open (or close) space along one axis by moving everything
//! beyond a line and stretching what crosses it.

use bpmn_core::{Bounds, Delta, ElementIndex, Point};

use crate::command::{
    ConnectionUpdateWaypointsContext, Direction, MoveHints, ResizeHints, ShapeMoveContext,
    ShapeResizeContext, SpaceToolContext,
};
use crate::error::ModelingError;
use crate::modeler::Modeler;
use crate::rules::RuleAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Shapes to move and shapes to resize when opening space of size `delta`
/// at `start` along `axis`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustments {
    pub moving_shapes: Vec<ElementIndex>,
    pub resizing_shapes: Vec<ElementIndex>,
}

/// Shapes entirely beyond `start` (in the direction of `delta`) move,
/// resizable shapes crossing it stretch. Attachers and labels follow their
/// moved elements.
pub fn calculate_adjustments(
    modeler: &Modeler,
    elements: &[ElementIndex],
    axis: Axis,
    delta: f64,
    start: f64,
) -> Adjustments {
    let mut adjustments = Adjustments::default();
    let rules = modeler.rules();
    let mut connections = Vec::new();

    for &idx in elements {
        let element = modeler.element(idx);
        if element.parent.is_none() || element.is_label() {
            continue;
        }
        if element.is_connection() {
            connections.push(idx);
            continue;
        }
        let (shape_start, size) = match axis {
            Axis::X => (element.bounds.x, element.bounds.width),
            Axis::Y => (element.bounds.y, element.bounds.height),
        };
        let shape_end = shape_start + size;

        if (delta > 0.0 && shape_start > start) || (delta < 0.0 && shape_end < start) {
            adjustments.push_moving(modeler, idx);
        } else if shape_start < start
            && shape_end > start
            && rules
                .allowed(
                    modeler,
                    &RuleAction::ShapeResize {
                        shape: idx,
                        new_bounds: None,
                    },
                )
                .is_allowed()
            && !adjustments.resizing_shapes.contains(&idx)
        {
            adjustments.resizing_shapes.push(idx);
        }
    }

    let mut i = 0;
    while i < adjustments.moving_shapes.len() {
        let attachers = modeler.element(adjustments.moving_shapes[i]).attachers.clone();
        for attacher in attachers {
            adjustments.push_moving(modeler, attacher);
        }
        i += 1;
    }

    for connection in connections {
        let element = modeler.element(connection);
        let carried = |end: Option<ElementIndex>| {
            end.is_some_and(|e| {
                adjustments.moving_shapes.contains(&e) || adjustments.resizing_shapes.contains(&e)
            })
        };
        if carried(element.source)
            && carried(element.target)
            && let Some(label) = element.label
        {
            adjustments.push_moving(modeler, label);
        }
    }
    adjustments
}

impl Adjustments {
    fn push_moving(&mut self, modeler: &Modeler, shape: ElementIndex) {
        if !self.moving_shapes.contains(&shape) {
            self.moving_shapes.push(shape);
        }
        if let Some(label) = modeler.element(shape).label
            && !self.moving_shapes.contains(&label)
        {
            self.moving_shapes.push(label);
        }
    }
}

/// Stretch `bounds` on the side `direction` points to.
pub fn resize_bounds(bounds: Bounds, direction: Direction, delta: Delta) -> Bounds {
    let mut new = bounds;
    match direction {
        Direction::North => {
            new.y = bounds.y + delta.y;
            new.height = bounds.height - delta.y;
        }
        Direction::South => new.height = bounds.height + delta.y,
        Direction::East => new.width = bounds.width + delta.x,
        Direction::West => {
            new.x = bounds.x + delta.x;
            new.width = bounds.width - delta.x;
        }
    }
    new
}

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut SpaceToolContext) -> Result<(), ModelingError> {
    for &shape in &ctx.moving_shapes {
        modeler.execute(ShapeMoveContext {
            hints: MoveHints {
                layout: false,
                recurse: false,
            },
            ..ShapeMoveContext::new(shape, ctx.delta)
        })?;
    }

    for &shape in &ctx.resizing_shapes {
        let new_bounds = resize_bounds(modeler.element(shape).bounds, ctx.direction, ctx.delta);
        modeler.execute(ShapeResizeContext {
            hints: ResizeHints {
                layout: false,
                attach_support: false,
            },
            ..ShapeResizeContext::new(shape, new_bounds)
        })?;
    }

    update_connection_waypoints(modeler, ctx)
}

/// Shift the waypoints of touched connections that lie beyond the line.
fn update_connection_waypoints(modeler: &mut Modeler, ctx: &SpaceToolContext) -> Result<(), ModelingError> {
    let mut connections: Vec<ElementIndex> = Vec::new();
    for shape in ctx.moving_shapes.iter().chain(&ctx.resizing_shapes) {
        let element = modeler.element(*shape);
        for c in element.incoming.iter().chain(&element.outgoing) {
            if !connections.contains(c) {
                connections.push(*c);
            }
        }
    }

    let beyond = |p: Point| match ctx.direction {
        Direction::North => p.y < ctx.start,
        Direction::South => p.y > ctx.start,
        Direction::East => p.x > ctx.start,
        Direction::West => p.x < ctx.start,
    };

    for connection in connections {
        let element = modeler.element(connection);
        let source_moved = element
            .source
            .is_some_and(|s| ctx.moving_shapes.contains(&s));
        let target_moved = element
            .target
            .is_some_and(|t| ctx.moving_shapes.contains(&t));
        let last = element.waypoints.len().saturating_sub(1);

        let mut waypoints = element.waypoints.clone();
        let mut changed = false;
        for (i, waypoint) in waypoints.iter_mut().enumerate() {
            let carried = (i == 0 && source_moved) || (i == last && target_moved);
            if carried || beyond(waypoint.point()) {
                waypoint.translate(ctx.delta, true);
                changed = true;
            }
        }
        if changed {
            modeler.execute(ConnectionUpdateWaypointsContext {
                connection,
                new_waypoints: waypoints,
                old_waypoints: None,
            })?;
        }
    }
    Ok(())
}
