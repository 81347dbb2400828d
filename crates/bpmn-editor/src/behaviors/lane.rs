//! Lane behaviors.
//!
//! - shapes dropped on a lane go to the lane's participant
//! - deleting a lane lets its siblings take over the freed space, along
//!   the pool's orientation
//! - flow node references are recomputed once per outermost command that
//!   touched lanes or flow nodes

use std::cell::RefCell;
use std::rc::Rc;

use bpmn_core::{Bounds, BpmnType, Delta, ElementIndex};

use crate::command::{CommandContext, CommandKind, Direction, LaneUpdateRefsContext, SpaceToolContext};
use crate::error::ModelingError;
use crate::handlers::space_tool::{Axis, calculate_adjustments};
use crate::interceptor::{CommandInterceptor, Hook};
use crate::lane_util::{child_lanes, is_horizontal, lanes_root};
use crate::modeler::Modeler;

const HIGH_PRIORITY: i32 = 1500;
const LOW_PRIORITY: i32 = 500;

/// Distance from the deleted lane's border at which space closes.
const SPACE_OFFSET: f64 = 10.0;

/// Commands that may change which lane a flow node lies in.
const REF_UPDATE_COMMANDS: [CommandKind; 11] = [
    CommandKind::SpaceTool,
    CommandKind::LaneAdd,
    CommandKind::LaneResize,
    CommandKind::LaneSplit,
    CommandKind::ElementsCreate,
    CommandKind::ElementsDelete,
    CommandKind::ElementsMove,
    CommandKind::ShapeCreate,
    CommandKind::ShapeDelete,
    CommandKind::ShapeMove,
    CommandKind::ShapeResize,
];

/// Flow nodes and lanes collected while a batch of commands runs.
#[derive(Debug, Default)]
struct PendingRefs {
    transaction: u64,
    depth: usize,
    flow_nodes: Vec<ElementIndex>,
    lanes: Vec<ElementIndex>,
}

impl PendingRefs {
    fn mark(&mut self, modeler: &Modeler, shape: ElementIndex) {
        if modeler.element(shape).is_label() {
            return;
        }
        let list = if modeler.is_type(shape, BpmnType::Lane) {
            &mut self.lanes
        } else if modeler.is(shape, BpmnType::is_flow_node) {
            &mut self.flow_nodes
        } else {
            return;
        };
        if !list.contains(&shape) {
            list.push(shape);
        }
    }
}

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        [CommandKind::ShapeCreate, CommandKind::ElementsMove],
        Hook::PreExecute,
        Some(HIGH_PRIORITY),
        |modeler, context, _| {
            redirect_from_lane(modeler, context);
            Ok(())
        },
    )?;

    install_ref_updates(interceptor)?;

    interceptor.on_context(
        CommandKind::ShapeDelete,
        Hook::PostExecute,
        Some(LOW_PRIORITY),
        |modeler, context, _| {
            let CommandContext::ShapeDelete(ctx) = context else {
                return Ok(());
            };
            if ctx.nested || !modeler.is_type(ctx.shape, BpmnType::Lane) {
                return Ok(());
            }
            match ctx.old_parent {
                Some(parent) => compensate_lane_delete(modeler, ctx.shape, parent),
                None => Ok(()),
            }
        },
    )?;
    Ok(())
}

/// Lanes never contain flow elements directly.
fn redirect_from_lane(modeler: &Modeler, context: &mut CommandContext) {
    let redirect = |parent: ElementIndex| {
        if modeler.is_type(parent, BpmnType::Lane) {
            lanes_root(modeler, parent).unwrap_or(parent)
        } else {
            parent
        }
    };
    match context {
        CommandContext::ShapeCreate(ctx) if !modeler.is_type(ctx.shape, BpmnType::Lane) => {
            ctx.parent = redirect(ctx.parent);
        }
        CommandContext::ElementsMove(ctx) => {
            let moves_lanes = ctx.shapes.iter().any(|s| modeler.is_type(*s, BpmnType::Lane));
            if !moves_lanes {
                ctx.new_parent = ctx.new_parent.map(redirect);
            }
        }
        _ => {}
    }
}

fn install_ref_updates(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    let pending = Rc::new(RefCell::new(PendingRefs::default()));

    let state = pending.clone();
    interceptor.on_context(
        REF_UPDATE_COMMANDS,
        Hook::PreExecute,
        Some(LOW_PRIORITY),
        move |modeler, context, _| {
            let mut pending = state.borrow_mut();
            let transaction = modeler.transaction();
            if pending.transaction != transaction {
                // leftovers of a failed transaction
                *pending = PendingRefs {
                    transaction,
                    ..PendingRefs::default()
                };
            }
            pending.depth += 1;
            let shape = match context {
                CommandContext::ShapeCreate(c) => Some(c.shape),
                CommandContext::ShapeMove(c) => Some(c.shape),
                CommandContext::ShapeDelete(c) => Some(c.shape),
                CommandContext::ShapeResize(c) => Some(c.shape),
                _ => None,
            };
            if let Some(shape) = shape {
                pending.mark(modeler, shape);
            }
            Ok(())
        },
    )?;

    let state = pending;
    interceptor.on_context(
        REF_UPDATE_COMMANDS,
        Hook::PostExecute,
        Some(LOW_PRIORITY),
        move |modeler, _, _| {
            let update = {
                let mut pending = state.borrow_mut();
                if pending.transaction != modeler.transaction() {
                    return Ok(());
                }
                pending.depth = pending.depth.saturating_sub(1);
                if pending.depth > 0 {
                    return Ok(());
                }
                std::mem::take(&mut *pending)
            };
            if update.flow_nodes.is_empty() && update.lanes.is_empty() {
                return Ok(());
            }
            modeler.execute(LaneUpdateRefsContext {
                flow_nodes: update.flow_nodes,
                lanes: update.lanes,
                updates: Vec::new(),
            })?;
            Ok(())
        },
    )?;
    Ok(())
}

/// Close the gap a deleted lane leaves: the lanes before and after grow
/// into it, each by half when both sides exist.
fn compensate_lane_delete(
    modeler: &mut Modeler,
    lane: ElementIndex,
    parent: ElementIndex,
) -> Result<(), ModelingError> {
    let siblings = child_lanes(modeler, parent);
    if siblings.is_empty() {
        return Ok(());
    }
    let horizontal = is_horizontal(modeler, parent);
    // measure top to bottom, transposed for vertical pools
    let along = |b: Bounds| if horizontal { b } else { b.transpose() };
    let bounds = along(modeler.element(lane).bounds);

    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut stack = siblings;
    while let Some(element) = stack.pop() {
        if along(modeler.element(element).bounds).y > bounds.y {
            after.push(element);
        } else {
            before.push(element);
        }
        stack.extend(modeler.element(element).children.iter().copied());
    }

    let offset = if !before.is_empty() && !after.is_empty() {
        bounds.height / 2.0
    } else {
        bounds.height
    };
    let (axis, grow, shrink) = if horizontal {
        (Axis::Y, Direction::South, Direction::North)
    } else {
        (Axis::X, Direction::East, Direction::West)
    };
    let delta_of = |d: f64| {
        if horizontal {
            Delta::new(0.0, d)
        } else {
            Delta::new(d, 0.0)
        }
    };

    if !before.is_empty() {
        let start = bounds.y - SPACE_OFFSET;
        let adjustments = calculate_adjustments(modeler, &before, axis, offset, start);
        modeler.execute(SpaceToolContext {
            moving_shapes: adjustments.moving_shapes,
            resizing_shapes: adjustments.resizing_shapes,
            delta: delta_of(offset),
            direction: grow,
            start,
        })?;
    }
    if !after.is_empty() {
        let start = bounds.bottom() + SPACE_OFFSET;
        let adjustments = calculate_adjustments(modeler, &after, axis, -offset, start);
        modeler.execute(SpaceToolContext {
            moving_shapes: adjustments.moving_shapes,
            resizing_shapes: adjustments.resizing_shapes,
            delta: delta_of(-offset),
            direction: shrink,
            start,
        })?;
    }
    Ok(())
}
