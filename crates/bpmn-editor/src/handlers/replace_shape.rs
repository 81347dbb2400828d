//! `shape.replace`: swap a shape for a new one of another type.
//!
//! The new shape takes the old one's place, host, children and
//! connections (as far as the rules allow); the old shape is deleted last.

use bpmn_core::{Delta, ElementIndex};

use crate::command::{
    ConnectionReconnectContext, CreateHints, ElementsMoveContext, LayoutHints, Placement,
    ShapeCreateContext, ShapeDeleteContext, ShapeReplaceContext, UpdateAttachmentContext,
};
use crate::error::ModelingError;
use crate::modeler::Modeler;
use crate::rules::{Allowed, RuleAction};

use super::resize_shape::resized_anchor;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut ShapeReplaceContext) -> Result<(), ModelingError> {
    let old_shape = ctx.old_shape;
    let old = modeler.element(old_shape);
    let old_bounds = old.bounds;
    let center = old_bounds.mid();
    let parent = old.parent.unwrap_or_else(|| modeler.root());
    let old_host = old.host;

    let new_shape = match ctx.new_shape {
        Some(shape) => shape,
        None => {
            let mut attrs = ctx.new_data.clone();
            if attrs.name.is_none() {
                attrs.name = modeler
                    .bo(old_shape)
                    .and_then(|bo| modeler.moddle.get(bo).name().map(str::to_string));
            }
            modeler.element_factory().create_shape(&attrs)?
        }
    };
    ctx.new_shape = Some(new_shape);

    modeler.execute(ShapeCreateContext {
        shape: new_shape,
        placement: Placement::Center(center),
        parent,
        parent_index: None,
        host: None,
        hints: CreateHints::default(),
    })?;

    if old_host.is_some() {
        modeler.execute(UpdateAttachmentContext::new(new_shape, old_host))?;
    }

    if ctx.hints.move_children {
        let children = modeler.element(old_shape).children.clone();
        if !children.is_empty() {
            modeler.execute(ElementsMoveContext {
                new_parent: Some(new_shape),
                ..ElementsMoveContext::new(children, Delta::default())
            })?;
        }
    }

    let new_bounds = modeler.element(new_shape).bounds;
    let rules = modeler.rules();
    let incoming = modeler.element(old_shape).incoming.clone();
    for connection in incoming {
        let Some(source) = modeler.element(connection).source else {
            continue;
        };
        let action = RuleAction::ConnectionReconnect {
            connection,
            source,
            target: new_shape,
        };
        if rules.allowed(modeler, &action) == Allowed::Denied {
            continue;
        }
        let end = end_anchor(modeler, connection, false)
            .map(|p| resized_anchor(p, old_bounds, new_bounds));
        modeler.execute(ConnectionReconnectContext {
            hints: LayoutHints {
                connection_end: end,
                ..LayoutHints::default()
            },
            ..ConnectionReconnectContext::new(connection, source, new_shape)
        })?;
    }

    let outgoing = modeler.element(old_shape).outgoing.clone();
    for connection in outgoing {
        let Some(target) = modeler.element(connection).target else {
            continue;
        };
        let action = RuleAction::ConnectionReconnect {
            connection,
            source: new_shape,
            target,
        };
        if rules.allowed(modeler, &action) == Allowed::Denied {
            continue;
        }
        let start = end_anchor(modeler, connection, true)
            .map(|p| resized_anchor(p, old_bounds, new_bounds));
        modeler.execute(ConnectionReconnectContext {
            hints: LayoutHints {
                connection_start: start,
                ..LayoutHints::default()
            },
            ..ConnectionReconnectContext::new(connection, new_shape, target)
        })?;
    }
    Ok(())
}

/// Re-home the attachers the new shape can carry, then delete the old shape
/// (which takes everything left behind with it).
pub fn post_execute(modeler: &mut Modeler, ctx: &mut ShapeReplaceContext) -> Result<(), ModelingError> {
    let Some(new_shape) = ctx.new_shape else {
        return Ok(());
    };
    let rules = modeler.rules();
    let attachers = modeler.element(ctx.old_shape).attachers.to_vec();
    for attacher in attachers {
        let shapes = [attacher];
        let action = RuleAction::ElementsMove {
            shapes: &shapes,
            target: Some(new_shape),
            position: None,
        };
        if rules.allowed(modeler, &action) == Allowed::Attach {
            modeler.execute(UpdateAttachmentContext::new(attacher, Some(new_shape)))?;
        } else {
            modeler.execute(ShapeDeleteContext::new(attacher))?;
        }
    }

    if modeler.canvas.contains(ctx.old_shape) {
        modeler.execute(ShapeDeleteContext::new(ctx.old_shape))?;
    }
    Ok(())
}

fn end_anchor(
    modeler: &Modeler,
    connection: ElementIndex,
    start: bool,
) -> Option<bpmn_core::Point> {
    let waypoints = &modeler.element(connection).waypoints;
    let waypoint = if start {
        waypoints.first()
    } else {
        waypoints.last()
    };
    waypoint.map(|w| w.original.unwrap_or(w.point()))
}
