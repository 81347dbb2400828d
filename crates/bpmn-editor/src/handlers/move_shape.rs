//! `shape.move`: translate a shape and optionally reparent it. Attached
//! connections are laid out and children follow unless the hints say
//! otherwise.

use crate::command::{ConnectionLayoutContext, LayoutHints, ShapeMoveContext};
use crate::error::ModelingError;
use crate::layout::{moved_source_anchor, moved_target_anchor};
use crate::modeler::Modeler;

use super::move_elements::{MoveClosure, move_closure};

pub fn execute(modeler: &mut Modeler, ctx: &mut ShapeMoveContext) -> Result<(), ModelingError> {
    let old_parent = modeler.element(ctx.shape).parent;
    let new_parent = ctx.new_parent.or(old_parent);
    ctx.old_parent = old_parent;
    ctx.new_parent = new_parent;
    ctx.old_parent_index = modeler
        .canvas
        .set_parent(ctx.shape, new_parent, ctx.new_parent_index);

    let shape = modeler.canvas.get_mut(ctx.shape);
    ctx.old_bounds = Some(shape.bounds);
    shape.bounds = shape.bounds.translate(ctx.delta);
    Ok(())
}

pub fn post_execute(modeler: &mut Modeler, ctx: &mut ShapeMoveContext) -> Result<(), ModelingError> {
    let delta = ctx.delta;
    if ctx.hints.layout {
        let shape = modeler.element(ctx.shape);
        let incoming = shape.incoming.clone();
        let outgoing = shape.outgoing.clone();
        for connection in incoming {
            let hints = LayoutHints {
                connection_end: moved_target_anchor(modeler, connection, delta),
                ..LayoutHints::default()
            };
            modeler.execute(ConnectionLayoutContext::new(connection, hints))?;
        }
        for connection in outgoing {
            let hints = LayoutHints {
                connection_start: moved_source_anchor(modeler, connection, delta),
                ..LayoutHints::default()
            };
            modeler.execute(ConnectionLayoutContext::new(connection, hints))?;
        }
    }

    if ctx.hints.recurse {
        let children = modeler.element(ctx.shape).children.clone();
        if !children.is_empty() {
            let closure = MoveClosure::compute(modeler, &children);
            move_closure(modeler, &closure, delta, None, None)?;
        }
    }
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ShapeMoveContext) -> Result<(), ModelingError> {
    modeler
        .canvas
        .set_parent(ctx.shape, ctx.old_parent, ctx.old_parent_index);
    let shape = modeler.canvas.get_mut(ctx.shape);
    shape.bounds = match ctx.old_bounds {
        Some(old) => old,
        None => shape.bounds.translate(ctx.delta.invert()),
    };
    Ok(())
}
