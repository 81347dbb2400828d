//! `shape.delete`: remove a shape together with its connections and
//! children. Connections and children go through nested commands so their
//! own handlers (and listeners) run.

use crate::command::{ConnectionDeleteContext, ShapeDeleteContext};
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut ShapeDeleteContext) -> Result<(), ModelingError> {
    let shape = modeler.element(ctx.shape);
    let mut connections = shape.incoming.clone();
    connections.extend(shape.outgoing.iter().copied());
    for connection in connections.into_iter().rev() {
        if modeler.canvas.contains(connection) {
            modeler.execute(ConnectionDeleteContext::new(connection))?;
        }
    }

    let children = modeler.element(ctx.shape).children.clone();
    for child in children.into_iter().rev() {
        if !modeler.canvas.contains(child) {
            continue;
        }
        if modeler.element(child).is_connection() {
            modeler.execute(ConnectionDeleteContext::new(child))?;
        } else {
            modeler.execute(ShapeDeleteContext {
                nested: true,
                ..ShapeDeleteContext::new(child)
            })?;
        }
    }
    Ok(())
}

pub fn execute(modeler: &mut Modeler, ctx: &mut ShapeDeleteContext) -> Result<(), ModelingError> {
    let element = modeler.element(ctx.shape);
    ctx.old_label_target = element.label_target;
    ctx.old_host = element.host;

    if let Some(target) = ctx.old_label_target {
        modeler.canvas.set_label(target, None);
    }
    ctx.old_host_index = modeler.canvas.set_host(ctx.shape, None, None);

    let (parent, index) = modeler.canvas.remove(ctx.shape).unzip();
    ctx.old_parent = parent;
    ctx.old_parent_index = index;
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ShapeDeleteContext) -> Result<(), ModelingError> {
    if let Some(parent) = ctx.old_parent {
        modeler
            .canvas
            .add_shape(ctx.shape, parent, ctx.old_parent_index)?;
    }
    if let Some(host) = ctx.old_host {
        modeler
            .canvas
            .set_host(ctx.shape, Some(host), ctx.old_host_index);
    }
    if let Some(target) = ctx.old_label_target {
        modeler.canvas.set_label(target, Some(ctx.shape));
    }
    Ok(())
}
