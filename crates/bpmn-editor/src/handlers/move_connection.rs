//! `connection.move`

use crate::command::ConnectionMoveContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut ConnectionMoveContext) -> Result<(), ModelingError> {
    let old_parent = modeler.element(ctx.connection).parent;
    let new_parent = ctx.new_parent.or(old_parent);
    ctx.old_parent = old_parent;
    ctx.new_parent = new_parent;
    ctx.old_parent_index = modeler
        .canvas
        .set_parent(ctx.connection, new_parent, ctx.new_parent_index);

    let anchors = ctx.hints.update_anchors;
    let connection = modeler.canvas.get_mut(ctx.connection);
    ctx.old_waypoints = Some(connection.waypoints.clone());
    for waypoint in &mut connection.waypoints {
        waypoint.translate(ctx.delta, anchors);
    }
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ConnectionMoveContext) -> Result<(), ModelingError> {
    modeler
        .canvas
        .set_parent(ctx.connection, ctx.old_parent, ctx.old_parent_index);

    let connection = modeler.canvas.get_mut(ctx.connection);
    if let Some(old) = &ctx.old_waypoints {
        connection.waypoints = old.clone();
        return Ok(());
    }
    let (delta, anchors) = (ctx.delta.invert(), ctx.hints.update_anchors);
    for waypoint in &mut connection.waypoints {
        waypoint.translate(delta, anchors);
    }
    Ok(())
}
