//! `connection.create`: wire a prepared connection between two shapes.

use crate::command::ConnectionCreateContext;
use crate::error::ModelingError;
use crate::layout;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut ConnectionCreateContext) -> Result<(), ModelingError> {
    modeler.canvas.set_source(ctx.connection, Some(ctx.source));
    modeler.canvas.set_target(ctx.connection, Some(ctx.target));

    if modeler.element(ctx.connection).waypoints.is_empty() {
        let waypoints = layout::layout_connection(modeler, ctx.connection, &ctx.hints);
        modeler.canvas.get_mut(ctx.connection).waypoints = waypoints;
    }

    modeler
        .canvas
        .add_connection(ctx.connection, ctx.parent, ctx.parent_index)?;
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ConnectionCreateContext) -> Result<(), ModelingError> {
    modeler.canvas.remove(ctx.connection);
    modeler.canvas.set_source(ctx.connection, None);
    modeler.canvas.set_target(ctx.connection, None);
    Ok(())
}
