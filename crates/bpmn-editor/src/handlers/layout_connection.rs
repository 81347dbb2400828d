//! `connection.layout`: recompute waypoints from the current endpoints.

use crate::command::ConnectionLayoutContext;
use crate::error::ModelingError;
use crate::layout;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut ConnectionLayoutContext) -> Result<(), ModelingError> {
    let waypoints = layout::layout_connection(modeler, ctx.connection, &ctx.hints);
    let connection = modeler.canvas.get_mut(ctx.connection);
    ctx.old_waypoints = Some(std::mem::replace(&mut connection.waypoints, waypoints));
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ConnectionLayoutContext) -> Result<(), ModelingError> {
    if let Some(old) = ctx.old_waypoints.clone() {
        modeler.canvas.get_mut(ctx.connection).waypoints = old;
    }
    Ok(())
}
