//! `connection.updateWaypoints`

use crate::command::ConnectionUpdateWaypointsContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(
    modeler: &mut Modeler,
    ctx: &mut ConnectionUpdateWaypointsContext,
) -> Result<(), ModelingError> {
    let connection = modeler.canvas.get_mut(ctx.connection);
    ctx.old_waypoints = Some(std::mem::replace(
        &mut connection.waypoints,
        ctx.new_waypoints.clone(),
    ));
    Ok(())
}

pub fn revert(
    modeler: &mut Modeler,
    ctx: &mut ConnectionUpdateWaypointsContext,
) -> Result<(), ModelingError> {
    if let Some(old) = ctx.old_waypoints.clone() {
        modeler.canvas.get_mut(ctx.connection).waypoints = old;
    }
    Ok(())
}
