//! `connection.reconnect`: move one or both ends of a connection.
//!
//! Semantic cleanup (conditions, default flows) happens in the updater,
//! which records what it cleared on this context.

use crate::command::{ConnectionLayoutContext, ConnectionReconnectContext};
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(
    modeler: &mut Modeler,
    ctx: &mut ConnectionReconnectContext,
) -> Result<(), ModelingError> {
    let connection = modeler.element(ctx.connection);
    ctx.old_source = connection.source;
    ctx.old_target = connection.target;

    if ctx.old_source != Some(ctx.new_source) {
        ctx.old_source_index = modeler
            .canvas
            .set_source(ctx.connection, Some(ctx.new_source));
    }
    if ctx.old_target != Some(ctx.new_target) {
        ctx.old_target_index = modeler
            .canvas
            .set_target(ctx.connection, Some(ctx.new_target));
    }

    if let Some(waypoints) = &ctx.waypoints {
        let connection = modeler.canvas.get_mut(ctx.connection);
        ctx.old_waypoints = Some(std::mem::replace(
            &mut connection.waypoints,
            waypoints.clone(),
        ));
    }
    Ok(())
}

pub fn post_execute(
    modeler: &mut Modeler,
    ctx: &mut ConnectionReconnectContext,
) -> Result<(), ModelingError> {
    if ctx.waypoints.is_none() {
        modeler.execute(ConnectionLayoutContext::new(ctx.connection, ctx.hints))?;
    }
    Ok(())
}

pub fn revert(
    modeler: &mut Modeler,
    ctx: &mut ConnectionReconnectContext,
) -> Result<(), ModelingError> {
    if let Some(old) = ctx.old_waypoints.clone() {
        modeler.canvas.get_mut(ctx.connection).waypoints = old;
    }
    if ctx.old_target != Some(ctx.new_target) {
        modeler
            .canvas
            .set_target_at(ctx.connection, ctx.old_target, ctx.old_target_index);
    }
    if ctx.old_source != Some(ctx.new_source) {
        modeler
            .canvas
            .set_source_at(ctx.connection, ctx.old_source, ctx.old_source_index);
    }
    Ok(())
}
