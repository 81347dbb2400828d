//! `connection.delete`

use crate::command::ConnectionDeleteContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut ConnectionDeleteContext) -> Result<(), ModelingError> {
    let connection = modeler.element(ctx.connection);
    ctx.old_source = connection.source;
    ctx.old_target = connection.target;

    ctx.old_source_index = modeler.canvas.set_source(ctx.connection, None);
    ctx.old_target_index = modeler.canvas.set_target(ctx.connection, None);

    let (parent, index) = modeler.canvas.remove(ctx.connection).unzip();
    ctx.old_parent = parent;
    ctx.old_parent_index = index;
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut ConnectionDeleteContext) -> Result<(), ModelingError> {
    if let Some(parent) = ctx.old_parent {
        modeler
            .canvas
            .add_connection(ctx.connection, parent, ctx.old_parent_index)?;
    }
    modeler
        .canvas
        .set_source_at(ctx.connection, ctx.old_source, ctx.old_source_index);
    modeler
        .canvas
        .set_target_at(ctx.connection, ctx.old_target, ctx.old_target_index);
    Ok(())
}
