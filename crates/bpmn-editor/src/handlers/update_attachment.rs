//! `element.updateAttachment`: attach a shape to a new host, or detach it.

use crate::command::UpdateAttachmentContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut UpdateAttachmentContext) -> Result<(), ModelingError> {
    ctx.old_host = modeler.element(ctx.shape).host;
    ctx.old_attacher_index = modeler.canvas.set_host(ctx.shape, ctx.new_host, None);
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut UpdateAttachmentContext) -> Result<(), ModelingError> {
    modeler
        .canvas
        .set_host(ctx.shape, ctx.old_host, ctx.old_attacher_index);
    Ok(())
}
