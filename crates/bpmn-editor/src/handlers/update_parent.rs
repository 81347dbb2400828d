//! `element.updateParent`

use crate::command::UpdateParentContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut UpdateParentContext) -> Result<(), ModelingError> {
    ctx.old_parent = modeler.element(ctx.element).parent;
    ctx.old_parent_index =
        modeler
            .canvas
            .set_parent(ctx.element, Some(ctx.new_parent), ctx.new_parent_index);
    Ok(())
}

/// Reinserts at the exact old sibling index.
pub fn revert(modeler: &mut Modeler, ctx: &mut UpdateParentContext) -> Result<(), ModelingError> {
    modeler
        .canvas
        .set_parent(ctx.element, ctx.old_parent, ctx.old_parent_index);
    Ok(())
}
