//! `element.updateSemanticParent`: move a business object (and its DI) to
//! an explicit semantic parent, independent of the graphical parent.

use crate::command::UpdateSemanticParentContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;
use crate::updater::{update_di_parent, update_semantic_parent};

pub fn execute(
    modeler: &mut Modeler,
    ctx: &mut UpdateSemanticParentContext,
) -> Result<(), ModelingError> {
    let Some(bo) = modeler.bo(ctx.element) else {
        return Ok(());
    };
    let di = modeler.moddle.di_of(bo);
    ctx.old_semantic_parent = modeler.moddle.parent_of(bo);
    ctx.old_di_parent = di.and_then(|di| modeler.moddle.di(di).parent);

    update_semantic_parent(modeler, bo, Some(ctx.new_semantic_parent))?;
    if let Some(di) = di {
        update_di_parent(modeler, di, ctx.new_di_parent);
    }
    Ok(())
}

pub fn revert(
    modeler: &mut Modeler,
    ctx: &mut UpdateSemanticParentContext,
) -> Result<(), ModelingError> {
    let Some(bo) = modeler.bo(ctx.element) else {
        return Ok(());
    };
    update_semantic_parent(modeler, bo, ctx.old_semantic_parent)?;
    if let Some(di) = modeler.moddle.di_of(bo) {
        update_di_parent(modeler, di, ctx.old_di_parent);
    }
    Ok(())
}
