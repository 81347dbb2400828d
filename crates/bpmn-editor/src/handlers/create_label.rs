//! `label.create`: add an external label next to its target.

use crate::command::LabelCreateContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

use super::create_shape::placed_bounds;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut LabelCreateContext) -> Result<(), ModelingError> {
    if ctx.parent.is_none() {
        ctx.parent = Some(
            modeler
                .element(ctx.label_target)
                .parent
                .unwrap_or_else(|| modeler.root()),
        );
    }
    Ok(())
}

pub fn execute(modeler: &mut Modeler, ctx: &mut LabelCreateContext) -> Result<(), ModelingError> {
    let parent = ctx.parent.unwrap_or_else(|| modeler.root());
    let bounds = placed_bounds(modeler.element(ctx.label).bounds, ctx.placement);
    modeler.canvas.get_mut(ctx.label).bounds = bounds;
    modeler.canvas.add_shape(ctx.label, parent, ctx.parent_index)?;
    modeler.canvas.set_label(ctx.label_target, Some(ctx.label));
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut LabelCreateContext) -> Result<(), ModelingError> {
    modeler.canvas.set_label(ctx.label_target, None);
    modeler.canvas.remove(ctx.label);
    Ok(())
}
