//! `canvas.updateRoot`: swap the canvas root between a process and a
//! collaboration. The new root takes over the old root's slot in the
//! definitions and the diagram plane.

use bpmn_core::{ElementIndex, props};

use crate::command::CanvasUpdateRootContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut CanvasUpdateRootContext) -> Result<(), ModelingError> {
    let old_root = modeler.root();
    ctx.old_root = Some(old_root);
    modeler.canvas.set_root_element(ctx.new_root);
    swap_root(modeler, old_root, ctx.new_root);
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut CanvasUpdateRootContext) -> Result<(), ModelingError> {
    let Some(old_root) = ctx.old_root else {
        return Ok(());
    };
    modeler.canvas.set_root_element(old_root);
    swap_root(modeler, ctx.new_root, old_root);
    Ok(())
}

fn swap_root(modeler: &mut Modeler, from: ElementIndex, to: ElementIndex) {
    let (Some(from_bo), Some(to_bo)) = (modeler.bo(from), modeler.bo(to)) else {
        return;
    };
    let definitions = modeler.moddle.definitions;
    let plane = modeler.moddle.plane;

    let index = modeler
        .moddle
        .remove_from(definitions, props::ROOT_ELEMENTS, from_bo);
    modeler.moddle.get_mut(from_bo).parent = None;
    modeler.moddle.get_mut(from_bo).di = None;

    modeler
        .moddle
        .add_to(definitions, props::ROOT_ELEMENTS, to_bo, index);
    modeler.moddle.get_mut(to_bo).parent = Some(definitions);
    modeler.moddle.link_di(to_bo, plane);
}
