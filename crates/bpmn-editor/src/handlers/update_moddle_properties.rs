//! `element.updateModdleProperties`: write properties of any business
//! object related to an element (e.g. its process or a category value).

use crate::command::UpdateModdlePropertiesContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

use super::update_properties::{set_properties, snapshot};

pub fn execute(
    modeler: &mut Modeler,
    ctx: &mut UpdateModdlePropertiesContext,
) -> Result<(), ModelingError> {
    ctx.old_properties = snapshot(modeler, ctx.moddle_element, &ctx.properties);
    let drawn = drawn_element(modeler, ctx);
    set_properties(modeler, drawn, ctx.moddle_element, &ctx.properties)
}

pub fn revert(
    modeler: &mut Modeler,
    ctx: &mut UpdateModdlePropertiesContext,
) -> Result<(), ModelingError> {
    let drawn = drawn_element(modeler, ctx);
    set_properties(modeler, drawn, ctx.moddle_element, &ctx.old_properties)
}

/// The element itself when the target object is its own business object.
fn drawn_element(
    modeler: &Modeler,
    ctx: &UpdateModdlePropertiesContext,
) -> Option<bpmn_core::ElementIndex> {
    (modeler.bo(ctx.element) == Some(ctx.moddle_element)).then_some(ctx.element)
}
