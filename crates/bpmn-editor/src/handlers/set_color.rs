//! `element.setColor`: fill and stroke of shapes and connections; labels
//! take the stroke as their text color.

use bpmn_core::DiColor;

use crate::command::SetColorContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn execute(modeler: &mut Modeler, ctx: &mut SetColorContext) -> Result<(), ModelingError> {
    ctx.old_colors = ctx
        .elements
        .iter()
        .map(|element| apply(modeler, *element, &ctx.colors))
        .collect();
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut SetColorContext) -> Result<(), ModelingError> {
    for (element, old) in ctx.elements.iter().zip(&ctx.old_colors) {
        apply(modeler, *element, old);
    }
    Ok(())
}

/// Write `colors` to the element's DI, returning the previous colors.
fn apply(modeler: &mut Modeler, element: bpmn_core::ElementIndex, colors: &DiColor) -> DiColor {
    let is_label = modeler.element(element).is_label();
    let Some(di) = modeler.bo(element).and_then(|bo| modeler.moddle.di_of(bo)) else {
        return DiColor::default();
    };
    let di = modeler.moddle.di_mut(di);
    if is_label {
        let label = di.label.get_or_insert_with(Default::default);
        DiColor {
            fill: None,
            stroke: std::mem::replace(&mut label.color, colors.stroke.clone()),
        }
    } else {
        std::mem::replace(&mut di.color, colors.clone())
    }
}
