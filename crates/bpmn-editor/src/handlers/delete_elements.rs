//! `elements.delete`: delete a mixed selection. Elements already removed
//! by an earlier cascade are skipped.

use crate::command::{ConnectionDeleteContext, ElementsDeleteContext, ShapeDeleteContext};
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut ElementsDeleteContext) -> Result<(), ModelingError> {
    for &element in &ctx.elements {
        if !modeler.canvas.contains(element) {
            continue;
        }
        if modeler.element(element).is_connection() {
            modeler.execute(ConnectionDeleteContext::new(element))?;
        } else {
            modeler.execute(ShapeDeleteContext::new(element))?;
        }
    }
    Ok(())
}
