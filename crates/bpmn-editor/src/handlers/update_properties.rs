//! `element.updateProperties`: write business-object properties of an
//! element. Changing `id` re-keys the element registry and the id registry.

use std::collections::BTreeMap;

use bpmn_core::{ElementId, ElementIndex, ObjectIndex, Value};

use crate::command::UpdatePropertiesContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

pub const ID: &str = "id";

pub fn execute(modeler: &mut Modeler, ctx: &mut UpdatePropertiesContext) -> Result<(), ModelingError> {
    let bo = business_object(modeler, ctx.element)?;
    ctx.old_properties = snapshot(modeler, bo, &ctx.properties);
    set_properties(modeler, Some(ctx.element), bo, &ctx.properties)
}

pub fn revert(modeler: &mut Modeler, ctx: &mut UpdatePropertiesContext) -> Result<(), ModelingError> {
    let bo = business_object(modeler, ctx.element)?;
    set_properties(modeler, Some(ctx.element), bo, &ctx.old_properties)
}

fn business_object(modeler: &Modeler, element: ElementIndex) -> Result<ObjectIndex, ModelingError> {
    modeler.bo(element).ok_or_else(|| {
        ModelingError::InvalidArgument(format!(
            "<{}> has no business object",
            modeler.element(element).id
        ))
    })
}

/// Current values of the keys in `properties`.
pub(crate) fn snapshot(
    modeler: &Modeler,
    bo: ObjectIndex,
    properties: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    let object = modeler.moddle.get(bo);
    properties
        .keys()
        .map(|key| {
            let value = if key == ID {
                Value::String(object.id.to_string())
            } else {
                object.get(key).clone()
            };
            (key.clone(), value)
        })
        .collect()
}

/// Write `properties` to `bo`. `element` is the graphical element drawn for
/// `bo`, re-keyed when the id changes.
///
/// # Errors
/// Returns [`ModelingError::IdConflict`] before any write when a new id is taken.
pub(crate) fn set_properties(
    modeler: &mut Modeler,
    element: Option<ElementIndex>,
    bo: ObjectIndex,
    properties: &BTreeMap<String, Value>,
) -> Result<(), ModelingError> {
    if let Some(Value::String(new_id)) = properties.get(ID) {
        change_id(modeler, element, bo, ElementId::intern(new_id))?;
    }
    let object = modeler.moddle.get_mut(bo);
    for (key, value) in properties {
        if key != ID {
            object.set(key, value.clone());
        }
    }
    Ok(())
}

fn change_id(
    modeler: &mut Modeler,
    element: Option<ElementIndex>,
    bo: ObjectIndex,
    new_id: ElementId,
) -> Result<(), ModelingError> {
    let old_id = modeler.moddle.get(bo).id;
    if new_id == old_id {
        return Ok(());
    }
    if let Some(other) = modeler.canvas.find(new_id.as_str())
        && Some(other) != element
    {
        return Err(ModelingError::IdConflict(new_id.to_string()));
    }
    modeler.moddle.ids.claim(new_id, new_id)?;
    modeler.moddle.ids.unclaim(old_id);

    if let Some(element) = element {
        modeler.canvas.update_id(element, new_id)?;
        if let Some(label) = modeler.element(element).label {
            modeler.canvas.update_id(label, new_id.label_id())?;
        }
    }
    modeler.moddle.get_mut(bo).id = new_id;
    if let Some(di) = modeler.moddle.di_of(bo) {
        modeler.moddle.di_mut(di).id = new_id.di_id();
    }
    log::trace!("id {old_id} -> {new_id}");
    Ok(())
}
