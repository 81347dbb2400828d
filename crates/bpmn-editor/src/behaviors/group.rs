//! Groups reference a `CategoryValue` that lives in a `Category` root
//! element. The value exists while some group uses it; a category without
//! values is dropped from the definitions.

use bpmn_core::{BpmnType, ElementIndex, ObjectIndex, props};

use crate::command::{CommandContext, CommandKind};
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::modeler::Modeler;

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        CommandKind::ShapeCreate,
        Hook::PreExecute,
        None,
        |modeler, context, _| {
            if let CommandContext::ShapeCreate(ctx) = context
                && let Some(group) = group_bo(modeler, ctx.shape)
            {
                ensure_category_value(modeler, group);
            }
            Ok(())
        },
    )?;

    for (command, hook, attach) in [
        (CommandKind::ShapeCreate, Hook::Executed, true),
        (CommandKind::ShapeCreate, Hook::Reverted, false),
        (CommandKind::ShapeDelete, Hook::Executed, false),
        (CommandKind::ShapeDelete, Hook::Reverted, true),
    ] {
        interceptor.on_context(command, hook, None, move |modeler, context, _| {
            let Some(group) = context.element().and_then(|s| group_bo(modeler, s)) else {
                return Ok(());
            };
            let Some(value) = modeler.moddle.get(group).get_ref(props::CATEGORY_VALUE_REF) else {
                return Ok(());
            };
            if attach {
                attach_category_value(modeler, value);
            } else if !is_referenced(modeler, value) {
                detach_category_value(modeler, value);
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn group_bo(modeler: &Modeler, shape: ElementIndex) -> Option<ObjectIndex> {
    let element = modeler.element(shape);
    if element.is_label() {
        return None;
    }
    element
        .business_object
        .filter(|bo| modeler.moddle.type_of(*bo) == BpmnType::Group)
}

/// Give a new group its own category and value.
fn ensure_category_value(modeler: &mut Modeler, group: ObjectIndex) {
    if modeler.moddle.get(group).get_ref(props::CATEGORY_VALUE_REF).is_some() {
        return;
    }
    let moddle = &mut modeler.moddle;
    let category_id = moddle.ids.next_prefixed(BpmnType::Category.id_prefix(), None);
    let category = moddle.create(BpmnType::Category, category_id);
    let value_id = moddle.ids.next_prefixed(BpmnType::CategoryValue.id_prefix(), None);
    let value = moddle.create(BpmnType::CategoryValue, value_id);
    moddle.get_mut(value).parent = Some(category);
    let definitions = moddle.definitions;
    moddle.get_mut(category).parent = Some(definitions);
    moddle
        .get_mut(group)
        .set(props::CATEGORY_VALUE_REF, value.into());
    log::trace!("group {} uses category value {value_id}", moddle.get(group).id);
}

/// Whether a group still on the canvas uses `value`.
fn is_referenced(modeler: &Modeler, value: ObjectIndex) -> bool {
    !modeler
        .canvas
        .filter(|e| {
            !e.is_label()
                && e.business_object.is_some_and(|bo| {
                    modeler.moddle.get(bo).get_ref(props::CATEGORY_VALUE_REF) == Some(value)
                })
        })
        .is_empty()
}

fn attach_category_value(modeler: &mut Modeler, value: ObjectIndex) {
    let Some(category) = modeler.moddle.parent_of(value) else {
        return;
    };
    let definitions = modeler.moddle.definitions;
    modeler
        .moddle
        .add_to(category, props::CATEGORY_VALUE, value, None);
    modeler
        .moddle
        .add_to(definitions, props::ROOT_ELEMENTS, category, None);
}

/// Remove `value` from its category (and an emptied category from the
/// definitions). Parent links stay so the value can be reattached.
fn detach_category_value(modeler: &mut Modeler, value: ObjectIndex) {
    let Some(category) = modeler.moddle.parent_of(value) else {
        return;
    };
    modeler
        .moddle
        .remove_from(category, props::CATEGORY_VALUE, value);
    if modeler.moddle.list(category, props::CATEGORY_VALUE).is_empty() {
        let definitions = modeler.moddle.definitions;
        modeler
            .moddle
            .remove_from(definitions, props::ROOT_ELEMENTS, category);
    }
}
