//! External labels stay with their targets: they join moves, share the
//! target's parent, die with it, appear when a named element is created and
//! follow name changes.

use bpmn_core::{BpmnType, ElementIndex, ObjectIndex, Value, props};
use std::collections::BTreeMap;

use crate::command::{
    CommandContext, CommandKind, ShapeDeleteContext, UpdateLabelContext, UpdateParentContext,
};
use crate::error::ModelingError;
use crate::handlers::update_label::create_external_label;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::label_util::{get_label, is_empty_text, is_label_external};
use crate::modeler::Modeler;

const HIGH_PRIORITY: i32 = 1500;

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_move_start(Some(HIGH_PRIORITY), |modeler, event| {
        let shapes = event.shapes.clone();
        for shape in shapes {
            if let Some(label) = modeler.element(shape).label
                && !event.shapes.contains(&label)
            {
                event.shapes.push(label);
            }
        }
        event.validated_shapes.retain(|shape| {
            modeler
                .element(*shape)
                .label_target
                .is_none_or(|target| !event.shapes.contains(&target))
        });
    });

    interceptor.on_context(
        CommandKind::ElementsMove,
        Hook::PreExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ElementsMove(ctx) = context else {
                return Ok(());
            };
            let closure = &ctx.closure;
            let labels: Vec<ElementIndex> = closure
                .all_shapes
                .iter()
                .chain(&closure.all_connections)
                .filter_map(|e| modeler.element(*e).label)
                .filter(|label| !closure.contains(*label))
                .collect();
            if !labels.is_empty() {
                ctx.closure.add(modeler, &labels);
            }
            Ok(())
        },
    )?;

    interceptor.on_context(
        [CommandKind::ShapeDelete, CommandKind::ConnectionDelete],
        Hook::PreExecute,
        None,
        |modeler, context, _| {
            let Some(element) = context.element() else {
                return Ok(());
            };
            if let Some(label) = modeler.element(element).label
                && modeler.canvas.contains(label)
            {
                modeler.execute(ShapeDeleteContext::new(label))?;
            }
            Ok(())
        },
    )?;

    interceptor.on_context(
        CommandKind::ShapeMove,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ShapeMove(ctx) = context else {
                return Ok(());
            };
            let shape = modeler.element(ctx.shape);
            let (Some(label), Some(parent)) = (shape.label, shape.parent) else {
                return Ok(());
            };
            if modeler.canvas.contains(label) && modeler.element(label).parent != Some(parent) {
                modeler.execute(UpdateParentContext::new(label, parent))?;
            }
            Ok(())
        },
    )?;

    interceptor.on_context(
        [CommandKind::ShapeCreate, CommandKind::ConnectionCreate],
        Hook::PostExecute,
        None,
        |modeler, context, _| match context.element() {
            Some(element) => create_label_for_named(modeler, element),
            None => Ok(()),
        },
    )?;

    interceptor.on_context(
        [
            CommandKind::ElementUpdateProperties,
            CommandKind::ElementUpdateModdleProperties,
        ],
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let (element, properties) = match context {
                CommandContext::ElementUpdateProperties(c) => (c.element, &c.properties),
                CommandContext::ElementUpdateModdleProperties(c)
                    if modeler.bo(c.element) == Some(c.moddle_element) =>
                {
                    (c.element, &c.properties)
                }
                _ => return Ok(()),
            };
            let Some(text) = label_text_change(modeler, element, properties) else {
                return Ok(());
            };
            modeler.execute(UpdateLabelContext {
                element,
                new_label: text,
                new_bounds: None,
                old_label: None,
            })?;
            Ok(())
        },
    )?;
    Ok(())
}

/// Named elements with external labels get their label on creation.
fn create_label_for_named(modeler: &mut Modeler, element: ElementIndex) -> Result<(), ModelingError> {
    let el = modeler.element(element);
    if el.is_label() || el.label.is_some() || !modeler.is(element, is_label_external) {
        return Ok(());
    }
    let text = get_label(modeler, element);
    if is_empty_text(text.as_deref()) {
        return Ok(());
    }
    create_external_label(modeler, element, text.as_deref())?;
    Ok(())
}

/// The new text when `properties` touch the property the element displays.
fn label_text_change(
    modeler: &Modeler,
    element: ElementIndex,
    properties: &BTreeMap<String, Value>,
) -> Option<Option<String>> {
    let bo: ObjectIndex = modeler.bo(element)?;
    let prop = if modeler.moddle.type_of(bo) == BpmnType::TextAnnotation {
        props::TEXT
    } else {
        props::NAME
    };
    properties
        .get(prop)
        .map(|value| value.as_str().map(str::to_string))
}
