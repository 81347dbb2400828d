//! `element.updateLabel`: change the text an element shows.
//!
//! Elements with external labels get a label shape created on first use,
//! resized to fit the new text, and removed again once the text is empty.

use bpmn_core::{BpmnType, ElementIndex, Point};

use crate::command::{
    LabelCreateContext, Placement, ShapeDeleteContext, ShapeResizeContext, UpdateLabelContext,
};
use crate::error::ModelingError;
use crate::label_util::{
    external_label_bounds, external_label_mid, get_label, is_empty_text, is_label_external,
    set_label, text_bounds,
};
use crate::modeler::Modeler;

/// Gap between a new external label and its target.
const LABEL_PADDING_TOP: f64 = 7.0;

pub fn pre_execute(modeler: &mut Modeler, ctx: &mut UpdateLabelContext) -> Result<(), ModelingError> {
    let element = modeler.element(ctx.element);
    let needs_label = !element.is_label()
        && element.label.is_none()
        && modeler.is(ctx.element, is_label_external)
        && !is_empty_text(ctx.new_label.as_deref());
    if !needs_label {
        return Ok(());
    }

    create_external_label(modeler, ctx.element, ctx.new_label.as_deref())?;
    Ok(())
}

/// Create the external label of `element` below it, sized for `text`.
pub(crate) fn create_external_label(
    modeler: &mut Modeler,
    element: ElementIndex,
    text: Option<&str>,
) -> Result<ElementIndex, ModelingError> {
    let mid = external_label_mid(modeler, element);
    let center = Point::new(mid.x, mid.y + LABEL_PADDING_TOP);
    let placement = match text {
        Some(text) => Placement::Bounds(text_bounds(modeler, center, text)),
        None => Placement::Center(center),
    };
    let label = modeler.element_factory().create_label(element);
    modeler.execute(LabelCreateContext {
        label,
        label_target: element,
        placement,
        parent: None,
        parent_index: None,
    })?;
    Ok(label)
}

pub fn execute(modeler: &mut Modeler, ctx: &mut UpdateLabelContext) -> Result<(), ModelingError> {
    ctx.old_label = set_label(modeler, ctx.element, ctx.new_label.as_deref());
    Ok(())
}

pub fn post_execute(modeler: &mut Modeler, ctx: &mut UpdateLabelContext) -> Result<(), ModelingError> {
    let label = modeler.element(ctx.element).label.unwrap_or(ctx.element);
    let is_label = modeler.element(label).is_label();
    if !is_label && !modeler.is_type(label, BpmnType::TextAnnotation) {
        return Ok(());
    }

    if is_label && is_empty_text(ctx.new_label.as_deref()) {
        if modeler.canvas.contains(label) {
            modeler.execute(ShapeDeleteContext::new(label))?;
        }
        return Ok(());
    }

    let new_bounds = match ctx.new_bounds {
        Some(bounds) => bounds,
        None if is_label => {
            let text = get_label(modeler, label).unwrap_or_default();
            external_label_bounds(modeler, label, &text)
        }
        None => return Ok(()),
    };
    if modeler.element(label).bounds != new_bounds {
        modeler.execute(ShapeResizeContext::new(label, new_bounds))?;
    }
    Ok(())
}

pub fn revert(modeler: &mut Modeler, ctx: &mut UpdateLabelContext) -> Result<(), ModelingError> {
    set_label(modeler, ctx.element, ctx.old_label.as_deref());
    Ok(())
}
