//! Label helpers: which elements carry external labels, where those labels
//! go and how large they are.

use bpmn_core::{Bounds, BpmnType, ElementIndex, ObjectIndex, Point, Value, model, props};

use crate::modeler::Modeler;

/// Approximate glyph metrics used to size external labels.
const CHAR_WIDTH: f64 = 7.0;
const LINE_HEIGHT: f64 = 14.0;

/// Elements whose name renders outside the shape.
pub fn is_label_external(bpmn_type: BpmnType) -> bool {
    bpmn_type.is_event()
        || bpmn_type.is_gateway()
        || matches!(
            bpmn_type,
            BpmnType::DataStoreReference
                | BpmnType::DataObjectReference
                | BpmnType::SequenceFlow
                | BpmnType::MessageFlow
                | BpmnType::Group
        )
}

pub fn has_external_label(modeler: &Modeler, element: ElementIndex) -> bool {
    modeler.element(element).label.is_some()
}

pub fn is_empty_text(text: Option<&str>) -> bool {
    text.is_none_or(|t| t.trim().is_empty())
}

/// Where the external label of `element` sits by default.
pub fn external_label_mid(modeler: &Modeler, element: ElementIndex) -> Point {
    let el = modeler.element(element);
    let half_label = modeler.config.external_label_height / 2.0;
    if el.is_connection() {
        model::connection_mid(&el.waypoints)
    } else if modeler.is_type(element, BpmnType::Group) {
        Point::new(el.bounds.mid().x, el.bounds.y + half_label)
    } else {
        Point::new(el.bounds.mid().x, el.bounds.bottom() + half_label)
    }
}

/// The text an element shows: `text` for annotations, the category value
/// for groups, `name` otherwise.
pub fn get_label(modeler: &Modeler, element: ElementIndex) -> Option<String> {
    let (holder, prop) = label_holder(modeler, modeler.bo(element)?);
    modeler
        .moddle
        .get(holder)
        .get(prop)
        .as_str()
        .map(str::to_string)
}

/// Set an element's text, returning the previous one.
pub fn set_label(modeler: &mut Modeler, element: ElementIndex, text: Option<&str>) -> Option<String> {
    let (holder, prop) = label_holder(modeler, modeler.bo(element)?);
    let value = text.map_or(Value::Null, Into::into);
    match modeler.moddle.get_mut(holder).set(prop, value) {
        Value::String(old) => Some(old),
        _ => None,
    }
}

/// The business object and property holding the text of `bo`.
fn label_holder(modeler: &Modeler, bo: ObjectIndex) -> (ObjectIndex, &'static str) {
    match modeler.moddle.type_of(bo) {
        BpmnType::TextAnnotation => (bo, props::TEXT),
        BpmnType::Group => match modeler.moddle.get(bo).get_ref(props::CATEGORY_VALUE_REF) {
            Some(value) => (value, props::VALUE),
            None => (bo, props::NAME),
        },
        _ => (bo, props::NAME),
    }
}

/// Bounds of an external label showing `text`, centered on the label's
/// current mid point.
pub fn external_label_bounds(modeler: &Modeler, label: ElementIndex, text: &str) -> Bounds {
    text_bounds(modeler, modeler.element(label).bounds.mid(), text)
}

/// Bounds fitting `text` around `center`. Long texts wrap at the default
/// label width.
pub fn text_bounds(modeler: &Modeler, center: Point, text: &str) -> Bounds {
    let max_width = modeler.config.external_label_width;
    let text_width = text.chars().count() as f64 * CHAR_WIDTH;
    let lines = (text_width / max_width).ceil().max(1.0);
    let width = text_width.min(max_width).max(CHAR_WIDTH);
    let height = lines * LINE_HEIGHT;
    Bounds::new(
        (center.x - width / 2.0).round(),
        (center.y - height / 2.0).round(),
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_label_types() {
        assert!(is_label_external(BpmnType::StartEvent));
        assert!(is_label_external(BpmnType::ExclusiveGateway));
        assert!(is_label_external(BpmnType::SequenceFlow));
        assert!(!is_label_external(BpmnType::Task));
        assert!(!is_label_external(BpmnType::Lane));
    }

    #[test]
    fn empty_text() {
        assert!(is_empty_text(None));
        assert!(is_empty_text(Some("  ")));
        assert!(!is_empty_text(Some("Done")));
    }
}
