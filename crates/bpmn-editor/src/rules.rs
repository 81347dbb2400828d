//! Modeling rules: which connections, drops, attachments and resizes are
//! allowed.
//!
//! Rules are consulted by the modeling facade and by behaviors before they
//! issue commands. A rejected action is not an error; callers simply do not
//! perform it.

use bpmn_core::{Bounds, BpmnType, ElementIndex, Orientation, Point, geometry, props};

use crate::modeler::Modeler;

/// Something a rule can be asked about.
#[derive(Debug, Clone, Copy)]
pub enum RuleAction<'a> {
    ShapeCreate {
        shape: ElementIndex,
        target: ElementIndex,
        position: Option<Point>,
    },
    ElementsMove {
        shapes: &'a [ElementIndex],
        target: Option<ElementIndex>,
        position: Option<Point>,
    },
    ConnectionCreate {
        source: ElementIndex,
        target: ElementIndex,
    },
    ConnectionReconnect {
        connection: ElementIndex,
        source: ElementIndex,
        target: ElementIndex,
    },
    ShapeResize {
        shape: ElementIndex,
        new_bounds: Option<Bounds>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowed {
    Denied,
    Allowed,
    /// Allowed as an attachment to the target.
    Attach,
}

impl Allowed {
    pub fn is_allowed(self) -> bool {
        self != Allowed::Denied
    }
}

impl From<bool> for Allowed {
    fn from(b: bool) -> Self {
        if b { Allowed::Allowed } else { Allowed::Denied }
    }
}

pub trait Rules {
    fn allowed(&self, modeler: &Modeler, action: &RuleAction<'_>) -> Allowed;

    /// The connection type that may link `source` to `target`, if any.
    fn can_connect(
        &self,
        modeler: &Modeler,
        source: ElementIndex,
        target: ElementIndex,
    ) -> Option<BpmnType>;
}

/// The BPMN rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BpmnRules;

impl Rules for BpmnRules {
    fn allowed(&self, modeler: &Modeler, action: &RuleAction<'_>) -> Allowed {
        match *action {
            RuleAction::ShapeCreate {
                shape,
                target,
                position,
            } => {
                if can_attach(modeler, shape, target, position) {
                    Allowed::Attach
                } else {
                    can_drop(modeler, shape, target).into()
                }
            }
            RuleAction::ElementsMove {
                shapes,
                target,
                position,
            } => {
                let Some(target) = target else {
                    return Allowed::Allowed;
                };
                if let [single] = shapes
                    && can_attach(modeler, *single, target, position)
                {
                    return Allowed::Attach;
                }
                shapes
                    .iter()
                    .all(|s| can_drop(modeler, *s, target))
                    .into()
            }
            RuleAction::ConnectionCreate { source, target } => {
                self.can_connect(modeler, source, target).is_some().into()
            }
            RuleAction::ConnectionReconnect {
                connection,
                source,
                target,
            } => {
                let current = modeler.bpmn_type(connection);
                (current.is_some() && self.can_connect(modeler, source, target) == current).into()
            }
            RuleAction::ShapeResize { shape, new_bounds } => {
                let resizable = modeler.is(shape, |t| {
                    matches!(
                        t,
                        BpmnType::Participant
                            | BpmnType::Lane
                            | BpmnType::TextAnnotation
                            | BpmnType::Group
                    )
                }) || (modeler.is(shape, BpmnType::is_sub_process)
                    && !modeler.element(shape).collapsed);
                let sane = new_bounds.is_none_or(|b| b.width > 0.0 && b.height > 0.0);
                (resizable && sane).into()
            }
        }
    }

    fn can_connect(
        &self,
        modeler: &Modeler,
        source: ElementIndex,
        target: ElementIndex,
    ) -> Option<BpmnType> {
        if modeler.element(source).is_label() || modeler.element(target).is_label() {
            return None;
        }
        let (s, t) = (modeler.bpmn_type(source)?, modeler.bpmn_type(target)?);

        if t == BpmnType::TextAnnotation || s == BpmnType::TextAnnotation {
            return Some(BpmnType::Association);
        }
        if is_data_reference(s) && accepts_data_input(t) {
            return Some(BpmnType::DataInputAssociation);
        }
        if produces_data_output(s) && is_data_reference(t) {
            return Some(BpmnType::DataOutputAssociation);
        }
        if can_connect_message_flow(modeler, source, target) {
            return Some(BpmnType::MessageFlow);
        }
        if can_connect_sequence_flow(modeler, source, target) {
            return Some(BpmnType::SequenceFlow);
        }
        None
    }
}

fn is_data_reference(t: BpmnType) -> bool {
    matches!(t, BpmnType::DataObjectReference | BpmnType::DataStoreReference)
}

fn accepts_data_input(t: BpmnType) -> bool {
    t.is_activity() || matches!(t, BpmnType::IntermediateThrowEvent | BpmnType::EndEvent)
}

fn produces_data_output(t: BpmnType) -> bool {
    t.is_activity()
        || matches!(
            t,
            BpmnType::StartEvent | BpmnType::IntermediateCatchEvent | BpmnType::BoundaryEvent
        )
}

/// The nearest participant of an element (including itself).
fn participant_of(modeler: &Modeler, idx: ElementIndex) -> Option<ElementIndex> {
    modeler.canvas.find_parent(idx, |e| {
        e.business_object
            .is_some_and(|bo| modeler.moddle.type_of(bo) == BpmnType::Participant)
    })
}

/// The flow scope (process, participant or sub-process) an element lives in.
fn scope_of(modeler: &Modeler, idx: ElementIndex) -> Option<ElementIndex> {
    let parent = modeler.element(idx).parent?;
    modeler.canvas.find_parent(parent, |e| {
        e.is_root()
            || e.business_object.is_some_and(|bo| {
                let t = modeler.moddle.type_of(bo);
                t == BpmnType::Participant || t.is_sub_process()
            })
    })
}

fn can_connect_message_flow(modeler: &Modeler, source: ElementIndex, target: ElementIndex) -> bool {
    let message_end = |idx| {
        modeler.is(idx, |t| {
            t == BpmnType::Participant || (t.is_flow_node() && t != BpmnType::BoundaryEvent)
        })
    };
    if !message_end(source) || !message_end(target) {
        return false;
    }
    match (participant_of(modeler, source), participant_of(modeler, target)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

fn can_connect_sequence_flow(modeler: &Modeler, source: ElementIndex, target: ElementIndex) -> bool {
    let (Some(s), Some(t)) = (modeler.bpmn_type(source), modeler.bpmn_type(target)) else {
        return false;
    };
    s.is_flow_node()
        && t.is_flow_node()
        && s != BpmnType::EndEvent
        && !matches!(t, BpmnType::StartEvent | BpmnType::BoundaryEvent)
        && !is_event_sub_process(modeler, source)
        && !is_event_sub_process(modeler, target)
        && scope_of(modeler, source) == scope_of(modeler, target)
}

fn is_event_sub_process(modeler: &Modeler, idx: ElementIndex) -> bool {
    modeler.bo(idx).is_some_and(|bo| {
        modeler.moddle.type_of(bo).is_sub_process()
            && modeler.moddle.get(bo).get(props::TRIGGERED_BY_EVENT).as_bool() == Some(true)
    })
}

fn is_boundary_candidate(t: BpmnType) -> bool {
    matches!(
        t,
        BpmnType::BoundaryEvent | BpmnType::IntermediateCatchEvent | BpmnType::IntermediateThrowEvent
    )
}

/// Whether `shape` may be attached to `target`. With a position, it must
/// lie on (or close to) the target's border.
pub fn can_attach(
    modeler: &Modeler,
    shape: ElementIndex,
    target: ElementIndex,
    position: Option<Point>,
) -> bool {
    if modeler.element(shape).is_label() || !modeler.is(shape, is_boundary_candidate) {
        return false;
    }
    if !modeler.is(target, BpmnType::is_activity) || is_event_sub_process(modeler, target) {
        return false;
    }
    position.is_none_or(|p| {
        let point = Bounds::new(p.x, p.y, 0.0, 0.0);
        geometry::get_orientation(&point, &modeler.element(target).bounds, -15.0)
            != Orientation::Intersect
    })
}

/// Whether `shape` may be dropped into `target` as a child.
pub fn can_drop(modeler: &Modeler, shape: ElementIndex, target: ElementIndex) -> bool {
    if modeler.element(shape).is_label() {
        return true;
    }
    let (Some(s), Some(t)) = (modeler.bpmn_type(shape), modeler.bpmn_type(target)) else {
        return false;
    };
    let target_element = modeler.element(target);
    let is_container = target_element.is_root()
        || (t == BpmnType::Participant && target_element.is_frame)
        || (t.is_sub_process() && !target_element.collapsed);

    match s {
        BpmnType::Participant => target_element.is_root(),
        BpmnType::Lane => matches!(t, BpmnType::Participant | BpmnType::Lane),
        BpmnType::BoundaryEvent => false,
        // data stores may sit on a collaboration, outside any participant
        BpmnType::DataStoreReference => is_container,
        s if s.is_flow_element() => {
            (is_container || t == BpmnType::Lane) && t != BpmnType::Collaboration
        }
        s if s.is_artifact() => is_container,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_factory::ShapeAttrs;

    #[test]
    fn sequence_flow_rules() {
        let mut modeler = Modeler::new();
        let root = modeler.root();
        let start = modeler
            .modeling()
            .create_shape(&ShapeAttrs::new(BpmnType::StartEvent), Point::new(100.0, 100.0), root)
            .unwrap();
        let task = modeler
            .modeling()
            .create_shape(&ShapeAttrs::new(BpmnType::Task), Point::new(300.0, 100.0), root)
            .unwrap();
        let end = modeler
            .modeling()
            .create_shape(&ShapeAttrs::new(BpmnType::EndEvent), Point::new(500.0, 100.0), root)
            .unwrap();

        let rules = BpmnRules;
        assert_eq!(rules.can_connect(&modeler, start, task), Some(BpmnType::SequenceFlow));
        assert_eq!(rules.can_connect(&modeler, task, start), None);
        assert_eq!(rules.can_connect(&modeler, end, task), None);
    }

    #[test]
    fn boundary_events_attach_on_the_border_only() {
        let mut modeler = Modeler::new();
        let root = modeler.root();
        let task = modeler
            .modeling()
            .create_shape(&ShapeAttrs::new(BpmnType::Task), Point::new(300.0, 100.0), root)
            .unwrap();
        let event = modeler
            .element_factory()
            .create_shape(&ShapeAttrs::new(BpmnType::BoundaryEvent))
            .unwrap();

        // task spans (250, 60) .. (350, 140)
        assert!(can_attach(&modeler, event, task, Some(Point::new(300.0, 140.0))));
        assert!(!can_attach(&modeler, event, task, Some(Point::new(300.0, 100.0))));
    }
}
